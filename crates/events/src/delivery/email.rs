//! Email delivery via SMTP.
//!
//! Configuration comes from the environment; when `SMTP_HOST` is not set
//! [`EmailConfig::from_env`] returns `None` and no mailer is built.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_FROM_ADDRESS: &str = "alerts@navmate.local";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load from `SMTP_HOST`, `SMTP_PORT` (587), `SMTP_FROM`, `SMTP_USER` and
    /// `SMTP_PASSWORD`. Returns `None` if `SMTP_HOST` is unset or empty.
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Sends plain-text emails through one SMTP relay.
pub struct EmailDelivery {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);
        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            from: config.from_address.parse()?,
            transport: builder.build(),
        })
    }

    pub async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), EmailError> {
        let message = build_message(self.from.clone(), to, subject, body)?;
        self.transport.send(message).await?;
        tracing::info!(to, subject, "Alert email sent");
        Ok(())
    }
}

fn build_message(from: Mailbox, to: &str, subject: &str, body: String) -> Result<Message, EmailError> {
    Message::builder()
        .from(from)
        .to(to.parse()?)
        .subject(format!("[navmate] {subject}"))
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|e| EmailError::Build(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn message_rejects_bad_recipient() {
        let from: Mailbox = DEFAULT_FROM_ADDRESS.parse().unwrap();
        let err = build_message(from, "not-an-email", "SOS", "help".into()).unwrap_err();
        assert!(matches!(err, EmailError::Address(_)));
    }

    #[test]
    fn message_prefixes_subject() {
        let from: Mailbox = DEFAULT_FROM_ADDRESS.parse().unwrap();
        let message = build_message(from, "mom@example.com", "SOS raised", "help".into()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: [navmate] SOS raised"));
    }
}
