//! Request field validation shared by the auth and contact endpoints.

use crate::error::CoreError;

/// Minimum password length for local sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length of a free-text SOS message.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Normalize an email address for storage and lookup (trimmed, lowercase).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate the basic shape of an email address: one `@` with a non-empty
/// local part and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let invalid = || CoreError::Validation(format!("'{email}' is not a valid email address"));

    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH || email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Validate that a password meets the minimum length.
pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

/// Validate that a required text field is present and not blank.
pub fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Validate the optional SOS message length.
pub fn validate_message(message: Option<&str>) -> Result<(), CoreError> {
    match message {
        Some(m) if m.chars().count() > MAX_MESSAGE_LENGTH => Err(CoreError::Validation(format!(
            "message must be at most {MAX_MESSAGE_LENGTH} characters"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+trip@mail.co.th").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "alice", "@example.com", "alice@", "alice@example", "a@b@c.com", "a b@c.com", "alice@example..com"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("eightchr").is_ok());
    }

    #[test]
    fn message_length_limit() {
        assert!(validate_message(None).is_ok());
        assert!(validate_message(Some("help")).is_ok());
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(validate_message(Some(&long)).is_err());
    }

    #[test]
    fn blank_required_field() {
        assert!(validate_required("name", " ").is_err());
        assert!(validate_required("name", "Mom").is_ok());
    }
}
