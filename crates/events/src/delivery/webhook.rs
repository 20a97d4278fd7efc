//! Webhook delivery with exponential-backoff retry.
//!
//! [`WebhookDelivery`] POSTs a JSON-encoded [`PlatformEvent`] to an external
//! URL. A failed attempt is retried after each configured delay (1 s, 2 s,
//! 4 s by default) before giving up.

use std::time::Duration;

use crate::bus::PlatformEvent;

/// Default retry delays in seconds.
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Network, DNS or timeout failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

/// Delivers platform events to one webhook endpoint.
pub struct WebhookDelivery {
    client: reqwest::Client,
    url: String,
    retry_delays: Vec<Duration>,
}

impl WebhookDelivery {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            retry_delays: RETRY_DELAYS_SECS.iter().map(|s| Duration::from_secs(*s)).collect(),
        })
    }

    /// Replace the backoff schedule.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver an event, retrying on failure.
    ///
    /// Returns the last error once every attempt has failed.
    pub async fn deliver(&self, event: &PlatformEvent) -> Result<(), WebhookError> {
        let payload = serde_json::json!({
            "event_type": event.event_type,
            "source_entity_type": event.source_entity_type,
            "source_entity_id": event.source_entity_id,
            "payload": event.payload,
            "timestamp": event.timestamp,
        });

        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.try_send(&payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url = %self.url,
                        error = %e,
                        "Webhook delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        self.try_send(&payload).await.inspect_err(|e| {
            tracing::error!(url = %self.url, error = %e, "Webhook delivery failed after all retries");
        })
    }

    async fn try_send(&self, payload: &serde_json::Value) -> Result<(), WebhookError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}
