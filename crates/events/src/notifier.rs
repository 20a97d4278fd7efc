//! Production [`SafetyNotifier`]: publishes each alert on the event bus and
//! pushes it through the configured outbound channels.
//!
//! Every channel is best-effort. Failures are logged and counted out of the
//! returned delivery total; nothing is propagated to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use navmate_core::notifier::{AlertNotice, SafetyNotifier};

use crate::bus::{EventBus, PlatformEvent};
use crate::delivery::email::EmailDelivery;
use crate::delivery::webhook::WebhookDelivery;

/// Fans safety alerts out to the bus, an optional webhook and optional email.
pub struct AlertDispatcher {
    bus: Arc<EventBus>,
    webhook: Option<WebhookDelivery>,
    email: Option<EmailDelivery>,
}

impl AlertDispatcher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            webhook: None,
            email: None,
        }
    }

    pub fn with_webhook(mut self, webhook: WebhookDelivery) -> Self {
        self.webhook = Some(webhook);
        self
    }

    pub fn with_email(mut self, email: EmailDelivery) -> Self {
        self.email = Some(email);
        self
    }
}

/// Bus event describing an alert.
pub fn alert_event(notice: &AlertNotice) -> PlatformEvent {
    PlatformEvent::new(notice.kind.event_type())
        .with_source("trip_plan", notice.plan_id)
        .with_actor(notice.user_id)
        .with_payload(serde_json::json!({
            "alert_id": notice.alert_id,
            "session_id": notice.session_id,
            "origin": notice.origin,
            "destination": notice.destination,
            "location": notice.location,
            "message": notice.message,
            "summary": notice.summary(),
            "contacts": notice.recipients,
        }))
        .at(notice.occurred_at)
}

/// Plain-text email body for an alert.
pub fn email_body(notice: &AlertNotice, contact_name: &str) -> String {
    let mut body = format!("Hello {contact_name},\n\n{}.\n", notice.summary());
    body.push_str(&format!("Time: {}\n", notice.occurred_at.to_rfc3339()));
    if let Some(location) = &notice.location {
        body.push_str(&format!("Last known location: {location}\n"));
    }
    if let Some(message) = &notice.message {
        body.push_str(&format!("Message: {message}\n"));
    }
    body.push_str("\nYou are receiving this because you are listed as an emergency contact.\n");
    body
}

#[async_trait]
impl SafetyNotifier for AlertDispatcher {
    async fn notify(&self, notice: &AlertNotice) -> usize {
        let event = alert_event(notice);
        let mut delivered = 0;

        if self.bus.publish(event.clone()) > 0 {
            delivered += 1;
        }

        if let Some(webhook) = &self.webhook {
            match webhook.deliver(&event).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    alert_id = notice.alert_id,
                    error = %e,
                    "Safety alert webhook failed"
                ),
            }
        }

        if let Some(email) = &self.email {
            let subject = notice.summary();
            for recipient in &notice.recipients {
                let Some(address) = recipient.email.as_deref() else {
                    continue;
                };
                match email.send(address, &subject, email_body(notice, &recipient.name)).await {
                    Ok(()) => delivered += 1,
                    Err(e) => tracing::warn!(
                        alert_id = notice.alert_id,
                        to = address,
                        error = %e,
                        "Safety alert email failed"
                    ),
                }
            }
        }

        tracing::info!(
            alert_id = notice.alert_id,
            kind = notice.kind.as_str(),
            plan_id = notice.plan_id,
            delivered,
            "Safety alert dispatched"
        );
        delivered
    }
}
