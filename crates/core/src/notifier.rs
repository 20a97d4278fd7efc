//! Contract for delivering safety alerts outside the platform.
//!
//! Alerts are recorded in the database before a notifier sees them; the
//! notifier is best-effort and must never make the triggering request fail.

use async_trait::async_trait;
use serde::Serialize;

use crate::safety::AlertKind;
use crate::types::{DbId, Timestamp};

/// An emergency contact that should hear about an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Everything a delivery channel needs to describe an alert.
#[derive(Debug, Clone, Serialize)]
pub struct AlertNotice {
    pub alert_id: DbId,
    pub kind: AlertKind,
    pub user_id: DbId,
    pub plan_id: DbId,
    pub session_id: Option<DbId>,
    pub origin: String,
    pub destination: String,
    pub location: Option<String>,
    pub message: Option<String>,
    pub occurred_at: Timestamp,
    /// Ordered by contact priority, highest first.
    pub recipients: Vec<Recipient>,
}

impl AlertNotice {
    /// One-line human readable summary used as subject/heading.
    pub fn summary(&self) -> String {
        match self.kind {
            AlertKind::Sos => format!(
                "SOS raised on trip {} ({} -> {})",
                self.plan_id, self.origin, self.destination
            ),
            AlertKind::Overdue => format!(
                "Missed safety check-in on trip {} ({} -> {})",
                self.plan_id, self.origin, self.destination
            ),
        }
    }
}

#[async_trait]
pub trait SafetyNotifier: Send + Sync {
    /// Dispatch the alert to every configured channel.
    ///
    /// Returns the number of deliveries that succeeded.
    async fn notify(&self, notice: &AlertNotice) -> usize;
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn notice(kind: AlertKind) -> AlertNotice {
        AlertNotice {
            alert_id: 1,
            kind,
            user_id: 2,
            plan_id: 3,
            session_id: None,
            origin: "Home".into(),
            destination: "Office".into(),
            location: None,
            message: None,
            occurred_at: Utc::now(),
            recipients: Vec::new(),
        }
    }

    #[test]
    fn summary_names_trip_and_route() {
        assert_eq!(
            notice(AlertKind::Sos).summary(),
            "SOS raised on trip 3 (Home -> Office)"
        );
        assert!(notice(AlertKind::Overdue)
            .summary()
            .starts_with("Missed safety check-in"));
    }
}
