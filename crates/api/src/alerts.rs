//! Hand-off of recorded safety alerts to the notifier.
//!
//! Alerts are persisted before they reach this module. Delivery runs on a
//! spawned task, never fails the caller and stamps `notified_at` once the
//! attempt is over.

use std::sync::Arc;

use chrono::Utc;
use navmate_core::notifier::{AlertNotice, Recipient, SafetyNotifier};
use navmate_core::types::DbId;
use navmate_db::repositories::{EmergencyContactRepo, SafetyAlertRepo};
use navmate_db::DbPool;
use tokio::task::JoinHandle;

/// Emergency contacts of `user_id` as alert recipients, by priority.
pub async fn recipients_for(pool: &DbPool, user_id: DbId) -> Result<Vec<Recipient>, sqlx::Error> {
    let contacts = EmergencyContactRepo::list_for_user(pool, user_id).await?;
    Ok(contacts
        .into_iter()
        .map(|c| Recipient {
            name: c.name,
            phone: c.phone,
            email: c.email,
        })
        .collect())
}

/// Notify about `notice` in the background.
pub fn spawn_dispatch(
    pool: DbPool,
    notifier: Arc<dyn SafetyNotifier>,
    notice: AlertNotice,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        dispatch(&pool, notifier.as_ref(), &notice).await;
    })
}

/// Notify about `notice` and record the attempt.
pub async fn dispatch(pool: &DbPool, notifier: &dyn SafetyNotifier, notice: &AlertNotice) {
    let delivered = notifier.notify(notice).await;
    tracing::info!(
        alert_id = notice.alert_id,
        plan_id = notice.plan_id,
        kind = notice.kind.as_str(),
        delivered,
        recipients = notice.recipients.len(),
        "Safety alert dispatched",
    );

    if let Err(e) = SafetyAlertRepo::mark_notified(pool, notice.alert_id, Utc::now()).await {
        tracing::error!(alert_id = notice.alert_id, error = %e, "Failed to stamp alert as notified");
    }
}
