//! Periodic escalation of missed safety check-ins.
//!
//! On every tick the sweep claims active sessions whose current heartbeat is
//! still `due` past `next_due`, one transaction per session. Claiming marks
//! the heartbeat `escalated` and records an `overdue` alert, which is then
//! handed to the notifier. The session itself stays active, so a late
//! acknowledgment still works.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use navmate_core::notifier::{AlertNotice, Recipient, SafetyNotifier};
use navmate_core::safety::AlertKind;
use navmate_core::types::Timestamp;
use navmate_db::repositories::safety_session_repo::OverdueClaim;
use navmate_db::repositories::SafetySessionRepo;
use navmate_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::alerts;

/// Run the overdue sweep loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    notifier: Arc<dyn SafetyNotifier>,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = period.as_secs(), "Overdue sweep started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Overdue sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(&pool, notifier.as_ref(), Utc::now()).await {
                    Ok(0) => tracing::debug!("Overdue sweep: nothing overdue"),
                    Ok(escalated) => tracing::info!(escalated, "Overdue sweep: escalated sessions"),
                    Err(e) => tracing::error!(error = %e, "Overdue sweep failed"),
                }
            }
        }
    }
}

/// Escalate every session overdue at `now`. Returns how many were escalated.
pub async fn sweep_once(
    pool: &DbPool,
    notifier: &dyn SafetyNotifier,
    now: Timestamp,
) -> Result<usize, sqlx::Error> {
    let mut escalated = 0;

    while let Some(claim) = SafetySessionRepo::claim_overdue(pool, now).await? {
        escalated += 1;
        tracing::warn!(
            session_id = claim.session.id,
            plan_id = claim.session.plan_id,
            heartbeat_id = claim.heartbeat.id,
            due_at = %claim.heartbeat.due_at,
            "Safety check-in missed",
        );

        let recipients = alerts::recipients_for(pool, claim.user_id)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(alert_id = claim.alert.id, error = %e, "Failed to load emergency contacts");
                Vec::new()
            });
        let notice = overdue_notice(claim, recipients);
        alerts::dispatch(pool, notifier, &notice).await;
    }

    Ok(escalated)
}

fn overdue_notice(claim: OverdueClaim, recipients: Vec<Recipient>) -> AlertNotice {
    AlertNotice {
        alert_id: claim.alert.id,
        kind: AlertKind::Overdue,
        user_id: claim.user_id,
        plan_id: claim.session.plan_id,
        session_id: Some(claim.session.id),
        origin: claim.origin,
        destination: claim.destination,
        location: None,
        message: Some(format!(
            "Check-in due at {} was not acknowledged",
            claim.heartbeat.due_at.to_rfc3339()
        )),
        occurred_at: claim.alert.created_at,
        recipients,
    }
}
