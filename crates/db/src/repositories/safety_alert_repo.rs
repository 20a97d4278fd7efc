//! Repository for the `safety_alerts` table.

use navmate_core::safety::AlertKind;
use navmate_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::safety::{CreateSosAlert, SafetyAlert};

const COLUMNS: &str =
    "id, kind, plan_id, session_id, heartbeat_id, location, message, created_at, notified_at";

/// Durable record of SOS and overdue alerts.
pub struct SafetyAlertRepo;

impl SafetyAlertRepo {
    /// Record an SOS raised on a plan.
    pub async fn create_sos(
        pool: &PgPool,
        input: &CreateSosAlert,
    ) -> Result<SafetyAlert, sqlx::Error> {
        let query = format!(
            "INSERT INTO safety_alerts (kind, plan_id, session_id, location, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SafetyAlert>(&query)
            .bind(AlertKind::Sos.as_str())
            .bind(input.plan_id)
            .bind(input.session_id)
            .bind(&input.location)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// Stamp the time a dispatch was attempted for an alert.
    pub async fn mark_notified(
        pool: &PgPool,
        id: DbId,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE safety_alerts SET notified_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Alerts raised on a plan, newest first.
    pub async fn list_by_plan(pool: &PgPool, plan_id: DbId) -> Result<Vec<SafetyAlert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM safety_alerts WHERE plan_id = $1 ORDER BY id DESC"
        );
        sqlx::query_as::<_, SafetyAlert>(&query)
            .bind(plan_id)
            .fetch_all(pool)
            .await
    }
}
