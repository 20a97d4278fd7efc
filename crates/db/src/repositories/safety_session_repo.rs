//! Repository for the `safety_sessions` and `heartbeats` tables.
//!
//! Every write that reads the current heartbeat first takes a row lock on
//! the owning session, so the newest heartbeat of a session stays the only
//! current one under concurrent requests.

use navmate_core::error::CoreError;
use navmate_core::safety::{self, AlertKind, HeartbeatStatus, SessionStart};
use navmate_core::trip::PlanStatus;
use navmate_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::safety::{Heartbeat, PublicSessionStatus, SafetyAlert, SafetySession};

const COLUMNS: &str =
    "id, plan_id, share_token, interval_minutes, next_due, active, started_at, ended_at";

const HEARTBEAT_COLUMNS: &str = "id, session_id, due_at, acked_at, status, created_at";

const ALERT_COLUMNS: &str =
    "id, kind, plan_id, session_id, heartbeat_id, location, message, created_at, notified_at";

/// Result of [`SafetySessionRepo::start`].
#[derive(Debug)]
pub enum StartOutcome {
    Started {
        session: SafetySession,
        heartbeat: Heartbeat,
    },
    /// The plan already has an active session; nothing was written.
    Existing(SafetySession),
    /// The plan does not exist or is not owned by the caller.
    PlanNotFound,
    /// The plan is completed or cancelled.
    PlanClosed(CoreError),
}

/// Result of [`SafetySessionRepo::acknowledge`].
#[derive(Debug)]
pub enum AckOutcome {
    Acknowledged {
        session: SafetySession,
        /// The heartbeat that was current before the acknowledgment, if any.
        acked: Option<Heartbeat>,
        /// The newly appended `due` heartbeat.
        next: Heartbeat,
    },
    Inactive(SafetySession),
    NotFound,
}

/// Result of [`SafetySessionRepo::end`].
#[derive(Debug)]
pub enum EndOutcome {
    Ended(SafetySession),
    Inactive(SafetySession),
    NotFound,
}

/// An overdue heartbeat claimed and escalated by the sweep.
#[derive(Debug)]
pub struct OverdueClaim {
    pub session: SafetySession,
    pub heartbeat: Heartbeat,
    pub alert: SafetyAlert,
    pub user_id: DbId,
    pub origin: String,
    pub destination: String,
}

/// Provides the safety session lifecycle.
pub struct SafetySessionRepo;

impl SafetySessionRepo {
    /// Open a session on a plan owned by `user_id`.
    ///
    /// The plan row is locked while checking for an existing active session,
    /// so concurrent starts on one plan serialize and the second sees the
    /// first. The partial unique index `uq_safety_sessions_active_plan`
    /// backs this up at the storage level.
    pub async fn start(
        pool: &PgPool,
        plan_id: DbId,
        user_id: DbId,
        values: &SessionStart,
    ) -> Result<StartOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let plan: Option<(String,)> = sqlx::query_as(
            "SELECT status FROM trip_plans WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(plan_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((plan_status,)) = plan else {
            return Ok(StartOutcome::PlanNotFound);
        };
        let current: Option<PlanStatus> = plan_status.parse().ok();

        let query = format!("SELECT {COLUMNS} FROM safety_sessions WHERE plan_id = $1 AND active");
        let existing = sqlx::query_as::<_, SafetySession>(&query)
            .bind(plan_id)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(existing) = existing {
            return Ok(StartOutcome::Existing(existing));
        }

        let next_status = match current.map(PlanStatus::on_session_start).transpose() {
            Ok(next) => next,
            Err(e) => return Ok(StartOutcome::PlanClosed(e)),
        };

        let query = format!(
            "INSERT INTO safety_sessions
                (plan_id, share_token, interval_minutes, next_due, active, started_at)
             VALUES ($1, $2, $3, $4, true, $5)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, SafetySession>(&query)
            .bind(plan_id)
            .bind(&values.share_token)
            .bind(values.interval_minutes)
            .bind(values.next_due)
            .bind(values.started_at)
            .fetch_one(&mut *tx)
            .await?;

        let heartbeat = insert_due_heartbeat(&mut *tx, session.id, session.next_due).await?;

        if let (Some(current), Some(next)) = (current, next_status) {
            if next != current {
                set_plan_status(&mut *tx, plan_id, next).await?;
            }
        }

        tx.commit().await?;
        Ok(StartOutcome::Started { session, heartbeat })
    }

    /// Acknowledge the current heartbeat of a session at `now` and append
    /// the next one.
    ///
    /// An escalated heartbeat keeps its status and only gets `acked_at`. A
    /// session without any heartbeat row is still rescheduled.
    pub async fn acknowledge(
        pool: &PgPool,
        session_id: DbId,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<AckOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(session) = lock_owned(&mut *tx, session_id, user_id).await? else {
            return Ok(AckOutcome::NotFound);
        };
        let Ok(ack) = safety::acknowledge(session.active, session.interval_minutes, now) else {
            return Ok(AckOutcome::Inactive(session));
        };

        let query = format!(
            "UPDATE heartbeats
             SET status = CASE WHEN status = $4 THEN status ELSE $2 END,
                 acked_at = $3
             WHERE id = (
                 SELECT id FROM heartbeats WHERE session_id = $1 ORDER BY id DESC LIMIT 1
             )
             RETURNING {HEARTBEAT_COLUMNS}"
        );
        let acked = sqlx::query_as::<_, Heartbeat>(&query)
            .bind(session.id)
            .bind(HeartbeatStatus::Acked.as_str())
            .bind(ack.acked_at)
            .bind(HeartbeatStatus::Escalated.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if acked.is_none() {
            tracing::warn!(session_id = session.id, "No current heartbeat to acknowledge");
        }

        let query = format!(
            "UPDATE safety_sessions SET next_due = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, SafetySession>(&query)
            .bind(session.id)
            .bind(ack.next_due)
            .fetch_one(&mut *tx)
            .await?;

        let next = insert_due_heartbeat(&mut *tx, session.id, ack.next_due).await?;

        tx.commit().await?;
        Ok(AckOutcome::Acknowledged { session, acked, next })
    }

    /// End an active session at `now` and complete its plan.
    ///
    /// A still-due current heartbeat is left in place as history.
    pub async fn end(
        pool: &PgPool,
        session_id: DbId,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<EndOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(session) = lock_owned(&mut *tx, session_id, user_id).await? else {
            return Ok(EndOutcome::NotFound);
        };
        if !session.active {
            return Ok(EndOutcome::Inactive(session));
        }

        let query = format!(
            "UPDATE safety_sessions SET active = false, ended_at = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, SafetySession>(&query)
            .bind(session.id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let plan: (String,) =
            sqlx::query_as("SELECT status FROM trip_plans WHERE id = $1 FOR UPDATE")
                .bind(session.plan_id)
                .fetch_one(&mut *tx)
                .await?;
        if let Ok(current) = plan.0.parse::<PlanStatus>() {
            let next = current.on_session_end();
            if next != current {
                set_plan_status(&mut *tx, session.plan_id, next).await?;
            }
        }

        tx.commit().await?;
        Ok(EndOutcome::Ended(session))
    }

    /// Find a session, only if its plan belongs to `user_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<SafetySession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM safety_sessions
             WHERE id = $1
               AND plan_id IN (SELECT id FROM trip_plans WHERE user_id = $2)"
        );
        sqlx::query_as::<_, SafetySession>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// The active session of a plan, if any.
    pub async fn find_active_by_plan(
        pool: &PgPool,
        plan_id: DbId,
    ) -> Result<Option<SafetySession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM safety_sessions WHERE plan_id = $1 AND active");
        sqlx::query_as::<_, SafetySession>(&query)
            .bind(plan_id)
            .fetch_optional(pool)
            .await
    }

    /// Heartbeat chain of a session in creation order.
    pub async fn list_heartbeats(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<Heartbeat>, sqlx::Error> {
        let query = format!(
            "SELECT {HEARTBEAT_COLUMNS} FROM heartbeats WHERE session_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, Heartbeat>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Public projection of the active session behind `share_token`.
    ///
    /// Inactive sessions resolve to `None`, exactly like unknown tokens.
    pub async fn public_status(
        pool: &PgPool,
        share_token: &str,
    ) -> Result<Option<PublicSessionStatus>, sqlx::Error> {
        sqlx::query_as::<_, PublicSessionStatus>(
            "SELECT s.plan_id, p.origin, p.destination, s.started_at, s.next_due, s.active,
                    s.interval_minutes,
                    h.due_at AS heartbeat_due_at,
                    h.status AS heartbeat_status,
                    h.acked_at AS heartbeat_acked_at
             FROM safety_sessions s
             JOIN trip_plans p ON p.id = s.plan_id
             LEFT JOIN LATERAL (
                 SELECT due_at, status, acked_at FROM heartbeats
                 WHERE session_id = s.id
                 ORDER BY id DESC
                 LIMIT 1
             ) h ON true
             WHERE s.share_token = $1 AND s.active",
        )
        .bind(share_token)
        .fetch_optional(pool)
        .await
    }

    /// Claim one overdue session and escalate its current heartbeat.
    ///
    /// Picks an active session whose `next_due` is before `now` and whose
    /// newest heartbeat is still `due`, skipping rows locked by concurrent
    /// acknowledgments or sweeps. In the same transaction the heartbeat is
    /// marked `escalated` and an `overdue` alert is recorded, so each
    /// heartbeat escalates at most once. Returns `None` when nothing is
    /// overdue.
    pub async fn claim_overdue(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Option<OverdueClaim>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS} FROM safety_sessions s
             WHERE s.active
               AND s.next_due < $1
               AND (
                   SELECT h.status FROM heartbeats h
                   WHERE h.session_id = s.id
                   ORDER BY h.id DESC
                   LIMIT 1
               ) = $2
             ORDER BY s.next_due
             LIMIT 1
             FOR UPDATE SKIP LOCKED"
        );
        let session = sqlx::query_as::<_, SafetySession>(&query)
            .bind(now)
            .bind(HeartbeatStatus::Due.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(session) = session else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE heartbeats SET status = $2
             WHERE id = (
                 SELECT id FROM heartbeats WHERE session_id = $1 ORDER BY id DESC LIMIT 1
             )
             RETURNING {HEARTBEAT_COLUMNS}"
        );
        let heartbeat = sqlx::query_as::<_, Heartbeat>(&query)
            .bind(session.id)
            .bind(HeartbeatStatus::Escalated.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO safety_alerts (kind, plan_id, session_id, heartbeat_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {ALERT_COLUMNS}"
        );
        let alert = sqlx::query_as::<_, SafetyAlert>(&query)
            .bind(AlertKind::Overdue.as_str())
            .bind(session.plan_id)
            .bind(session.id)
            .bind(heartbeat.id)
            .fetch_one(&mut *tx)
            .await?;

        let (user_id, origin, destination): (DbId, String, String) =
            sqlx::query_as("SELECT user_id, origin, destination FROM trip_plans WHERE id = $1")
                .bind(session.plan_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(Some(OverdueClaim {
            session,
            heartbeat,
            alert,
            user_id,
            origin,
            destination,
        }))
    }
}

/// Lock a session row owned (through its plan) by `user_id`.
async fn lock_owned(
    conn: &mut PgConnection,
    session_id: DbId,
    user_id: DbId,
) -> Result<Option<SafetySession>, sqlx::Error> {
    let query = format!(
        "SELECT {COLUMNS} FROM safety_sessions
         WHERE id = $1
           AND plan_id IN (SELECT id FROM trip_plans WHERE user_id = $2)
         FOR UPDATE"
    );
    sqlx::query_as::<_, SafetySession>(&query)
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

async fn insert_due_heartbeat(
    conn: &mut PgConnection,
    session_id: DbId,
    due_at: Timestamp,
) -> Result<Heartbeat, sqlx::Error> {
    let query = format!(
        "INSERT INTO heartbeats (session_id, due_at, status)
         VALUES ($1, $2, $3)
         RETURNING {HEARTBEAT_COLUMNS}"
    );
    sqlx::query_as::<_, Heartbeat>(&query)
        .bind(session_id)
        .bind(due_at)
        .bind(HeartbeatStatus::Due.as_str())
        .fetch_one(conn)
        .await
}

async fn set_plan_status(
    conn: &mut PgConnection,
    plan_id: DbId,
    status: PlanStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE trip_plans SET status = $2 WHERE id = $1")
        .bind(plan_id)
        .bind(status.as_str())
        .execute(conn)
        .await?;
    Ok(())
}
