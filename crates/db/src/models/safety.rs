//! Safety session, heartbeat and alert models.

use navmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `safety_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SafetySession {
    pub id: DbId,
    pub plan_id: DbId,
    pub share_token: String,
    pub interval_minutes: i32,
    pub next_due: Timestamp,
    pub active: bool,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
}

/// A row from the `heartbeats` table. The newest row of a session is its
/// current heartbeat.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Heartbeat {
    pub id: DbId,
    pub session_id: DbId,
    pub due_at: Timestamp,
    pub acked_at: Option<Timestamp>,
    pub status: String,
    pub created_at: Timestamp,
}

/// Read-only projection behind the public share page: an active session
/// joined with its plan and current heartbeat.
#[derive(Debug, Clone, FromRow)]
pub struct PublicSessionStatus {
    pub plan_id: DbId,
    pub origin: String,
    pub destination: String,
    pub started_at: Timestamp,
    pub next_due: Timestamp,
    pub active: bool,
    pub interval_minutes: i32,
    pub heartbeat_due_at: Option<Timestamp>,
    pub heartbeat_status: Option<String>,
    pub heartbeat_acked_at: Option<Timestamp>,
}

/// A row from the `safety_alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SafetyAlert {
    pub id: DbId,
    /// `sos` or `overdue`.
    pub kind: String,
    pub plan_id: DbId,
    pub session_id: Option<DbId>,
    pub heartbeat_id: Option<DbId>,
    pub location: Option<String>,
    pub message: Option<String>,
    pub created_at: Timestamp,
    pub notified_at: Option<Timestamp>,
}

/// DTO for recording an SOS alert.
#[derive(Debug, Clone)]
pub struct CreateSosAlert {
    pub plan_id: DbId,
    pub session_id: Option<DbId>,
    pub location: Option<String>,
    pub message: Option<String>,
}
