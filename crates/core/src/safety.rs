//! Safety check-in session state machine.
//!
//! A plan starts with no session. `start` opens an active session with a
//! random share token and schedules the first heartbeat one interval ahead.
//! Each acknowledgment marks the current heartbeat `acked` and appends a new
//! `due` heartbeat one interval after the acknowledgment time, so the session
//! behaves as a dead-man's switch. `end` makes the session inactive, which is
//! terminal: public status stops resolving its share token.
//!
//! ```text
//! NoSession --start--> Active --ack--> Active
//!                        |
//!                        +----end----> Ended
//! ```
//!
//! The functions here are pure: callers pass the clock in and persist the
//! returned values under a row lock on the session.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Shortest allowed check-in interval.
pub const MIN_INTERVAL_MINUTES: i32 = 1;

/// Longest allowed check-in interval (one day).
pub const MAX_INTERVAL_MINUTES: i32 = 1440;

/// Random bytes behind a share token (32 URL-safe characters once encoded).
pub const SHARE_TOKEN_BYTES: usize = 24;

/// Path prefix of the public share page.
pub const SHARE_PATH_PREFIX: &str = "/safety/s/";

// ---------------------------------------------------------------------------
// Heartbeat status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatStatus {
    Due,
    Acked,
    Escalated,
}

impl HeartbeatStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Acked => "acked",
            Self::Escalated => "escalated",
        }
    }
}

impl fmt::Display for HeartbeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeartbeatStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "due" => Ok(Self::Due),
            "acked" => Ok(Self::Acked),
            "escalated" => Ok(Self::Escalated),
            other => Err(CoreError::Internal(format!(
                "unknown heartbeat status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Why a safety alert was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// The traveller pressed the SOS button.
    Sos,
    /// A heartbeat went past its due time without acknowledgment.
    Overdue,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sos => "sos",
            Self::Overdue => "overdue",
        }
    }

    /// Event type name published on the event bus.
    pub fn event_type(self) -> &'static str {
        match self {
            Self::Sos => "safety.sos",
            Self::Overdue => "safety.overdue",
        }
    }
}

impl FromStr for AlertKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sos" => Ok(Self::Sos),
            "overdue" => Ok(Self::Overdue),
            other => Err(CoreError::Internal(format!("unknown alert kind '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Values for a freshly started session and its first heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    pub share_token: String,
    pub interval_minutes: i32,
    pub started_at: Timestamp,
    /// Due time of the session and of its first heartbeat.
    pub next_due: Timestamp,
}

/// Values written by one acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgement {
    /// Stamped on the current heartbeat.
    pub acked_at: Timestamp,
    /// New session `next_due`, also the due time of the appended heartbeat.
    pub next_due: Timestamp,
}

/// Validate a check-in interval in minutes.
pub fn validate_interval(interval_minutes: i32) -> Result<(), CoreError> {
    if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&interval_minutes) {
        return Err(CoreError::Validation(format!(
            "interval_min must be between {MIN_INTERVAL_MINUTES} and {MAX_INTERVAL_MINUTES}, \
             got {interval_minutes}"
        )));
    }
    Ok(())
}

/// Due time one interval after `from`.
pub fn schedule_next(from: Timestamp, interval_minutes: i32) -> Timestamp {
    from + Duration::minutes(i64::from(interval_minutes))
}

/// Open a new session at `now`.
pub fn start(interval_minutes: i32, now: Timestamp) -> Result<SessionStart, CoreError> {
    validate_interval(interval_minutes)?;
    Ok(SessionStart {
        share_token: generate_share_token(),
        interval_minutes,
        started_at: now,
        next_due: schedule_next(now, interval_minutes),
    })
}

/// Compute the acknowledgment of a session at `now`.
///
/// Fails with [`CoreError::InvalidState`] when the session is no longer active.
pub fn acknowledge(
    active: bool,
    interval_minutes: i32,
    now: Timestamp,
) -> Result<Acknowledgement, CoreError> {
    ensure_active(active)?;
    Ok(Acknowledgement {
        acked_at: now,
        next_due: schedule_next(now, interval_minutes),
    })
}

/// Reject operations on an ended session.
pub fn ensure_active(active: bool) -> Result<(), CoreError> {
    if active {
        Ok(())
    } else {
        Err(CoreError::InvalidState {
            entity: "SafetySession",
            current: "inactive".to_string(),
            message: "session inactive".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Share links
// ---------------------------------------------------------------------------

/// Generate an unguessable URL-safe share token.
pub fn generate_share_token() -> String {
    let mut bytes = [0u8; SHARE_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Share link for a token, absolute when `public_base_url` is non-empty.
pub fn share_url(public_base_url: &str, token: &str) -> String {
    format!(
        "{}{SHARE_PATH_PREFIX}{token}",
        public_base_url.trim_end_matches('/')
    )
}
