//! Emergency contact model and DTOs.

use navmate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `emergency_contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmergencyContact {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// 1 is the highest priority.
    pub priority: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a contact.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmergencyContact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// Defaults to 1 when omitted.
    pub priority: Option<i32>,
}
