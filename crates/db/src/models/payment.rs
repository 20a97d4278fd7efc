//! Payment model and DTOs.

use navmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub booking_id: DbId,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub external_ref: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording an authorization outcome.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub external_ref: String,
}
