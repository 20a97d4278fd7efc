//! User entity model and DTOs.

use navmate_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Account created through email + password sign-up.
pub const PROVIDER_LOCAL: &str = "local";

/// Account created or linked through Google sign-in.
pub const PROVIDER_GOOGLE: &str = "google";

/// Full user row from the `users` table.
///
/// Contains the password hash -- never serialize this to API responses.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub provider: String,
    pub google_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    /// Already normalized (trimmed, lowercase).
    pub email: String,
    pub password_hash: String,
    pub provider: String,
    pub google_id: Option<String>,
}
