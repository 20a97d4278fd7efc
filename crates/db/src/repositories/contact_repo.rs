//! Repository for the `emergency_contacts` table.

use navmate_core::types::DbId;
use sqlx::PgPool;

use crate::models::contact::{CreateEmergencyContact, EmergencyContact};

const COLUMNS: &str = "id, user_id, name, phone, email, priority, created_at, updated_at";

/// Priority given to a contact when none is supplied.
pub const DEFAULT_PRIORITY: i32 = 1;

/// Provides CRUD operations for a user's emergency contacts.
pub struct EmergencyContactRepo;

impl EmergencyContactRepo {
    /// List a user's contacts, highest priority (lowest number) first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<EmergencyContact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM emergency_contacts
             WHERE user_id = $1
             ORDER BY priority, id"
        );
        sqlx::query_as::<_, EmergencyContact>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Add a contact for `user_id`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateEmergencyContact,
    ) -> Result<EmergencyContact, sqlx::Error> {
        let query = format!(
            "INSERT INTO emergency_contacts (user_id, name, phone, email, priority)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmergencyContact>(&query)
            .bind(user_id)
            .bind(input.name.trim())
            .bind(input.phone.trim())
            .bind(input.email.as_deref().map(str::trim))
            .bind(input.priority.unwrap_or(DEFAULT_PRIORITY))
            .fetch_one(pool)
            .await
    }

    /// Delete a contact owned by `user_id`. Returns `true` if a row was removed.
    pub async fn delete_owned(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM emergency_contacts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
