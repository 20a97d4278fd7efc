//! Repository for the `users` table.

use navmate_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User, PROVIDER_GOOGLE};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, provider, google_id, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// A duplicate email violates `uq_users_email`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, provider, google_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.provider)
            .bind(&input.google_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by normalized email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Whether an account already uses `email`.
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Mark an existing account as Google-linked, keeping an existing
    /// `google_id` if one is already stored.
    pub async fn link_google(
        pool: &PgPool,
        id: DbId,
        google_id: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                provider = $2,
                google_id = COALESCE(google_id, $3)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(PROVIDER_GOOGLE)
            .bind(google_id)
            .fetch_one(pool)
            .await
    }
}
