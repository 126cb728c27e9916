use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::locale::Message;
use crate::models::user::UserRow;

/// Persisted user records, looked up by email.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError>;

    /// Fails with `Conflict` when the email is already registered.
    async fn insert(&self, email: &str, password_hash: &str) -> Result<UserRow, AppError>;
}

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        PgCredentialStore { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        Ok(
            sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<UserRow, AppError> {
        let user = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(Message::EmailTaken)
            } else {
                AppError::Database(e)
            }
        })?;

        info!("Inserted user {}", user.id);
        Ok(user)
    }
}
