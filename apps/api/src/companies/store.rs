use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::locale::Message;
use crate::models::company::{CompanyRow, NewCompany};

#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Fails with `Conflict` when the placeholder is taken.
    async fn insert(&self, company: &NewCompany) -> Result<CompanyRow, AppError>;
}

pub struct PgCompanyStore {
    pool: PgPool,
}

impl PgCompanyStore {
    pub fn new(pool: PgPool) -> Self {
        PgCompanyStore { pool }
    }
}

#[async_trait]
impl CompanyStore for PgCompanyStore {
    async fn insert(&self, company: &NewCompany) -> Result<CompanyRow, AppError> {
        sqlx::query_as::<_, CompanyRow>(
            r#"
            INSERT INTO companies (id, name, placeholder, address, logo)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&company.name)
        .bind(&company.placeholder)
        .bind(&company.address)
        .bind(&company.logo)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(Message::PlaceholderTaken)
            } else {
                AppError::Database(e)
            }
        })
    }
}
