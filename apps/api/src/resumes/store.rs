use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumeRow};

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn create(&self, resume: &NewResume) -> Result<ResumeRow, AppError>;
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        PgResumeStore { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn create(&self, resume: &NewResume) -> Result<ResumeRow, AppError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, original_name, original_file, pdf_file, content,
                 content_sterilized, email, phone, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&resume.original_name)
        .bind(&resume.original_file)
        .bind(&resume.pdf_file)
        .bind(&resume.content)
        .bind(&resume.content_sterilized)
        .bind(&resume.email)
        .bind(&resume.phone)
        .bind(&resume.location)
        .fetch_one(&self.pool)
        .await?)
    }
}
