use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub original_name: String,
    /// Storage key of the uploaded file.
    pub original_file: String,
    /// Storage key of the file served for reading.
    pub pdf_file: String,
    pub content: String,
    pub content_sterilized: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resume metadata as assembled by the upload flow. Contact and text fields
/// are stored as empty strings when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewResume {
    pub original_name: String,
    pub original_file: String,
    pub pdf_file: String,
    pub content: String,
    pub content_sterilized: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}
