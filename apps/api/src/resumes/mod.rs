//! Resume upload and retrieval.

pub mod extract;
pub mod handlers;
pub mod staging;
pub mod sterilize;
pub mod store;
pub mod upload;

use serde::{Deserialize, Serialize};

pub use store::{PgResumeStore, ResumeStore};

/// A file that made it into storage and the resume table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResume {
    pub original_name: String,
    pub stored_file_name: String,
}
