use std::sync::Arc;

use crate::auth::{CredentialStore, TokenSigner};
use crate::companies::CompanyStore;
use crate::config::Config;
use crate::resumes::ResumeStore;
use crate::storage::{LocalObjectStore, ObjectStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn CredentialStore>,
    pub companies: Arc<dyn CompanyStore>,
    pub resumes: Arc<dyn ResumeStore>,
    /// Where uploaded resumes go. Chosen at startup via STORAGE_BACKEND.
    pub storage: Arc<dyn ObjectStore>,
    /// Same store as `storage` when the local backend is active; backs `/files`.
    pub local_files: Option<Arc<LocalObjectStore>>,
    pub tokens: TokenSigner,
    pub config: Config,
}
