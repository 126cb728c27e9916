//! In-memory doubles for the store and storage traits.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use crate::auth::{CredentialStore, TokenSigner};
use crate::companies::CompanyStore;
use crate::config::{Config, StorageBackend};
use crate::errors::AppError;
use crate::locale::{Locale, Message};
use crate::models::company::{CompanyRow, NewCompany};
use crate::models::resume::{NewResume, ResumeRow};
use crate::models::user::UserRow;
use crate::resumes::staging::StagedFile;
use crate::resumes::ResumeStore;
use crate::state::AppState;
use crate::storage::{destination_key, validate_key, ObjectStore, StorageError};

pub const TEST_SECRET: &[u8] = b"test-secret";

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<Vec<UserRow>>,
}

impl MemoryCredentialStore {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<UserRow, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict(Message::EmailTaken));
        }
        let user = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryCompanyStore {
    companies: Mutex<Vec<CompanyRow>>,
}

impl MemoryCompanyStore {
    pub fn len(&self) -> usize {
        self.companies.lock().unwrap().len()
    }
}

#[async_trait]
impl CompanyStore for MemoryCompanyStore {
    async fn insert(&self, company: &NewCompany) -> Result<CompanyRow, AppError> {
        let mut companies = self.companies.lock().unwrap();
        if companies
            .iter()
            .any(|c| c.placeholder == company.placeholder)
        {
            return Err(AppError::Conflict(Message::PlaceholderTaken));
        }
        let now = Utc::now();
        let row = CompanyRow {
            id: Uuid::new_v4(),
            name: company.name.clone(),
            placeholder: company.placeholder.clone(),
            address: company.address.clone(),
            logo: company.logo.clone(),
            created_at: now,
            updated_at: now,
        };
        companies.push(row.clone());
        Ok(row)
    }
}

#[derive(Default)]
pub struct MemoryResumeStore {
    rows: Mutex<Vec<ResumeRow>>,
}

impl MemoryResumeStore {
    pub fn rows(&self) -> Vec<ResumeRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn create(&self, resume: &NewResume) -> Result<ResumeRow, AppError> {
        let now = Utc::now();
        let row = ResumeRow {
            id: Uuid::new_v4(),
            original_name: resume.original_name.clone(),
            original_file: resume.original_file.clone(),
            pdf_file: resume.pdf_file.clone(),
            content: resume.content.clone(),
            content_sterilized: resume.content_sterilized.clone(),
            email: resume.email.clone(),
            phone: resume.phone.clone(),
            location: resume.location.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }
}

/// Object store that keeps raw bytes in memory and can fail the Nth upload.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    attempted: Mutex<Vec<String>>,
    fail_on: Option<usize>,
}

impl MemoryObjectStore {
    /// Fails the `n`th upload (1-based).
    pub fn failing_on(n: usize) -> Self {
        MemoryObjectStore {
            fail_on: Some(n),
            ..Default::default()
        }
    }

    /// Original names passed to `upload`, in call order.
    pub fn attempted(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        local_path: &Path,
        original_name: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let call = {
            let mut attempted = self.attempted.lock().unwrap();
            attempted.push(original_name.to_string());
            attempted.len()
        };
        if self.fail_on == Some(call) {
            return Err(StorageError::Upload("injected failure".to_string()));
        }

        let bytes = std::fs::read(local_path)?;
        let key = destination_key(original_name);
        self.objects.lock().unwrap().insert(key.clone(), bytes);
        Ok(key)
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        validate_key(key)?;
        if !self.contains(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!(
            "https://storage.test/{key}?expires_in={}",
            ttl.as_secs()
        ))
    }
}

/// Writes `text` to a temp file in `dir` and wraps it as a staged text upload.
pub fn stage_text_file(dir: &Path, name: &str, text: &str) -> StagedFile {
    let mut temp = tempfile::Builder::new()
        .prefix("resume-")
        .tempfile_in(dir)
        .unwrap();
    temp.write_all(text.as_bytes()).unwrap();
    StagedFile::new(name.to_string(), "text/plain".to_string(), temp)
}

pub fn test_config(upload_tmp_dir: PathBuf) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: String::from_utf8_lossy(TEST_SECRET).into_owned(),
        storage: StorageBackend::Local {
            root: upload_tmp_dir.join("unused"),
        },
        public_base_url: "http://localhost:8080".to_string(),
        upload_tmp_dir,
        signed_url_ttl_secs: 3600,
        default_locale: Locale::En,
        port: 8080,
        rust_log: "info".to_string(),
    }
}

/// App state wired to in-memory doubles, with handles kept for assertions.
pub struct TestApp {
    pub state: AppState,
    pub users: Arc<MemoryCredentialStore>,
    pub companies: Arc<MemoryCompanyStore>,
    pub resumes: Arc<MemoryResumeStore>,
    pub storage: Arc<MemoryObjectStore>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new(storage: MemoryObjectStore) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let users = Arc::new(MemoryCredentialStore::default());
        let companies = Arc::new(MemoryCompanyStore::default());
        let resumes = Arc::new(MemoryResumeStore::default());
        let storage = Arc::new(storage);

        let state = AppState {
            users: users.clone(),
            companies: companies.clone(),
            resumes: resumes.clone(),
            storage: storage.clone(),
            local_files: None,
            tokens: TokenSigner::new(TEST_SECRET),
            config: test_config(upload_dir.path().to_path_buf()),
        };

        TestApp {
            state,
            users,
            companies,
            resumes,
            storage,
            upload_dir,
        }
    }

    pub fn bearer(&self) -> String {
        let token = self
            .state
            .tokens
            .issue_session(Uuid::new_v4(), "ada@example.com")
            .unwrap();
        format!("Bearer {token}")
    }

    pub fn upload_dir_is_empty(&self) -> bool {
        std::fs::read_dir(self.upload_dir.path())
            .unwrap()
            .next()
            .is_none()
    }
}
