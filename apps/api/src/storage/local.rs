use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::auth::TokenSigner;
use crate::storage::{compress_file, destination_key, validate_key, ObjectStore, StorageError};

/// Objects kept as gzip files in one directory. Signed URLs point back at
/// this API's `/files/{key}` route and carry a download token.
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
    signer: TokenSigner,
}

impl LocalObjectStore {
    /// Creates the storage directory if needed.
    pub fn open(root: PathBuf, public_base_url: &str, signer: TokenSigner) -> io::Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(LocalObjectStore {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            signer,
        })
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Returns the stored (gzip-compressed) bytes of `key`.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(key)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::Io(e),
        })
    }

    /// Checks a download token from a signed URL against `key`.
    pub fn authorize_download(&self, key: &str, token: &str) -> bool {
        self.signer.verify_download(token, key).is_ok()
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(
        &self,
        local_path: &Path,
        original_name: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let key = destination_key(original_name);
        let body = compress_file(local_path).await?;
        tokio::fs::write(self.object_path(&key)?, body).await?;

        info!("Stored '{original_name}' at {}/{key}", self.root.display());
        Ok(key)
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        let path = self.object_path(key)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let token = self
            .signer
            .issue_download(key, ttl)
            .map_err(|e| StorageError::Signing(e.to_string()))?;
        Ok(format!("{}/files/{key}?token={token}", self.public_base_url))
    }
}

/// Content type served for a stored key, from its extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    let ext = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}
