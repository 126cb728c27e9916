//! Object Storage Gateway — pluggable, trait-based store for uploaded files.
//!
//! Backends: `S3ObjectStore` (AWS or MinIO) and `LocalObjectStore` (a directory
//! on disk, with signed URLs served by this API). `AppState` holds an
//! `Arc<dyn ObjectStore>` chosen at startup from `STORAGE_BACKEND`.
//!
//! Objects are written gzip-compressed with `Content-Encoding: gzip`.

pub mod handlers;
pub mod local;
pub mod s3;

use std::io;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use flate2::{write::GzEncoder, Compression};
use thiserror::Error;
use uuid::Uuid;

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Transfers the file at `local_path` under a fresh key derived from
    /// `original_name` and returns that key. The local file is left alone;
    /// the caller owns its cleanup.
    async fn upload(
        &self,
        local_path: &Path,
        original_name: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Returns a URL granting read access to `key` for `ttl`.
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;
}

/// Builds `"{stem}-{uuid}{.ext}"` from the base name of `original_name`.
pub fn destination_key(original_name: &str) -> String {
    let base = original_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let (stem, ext) = match base.rfind('.') {
        Some(i) if i > 0 => base.split_at(i),
        _ => (base, ""),
    };

    let mut stem = sanitize(stem);
    if stem.is_empty() {
        stem.push_str("file");
    }
    format!("{stem}-{}{}", Uuid::new_v4(), sanitize(ext))
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Rejects keys that could escape a storage root or were never issued here.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\'])
        || key.chars().any(char::is_control);
    if invalid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Reads and gzip-compresses a local file on the blocking pool.
pub(crate) async fn compress_file(path: &Path) -> Result<Vec<u8>, StorageError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || gzip(&path))
        .await
        .map_err(|e| StorageError::Upload(format!("compression task failed: {e}")))?
        .map_err(StorageError::from)
}

fn gzip(path: &Path) -> io::Result<Vec<u8>> {
    let mut input = std::fs::File::open(path)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()
}
