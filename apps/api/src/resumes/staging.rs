//! Reads a multipart resume upload into temp files and checks it against the
//! upload limits. Nothing is sent to storage until the whole request passes.

use std::io::Write;
use std::path::{Path, PathBuf};

use axum::{
    extract::multipart::{Field, Multipart, MultipartError},
    http::StatusCode,
};
use bytes::{Bytes, BytesMut};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::errors::AppError;
use crate::locale::Message;

pub const FILES_FIELD: &str = "files";
pub const MAX_FILES: usize = 10;
pub const MAX_FILE_BYTES: usize = 2 * 1024 * 1024;

/// PDF, plain text, legacy Word and modern Word.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "text/plain",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// One accepted file, held in a temp file that is deleted on drop.
#[derive(Debug)]
pub struct StagedFile {
    pub original_name: String,
    pub content_type: String,
    temp: NamedTempFile,
}

impl StagedFile {
    pub fn new(original_name: String, content_type: String, temp: NamedTempFile) -> Self {
        StagedFile {
            original_name,
            content_type,
            temp,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

/// Optional contact fields sent alongside the files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub email: String,
    pub phone: String,
    pub location: String,
}

#[derive(Debug, Default)]
pub struct StagedUpload {
    pub files: Vec<StagedFile>,
    pub contact: ContactFields,
}

/// Normalizes a declared content type and checks it against the allow-list.
/// Parameters such as `charset` are ignored.
pub fn allowed_content_type(declared: &str) -> Option<&'static str> {
    let parsed = declared.parse::<mime::Mime>().ok()?;
    let essence = parsed.essence_str().to_ascii_lowercase();
    ALLOWED_CONTENT_TYPES
        .iter()
        .copied()
        .find(|allowed| *allowed == essence)
}

fn malformed(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::Validation(Message::FileTooLarge);
    }
    warn!("Rejected multipart upload: {e}");
    AppError::Validation(Message::MalformedUpload)
}

/// Drains the multipart body. Any count, size or type violation rejects the
/// whole request; already staged temp files are dropped (and deleted) with it.
pub async fn stage_multipart(
    mut multipart: Multipart,
    tmp_dir: &Path,
) -> Result<StagedUpload, AppError> {
    let mut upload = StagedUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILES_FIELD => {
                if upload.files.len() == MAX_FILES {
                    return Err(AppError::Validation(Message::TooManyFiles));
                }
                upload.files.push(stage_file(field, tmp_dir).await?);
            }
            "email" => upload.contact.email = field.text().await.map_err(malformed)?,
            "phone" => upload.contact.phone = field.text().await.map_err(malformed)?,
            "location" => upload.contact.location = field.text().await.map_err(malformed)?,
            _ => {}
        }
    }

    if upload.files.is_empty() {
        return Err(AppError::Validation(Message::NoFilesUploaded));
    }
    Ok(upload)
}

async fn stage_file(mut field: Field<'_>, tmp_dir: &Path) -> Result<StagedFile, AppError> {
    let original_name = field.file_name().unwrap_or("upload").to_string();
    let declared = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let Some(content_type) = allowed_content_type(&declared) else {
        warn!("Rejected upload '{original_name}' with content type '{declared}'");
        return Err(AppError::RejectedFile {
            message: Message::UnsupportedFileType,
            file_name: original_name,
        });
    };

    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        if buf.len() + chunk.len() > MAX_FILE_BYTES {
            return Err(AppError::RejectedFile {
                message: Message::FileTooLarge,
                file_name: original_name,
            });
        }
        buf.extend_from_slice(&chunk);
    }

    let temp = write_temp(tmp_dir.to_path_buf(), buf.freeze()).await?;
    Ok(StagedFile::new(original_name, content_type.to_string(), temp))
}

async fn write_temp(dir: PathBuf, bytes: Bytes) -> Result<NamedTempFile, AppError> {
    let staged = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        let mut temp = tempfile::Builder::new()
            .prefix("resume-")
            .tempfile_in(dir)?;
        temp.write_all(&bytes)?;
        temp.flush()?;
        Ok(temp)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    staged.map_err(|e| AppError::Internal(anyhow::Error::new(e).context("staging upload failed")))
}
