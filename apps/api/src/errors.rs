use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::locale::{Locale, Message};
use crate::resumes::StoredResume;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0:?}")]
    Validation(Message),

    #[error("Rejected file '{file_name}': {message:?}")]
    RejectedFile { message: Message, file_name: String },

    #[error("Conflict: {0:?}")]
    Conflict(Message),

    /// Unknown email and wrong password both end up here.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0:?}")]
    NotFound(Message),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Upload aborted at '{failed_file}': {cause}")]
    UploadAborted {
        failed_file: String,
        stored: Vec<StoredResume>,
        cause: Box<AppError>,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// The rendered shape of an error. Kept in the response extensions so the
/// locale stage can re-render the body.
#[derive(Debug, Clone)]
pub struct ErrorPayload {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: Message,
    pub extra: Map<String, Value>,
}

impl ErrorPayload {
    fn new(status: StatusCode, code: &'static str, message: Message) -> Self {
        ErrorPayload {
            status,
            code,
            message,
            extra: Map::new(),
        }
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn into_localized_response(self, locale: Locale) -> Response {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("code".to_string(), json!(self.code));
        body.insert("message".to_string(), json!(locale.text(self.message)));
        for (key, value) in &self.extra {
            body.insert(key.clone(), value.clone());
        }

        let mut response = (self.status, Json(Value::Object(body))).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl AppError {
    fn payload(&self) -> ErrorPayload {
        match self {
            AppError::Validation(message) => {
                ErrorPayload::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", *message)
            }
            AppError::RejectedFile { message, file_name } => {
                ErrorPayload::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", *message)
                    .with("fileName", json!(file_name))
            }
            AppError::Conflict(message) => {
                ErrorPayload::new(StatusCode::BAD_REQUEST, "CONFLICT", *message)
            }
            AppError::InvalidCredentials => ErrorPayload::new(
                StatusCode::BAD_REQUEST,
                "INVALID_CREDENTIALS",
                Message::InvalidCredentials,
            ),
            AppError::Unauthorized => ErrorPayload::new(
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                Message::Unauthorized,
            ),
            AppError::NotFound(message) => {
                ErrorPayload::new(StatusCode::NOT_FOUND, "NOT_FOUND", *message)
            }
            AppError::Storage(StorageError::NotFound(_) | StorageError::InvalidKey(_)) => {
                ErrorPayload::new(StatusCode::NOT_FOUND, "NOT_FOUND", Message::FileNotFound)
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                ErrorPayload::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    Message::StorageFailure,
                )
            }
            AppError::UploadAborted {
                failed_file,
                stored,
                cause,
            } => {
                tracing::error!("Upload aborted at '{failed_file}': {cause}");
                ErrorPayload::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPLOAD_FAILED",
                    Message::UploadFailed,
                )
                .with("failedFile", json!(failed_file))
                .with("data", json!(stored))
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                ErrorPayload::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    Message::ServerError,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                ErrorPayload::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    Message::ServerError,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.payload().into_localized_response(Locale::default())
    }
}
