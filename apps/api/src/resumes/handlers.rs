use std::time::Duration;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::Identity;
use crate::errors::AppError;
use crate::locale::{Locale, Message};
use crate::resumes::staging::stage_multipart;
use crate::resumes::upload::store_resumes;
use crate::resumes::StoredResume;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: Vec<StoredResume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlQuery {
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlData {
    pub signed_url: String,
}

#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    pub success: bool,
    pub data: SignedUrlData,
}

/// POST /upload/resume
///
/// Multipart field `files` (1–10, each ≤ 2MB) plus optional `email`, `phone`
/// and `location`. Files are stored sequentially; see [`store_resumes`] for
/// the partial-failure behavior.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    locale: Locale,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let multipart = multipart.map_err(|e| {
        warn!("Upload without a multipart body: {e}");
        AppError::Validation(Message::MalformedUpload)
    })?;

    let staged = stage_multipart(multipart, &state.config.upload_tmp_dir).await?;
    info!(
        "User {} uploading {} resume file(s)",
        identity.user_id,
        staged.files.len()
    );

    let data = store_resumes(state.resumes.as_ref(), state.storage.as_ref(), staged).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: locale.text(Message::UploadSuccess),
        data,
    }))
}

/// GET /file/signed-url?fileName=
pub async fn handle_signed_url(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<SignedUrlQuery>,
) -> Result<Json<SignedUrlResponse>, AppError> {
    let file_name = params
        .file_name
        .filter(|name| !name.trim().is_empty())
        .ok_or(AppError::Validation(Message::FileNameRequired))?;

    let ttl = Duration::from_secs(state.config.signed_url_ttl_secs);
    let signed_url = state.storage.signed_url(&file_name, ttl).await?;
    info!("Signed '{file_name}' for user {}", identity.user_id);

    Ok(Json(SignedUrlResponse {
        success: true,
        data: SignedUrlData { signed_url },
    }))
}
