use axum::{
    extract::{Path, Query, State},
    http::header::{CONTENT_ENCODING, CONTENT_TYPE},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::locale::Message;
use crate::state::AppState;
use crate::storage::local::content_type_for_key;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub token: Option<String>,
}

/// GET /files/:key
///
/// Serves local-disk objects to holders of a signed URL. Only mounted when
/// the local backend is configured.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<DownloadQuery>,
) -> Result<impl IntoResponse, AppError> {
    let store = state
        .local_files
        .as_ref()
        .ok_or(AppError::NotFound(Message::FileNotFound))?;

    let authorized = params
        .token
        .as_deref()
        .is_some_and(|token| store.authorize_download(&key, token));
    if !authorized {
        warn!("Download of '{key}' refused: bad or missing token");
        return Err(AppError::Unauthorized);
    }

    let body = store.read(&key).await?;
    Ok((
        [
            (CONTENT_TYPE, content_type_for_key(&key)),
            (CONTENT_ENCODING, "gzip"),
        ],
        body,
    ))
}
