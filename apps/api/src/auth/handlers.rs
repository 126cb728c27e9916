use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::credentials::{authenticate, register};
use crate::errors::AppError;
use crate::locale::{Locale, Message};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub token: String,
}

/// POST /signup
pub async fn handle_signup(
    State(state): State<AppState>,
    locale: Locale,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let Json(req) = payload.map_err(|_| AppError::Validation(Message::MalformedBody))?;
    register(state.users.as_ref(), &req.email, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: locale.text(Message::SignupSuccess),
        }),
    ))
}

/// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    locale: Locale,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload.map_err(|_| AppError::Validation(Message::MalformedBody))?;
    let token = authenticate(
        state.users.as_ref(),
        &state.tokens,
        &req.email,
        &req.password,
    )
    .await?;

    Ok(Json(LoginResponse {
        success: true,
        message: locale.text(Message::LoginSuccess),
        token,
    }))
}
