use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::token::TokenSigner;
use crate::errors::AppError;
use crate::state::AppState;

/// The verified caller, available to handlers behind [`require_auth`] as
/// `Extension<Identity>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Verifies a bearer token. Missing, malformed, expired and foreign-key
/// tokens are all `Unauthorized`.
pub fn verify(signer: &TokenSigner, token: Option<&str>) -> Result<Identity, AppError> {
    let token = token.ok_or_else(|| {
        warn!("Bearer token missing, authentication denied");
        AppError::Unauthorized
    })?;
    let claims = signer.verify_session(token).map_err(|e| {
        warn!("Bearer token rejected: {e}");
        AppError::Unauthorized
    })?;
    Ok(Identity {
        user_id: claims.sub,
        email: claims.email,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware for routes that need a signed-in caller.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = verify(&state.tokens, bearer_token(&headers))?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
