use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password, UNMATCHED_HASH};
use crate::auth::store::CredentialStore;
use crate::auth::token::TokenSigner;
use crate::errors::AppError;
use crate::locale::Message;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Creates a user and returns its id.
pub async fn register(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<Uuid, AppError> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AppError::Validation(Message::InvalidEmail));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(Message::PasswordTooShort));
    }
    if store.find_by_email(email).await?.is_some() {
        return Err(AppError::Conflict(Message::EmailTaken));
    }

    let password_hash = hash_password(password).await?;
    // The unique index still reports Conflict if a concurrent signup won.
    let user = store.insert(email, &password_hash).await?;

    info!("Registered user {}", user.id);
    Ok(user.id)
}

/// Checks credentials and issues a one-hour session token.
pub async fn authenticate(
    store: &dyn CredentialStore,
    signer: &TokenSigner,
    email: &str,
    password: &str,
) -> Result<String, AppError> {
    let Some(user) = store.find_by_email(email.trim()).await? else {
        verify_password(password, UNMATCHED_HASH).await?;
        warn!("Login attempt for unknown email");
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(password, &user.password_hash).await? {
        warn!("Login attempt with wrong password for user {}", user.id);
        return Err(AppError::InvalidCredentials);
    }

    signer
        .issue_session(user.id, &user.email)
        .map_err(|e| AppError::Internal(e.into()))
}
