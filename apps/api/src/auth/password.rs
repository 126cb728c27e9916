use anyhow::{Context, Result};

const BCRYPT_COST: u32 = 10;

/// Well-formed cost-10 hash that no login password matches. Verified against
/// on unknown emails so every failed login costs one bcrypt round.
pub const UNMATCHED_HASH: &str = "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// Hashes a password with a fresh salt on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .context("password hashing task failed")?
        .context("bcrypt hash failed")
}

/// Checks a password against a stored bcrypt hash. A malformed hash counts as
/// a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("password verification task failed")?;
    Ok(matches.unwrap_or(false))
}
