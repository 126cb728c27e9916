use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Sessions last one hour.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

const SESSION_AUDIENCE: &str = "session";
const DOWNLOAD_AUDIENCE: &str = "download";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("token was issued for another object")]
    WrongObject,
}

/// Claims of the bearer token handed out by `/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims embedded in local-disk signed URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DownloadClaims {
    key: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// HS256 signer shared by session tokens and download links. The `aud` claim
/// keeps one kind from being accepted as the other.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        TokenSigner {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue_session(&self, user_id: Uuid, email: &str) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        self.sign(&SessionClaims {
            sub: user_id,
            email: email.to_string(),
            aud: SESSION_AUDIENCE.to_string(),
            iat,
            exp: iat + SESSION_TTL.as_secs() as i64,
        })
    }

    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify(token, SESSION_AUDIENCE)
    }

    pub fn issue_download(&self, key: &str, ttl: Duration) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        self.sign(&DownloadClaims {
            key: key.to_string(),
            aud: DOWNLOAD_AUDIENCE.to_string(),
            iat,
            exp: iat + ttl.as_secs() as i64,
        })
    }

    pub fn verify_download(&self, token: &str, key: &str) -> Result<(), TokenError> {
        let claims: DownloadClaims = self.verify(token, DOWNLOAD_AUDIENCE)?;
        if claims.key != key {
            return Err(TokenError::WrongObject);
        }
        Ok(())
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Encode)
    }

    fn verify<T: DeserializeOwned>(&self, token: &str, audience: &str) -> Result<T, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        decode::<T>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}
