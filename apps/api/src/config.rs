use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::locale::Locale;

/// Which object storage backend resumes are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    S3(S3Config),
    Local { root: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    /// Set for MinIO and other S3-compatible endpoints; `None` means AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub storage: StorageBackend,
    pub public_base_url: String,
    pub upload_tmp_dir: PathBuf,
    pub signed_url_ttl_secs: u64,
    pub default_locale: Locale,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let storage = match optional_env("STORAGE_BACKEND").as_deref() {
            None | Some("s3") => StorageBackend::S3(S3Config {
                bucket: require_env("S3_BUCKET")?,
                endpoint: optional_env("S3_ENDPOINT"),
                region: optional_env("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            Some("local") => StorageBackend::Local {
                root: optional_env("LOCAL_STORAGE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./storage")),
            },
            Some(other) => bail!("STORAGE_BACKEND must be 's3' or 'local', got '{other}'"),
        };

        let default_locale = match optional_env("DEFAULT_LOCALE") {
            Some(tag) => Locale::from_tag(&tag)
                .with_context(|| format!("DEFAULT_LOCALE '{tag}' is not a supported locale"))?,
            None => Locale::default(),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: non_blank("JWT_SECRET", require_env("JWT_SECRET")?)?,
            storage,
            public_base_url: optional_env("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            upload_tmp_dir: optional_env("UPLOAD_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            signed_url_ttl_secs: optional_env("SIGNED_URL_TTL_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("SIGNED_URL_TTL_SECS must be a number of seconds")?
                .unwrap_or(3600),
            default_locale,
            port,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// An empty HS256 key would let anyone mint tokens.
fn non_blank(key: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        bail!("Environment variable '{key}' must not be blank");
    }
    Ok(value)
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
