mod auth;
mod companies;
mod config;
mod db;
mod errors;
mod locale;
mod models;
mod resumes;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{PgCredentialStore, TokenSigner};
use crate::companies::PgCompanyStore;
use crate::config::{Config, StorageBackend};
use crate::db::create_pool;
use crate::resumes::PgResumeStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{LocalObjectStore, ObjectStore, S3ObjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hirebase API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (migrations run here)
    let db = create_pool(&config.database_url).await?;

    let tokens = TokenSigner::new(config.jwt_secret.as_bytes());

    // Initialize object storage
    let (storage, local_files) = match &config.storage {
        StorageBackend::S3(s3) => {
            let store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::connect(s3).await);
            info!("S3 storage initialized (bucket: {})", s3.bucket);
            (store, None)
        }
        StorageBackend::Local { root } => {
            let store = Arc::new(
                LocalObjectStore::open(root.clone(), &config.public_base_url, tokens.clone())
                    .with_context(|| format!("cannot open storage dir {}", root.display()))?,
            );
            info!("Local storage initialized at {}", root.display());
            let shared: Arc<dyn ObjectStore> = store.clone();
            (shared, Some(store))
        }
    };

    // Build app state
    let state = AppState {
        users: Arc::new(PgCredentialStore::new(db.clone())),
        companies: Arc::new(PgCompanyStore::new(db.clone())),
        resumes: Arc::new(PgResumeStore::new(db.clone())),
        storage,
        local_files,
        tokens,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing database pool");
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
