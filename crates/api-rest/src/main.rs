//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `vault-run` binary serves the
//! same router with identical configuration.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{config_from_env, router, AppState};

/// Main entry point for the vault REST API server
///
/// # Environment Variables
/// - `VAULT_REST_ADDR`: Server address (default: "0.0.0.0:5000")
/// - `UPLOAD_DATA_DIR`: Storage root (default: "uploads")
/// - `VAULT_MAX_UPLOAD_BYTES`: Upload size limit in bytes (default: 100 MiB)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or storage root is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("vault_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("VAULT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());

    tracing::info!("-- Starting vault REST API on {}", addr);

    let cfg = Arc::new(config_from_env()?);
    let app = router(AppState::with_fs_store(cfg)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
