use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{config_from_env, router, AppState};
use vault_core::CoreConfig;

/// Main entry point for the upload vault
///
/// Loads configuration, opens the storage root and serves the REST API until the process
/// receives Ctrl+C.
///
/// # Environment Variables
/// - `VAULT_REST_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `UPLOAD_DATA_DIR`: Directory for uploaded projects (default: "uploads")
/// - `VAULT_MAX_UPLOAD_BYTES`: Upload size limit in bytes (default: 100 MiB)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vault=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("vault_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("VAULT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());

    let cfg: Arc<CoreConfig> = Arc::new(config_from_env()?);
    tracing::info!(
        "++ Max upload size: {} bytes",
        cfg.max_upload_bytes()
    );
    let app = router(AppState::with_fs_store(cfg)?);

    tracing::info!("++ Starting vault REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Vault stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
