//! # API REST
//!
//! REST API implementation for the upload vault.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Multipart upload parsing and spooling
//! - Mapping ingestion errors onto status codes
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Uses `api-shared` for wire types and `vault-core` for all storage decisions.

#![warn(rust_2018_idioms)]

mod error;
mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use vault_core::{
    config::max_upload_bytes_from_env_value, CatalogReader, CoreConfig, IngestService,
    DEFAULT_STORAGE_DIR,
};
use vault_files::{FsStore, VersionStore};

pub use error::ApiError;

/// Application state shared across REST API handlers
///
/// Contains the configuration and the services built on top of one storage backend.
#[derive(Clone, Debug)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    ingest: IngestService,
    catalog: CatalogReader,
}

impl AppState {
    /// Builds the services for the given configuration and storage backend.
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<dyn VersionStore>) -> Self {
        Self {
            ingest: IngestService::new(cfg.clone(), store.clone()),
            catalog: CatalogReader::new(store),
            cfg,
        }
    }

    /// Builds state backed by the filesystem at the configured storage root.
    ///
    /// # Errors
    /// Returns an error if the storage root cannot be created or is not a directory.
    pub fn with_fs_store(cfg: Arc<CoreConfig>) -> anyhow::Result<Self> {
        let store = FsStore::open(cfg.storage_root())?;
        tracing::info!("-- Storage root: {}", store.root().display());
        Ok(Self::new(cfg, Arc::new(store)))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home,
        handlers::call,
        handlers::health,
        handlers::upload,
        handlers::list_datasets,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::MessageRes,
        api_shared::ErrorRes,
        api_shared::UploadForm,
        api_shared::DatasetRecord,
    ))
)]
pub struct ApiDoc;

/// Resolves core configuration from the process environment.
///
/// # Environment Variables
/// - `UPLOAD_DATA_DIR`: Storage root (default: "uploads")
/// - `VAULT_MAX_UPLOAD_BYTES`: Upload size limit in bytes (default: 100 MiB)
///
/// # Errors
/// Returns an error if a variable is present but invalid.
pub fn config_from_env() -> anyhow::Result<CoreConfig> {
    let storage_root =
        std::env::var("UPLOAD_DATA_DIR").unwrap_or_else(|_| DEFAULT_STORAGE_DIR.into());
    let max_upload_bytes =
        max_upload_bytes_from_env_value(std::env::var("VAULT_MAX_UPLOAD_BYTES").ok())?;

    Ok(CoreConfig::new(
        PathBuf::from(storage_root),
        max_upload_bytes,
    )?)
}

/// Builds the REST router.
///
/// The upload route opts out of axum's default body limit: the handler itself stops
/// spooling a file once it exceeds the configured size, so oversized uploads are reported
/// as a validation error instead of being cut off by the transport.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/call", get(handlers::call))
        .route("/health", get(handlers::health))
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::disable()),
        )
        .route("/datasets", get(handlers::list_datasets))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
