//! # Vault Core
//!
//! Versioned ingestion and storage-layout engine for the upload vault.
//!
//! This crate decides where an uploaded artifact lands, which version number it gets, whether
//! it duplicates an earlier upload, and keeps the metadata sidecar consistent with the stored
//! artifact:
//! - [`LayoutResolver`]: existing versions of a project and the next version number
//! - [`DuplicateGuard`]: whether a filename already exists in any version
//! - [`IngestService`]: the validation and persistence pipeline
//! - [`CatalogReader`]: a flat listing of every sidecar with its provenance
//!
//! **No API concerns**: HTTP routing, multipart parsing and status codes belong in `api-rest`.
//! Storage itself is reached through [`vault_files::VersionStore`].

pub mod catalog;
pub mod config;
pub mod constants;
pub mod duplicates;
pub mod error;
pub mod ingest;
pub mod layout;
pub mod locks;
pub mod metadata;

pub use catalog::CatalogReader;
pub use config::CoreConfig;
pub use constants::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_STORAGE_DIR};
pub use duplicates::DuplicateGuard;
pub use error::{CatalogError, ConfigError, IngestError, IngestErrorKind, IngestResult};
pub use ingest::{IngestReceipt, IngestService, UploadedFile};
pub use layout::LayoutResolver;
pub use metadata::{CatalogEntry, MetadataFields, MetadataRecord};
pub use vault_types::{ArtifactName, ProjectName, VersionNumber};
