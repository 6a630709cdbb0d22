//! Vault File Storage
//!
//! This crate owns the on-disk layout of the upload vault. Every uploaded artifact lives in
//! an immutable, sequentially numbered version directory of its project:
//!
//! ```text
//! <storage_root>/
//! └── <project>/
//!     ├── v1/
//!     │   ├── photo.jpg
//!     │   └── photo_meta.json
//!     └── v2/
//!         ├── survey.zip
//!         ├── survey_meta.json
//!         └── survey/          # expanded archive contents
//! ```
//!
//! ## Design Principles
//!
//! - The directory tree is the only persisted state; there is no index or database
//! - Artifacts and sidecars are written to a temporary name and renamed into place
//! - Archive expansion either produces the complete expansion directory or nothing
//! - Storage is reached through the [`VersionStore`] trait so the ingestion logic can be
//!   exercised against [`MemoryStore`] without touching disk
//!
//! ## Example Usage
//!
//! ```no_run
//! use vault_files::{FsStore, VersionStore};
//! use vault_types::ProjectName;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FsStore::open(Path::new("uploads"))?;
//! let project = ProjectName::new("birds")?;
//! store.ensure_project(&project)?;
//! let versions = store.list_versions(&project)?;
//! # Ok(())
//! # }
//! ```

mod archive;
mod fs;
mod memory;
mod store;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use store::{Sidecar, VersionStore};

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Storage root cannot be used
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// A directory or file the operation depends on is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Path validation failed (potential directory traversal or unsafe path)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The artifact could not be read as a zip archive
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
