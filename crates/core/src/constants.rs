//! Constants used throughout the vault core crate.
//!
//! Limits and names that define the storage contract live here so the pipeline, the catalog
//! reader and the binaries agree on them.

/// Default storage root when no explicit directory is configured.
pub const DEFAULT_STORAGE_DIR: &str = "uploads";

/// Number of bytes in one MiB.
pub const MIB: u64 = 1024 * 1024;

/// Default upload size limit. Files strictly larger than this are rejected.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * MIB;

/// Extensions (lowercase, with the dot) accepted for upload.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".bmp", ".zip"];

/// Confirmation returned for a completed upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File and metadata uploaded successfully";
