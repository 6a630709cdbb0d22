//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Services never read the environment themselves, so several
//! independently configured vaults can live in one process (as they do in tests).

use crate::constants::{ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    storage_root: PathBuf,
    max_upload_bytes: u64,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(storage_root: PathBuf, max_upload_bytes: u64) -> Result<Self, ConfigError> {
        if storage_root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidInput(
                "storage root cannot be empty".into(),
            ));
        }
        if max_upload_bytes == 0 {
            return Err(ConfigError::InvalidInput(
                "max upload size must be greater than zero".into(),
            ));
        }

        Ok(Self {
            storage_root,
            max_upload_bytes,
        })
    }

    /// Configuration with the default size limit.
    pub fn with_storage_root(storage_root: PathBuf) -> Result<Self, ConfigError> {
        Self::new(storage_root, DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        ALLOWED_EXTENSIONS
    }
}

/// Parse the upload size limit from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default limit.
pub fn max_upload_bytes_from_env_value(value: Option<String>) -> Result<u64, ConfigError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_MAX_UPLOAD_BYTES),
        Some(v) => v.parse::<u64>().map_err(|e| {
            ConfigError::InvalidInput(format!("VAULT_MAX_UPLOAD_BYTES '{v}' is not a byte count: {e}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_upload_bytes_defaults() {
        assert_eq!(
            max_upload_bytes_from_env_value(None).unwrap(),
            DEFAULT_MAX_UPLOAD_BYTES
        );
        assert_eq!(
            max_upload_bytes_from_env_value(Some("  ".into())).unwrap(),
            DEFAULT_MAX_UPLOAD_BYTES
        );
        assert_eq!(
            max_upload_bytes_from_env_value(Some(" 2048 ".into())).unwrap(),
            2048
        );
        assert!(max_upload_bytes_from_env_value(Some("lots".into())).is_err());
    }

    #[test]
    fn test_config_rejects_zero_limit() {
        assert!(CoreConfig::new(PathBuf::from("uploads"), 0).is_err());
        assert!(CoreConfig::new(PathBuf::new(), 10).is_err());
        let cfg = CoreConfig::with_storage_root(PathBuf::from("uploads")).unwrap();
        assert_eq!(cfg.max_upload_bytes(), 100 * 1024 * 1024);
    }
}
