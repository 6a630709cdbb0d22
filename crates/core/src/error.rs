use crate::constants::MIB;
use vault_files::FilesError;
use vault_types::NameError;

/// Machine-readable classification of an [`IngestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestErrorKind {
    MissingFile,
    EmptyFilename,
    FileTooLarge,
    UnsupportedType,
    InvalidName,
    DuplicateFile,
    InvalidArchive,
    Unexpected,
}

impl IngestErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestErrorKind::MissingFile => "missing_file",
            IngestErrorKind::EmptyFilename => "empty_filename",
            IngestErrorKind::FileTooLarge => "file_too_large",
            IngestErrorKind::UnsupportedType => "unsupported_type",
            IngestErrorKind::InvalidName => "invalid_name",
            IngestErrorKind::DuplicateFile => "duplicate_file",
            IngestErrorKind::InvalidArchive => "invalid_archive",
            IngestErrorKind::Unexpected => "unexpected",
        }
    }
}

/// Renders a size limit in whole megabytes when it is one, otherwise in bytes.
fn describe_limit(limit: &u64) -> String {
    let limit = *limit;
    if limit >= MIB && limit % MIB == 0 {
        format!("{}MB", limit / MIB)
    } else {
        format!("{limit} bytes")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("No file part")]
    MissingFile,
    #[error("No selected file")]
    EmptyFilename,
    #[error("File exceeds max size of {}", describe_limit(.limit))]
    FileTooLarge { size: u64, limit: u64 },
    #[error("Unsupported file type: {extension}")]
    UnsupportedType { extension: String },
    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),
    #[error(
        "A file named \"{filename}\" already exists in a previous version of this project ({version})."
    )]
    DuplicateFile { filename: String, version: String },
    /// The artifact is stored at `stored_at` but could not be expanded.
    #[error("Uploaded file is not a valid ZIP archive (kept at {stored_at}): {reason}")]
    InvalidArchive { stored_at: String, reason: String },
    #[error("{0}")]
    Unexpected(String),
}

impl IngestError {
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            IngestError::MissingFile => IngestErrorKind::MissingFile,
            IngestError::EmptyFilename => IngestErrorKind::EmptyFilename,
            IngestError::FileTooLarge { .. } => IngestErrorKind::FileTooLarge,
            IngestError::UnsupportedType { .. } => IngestErrorKind::UnsupportedType,
            IngestError::InvalidName(_) => IngestErrorKind::InvalidName,
            IngestError::DuplicateFile { .. } => IngestErrorKind::DuplicateFile,
            IngestError::InvalidArchive { .. } => IngestErrorKind::InvalidArchive,
            IngestError::Unexpected(_) => IngestErrorKind::Unexpected,
        }
    }
}

impl From<FilesError> for IngestError {
    fn from(err: FilesError) -> Self {
        IngestError::Unexpected(err.to_string())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Unexpected(format!("failed to serialize metadata: {err}"))
    }
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read storage tree: {0}")]
    Storage(#[from] FilesError),
    #[error("failed to parse metadata {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_too_large_message_in_megabytes() {
        let err = IngestError::FileTooLarge {
            size: 200 * MIB,
            limit: 100 * MIB,
        };
        assert_eq!(err.to_string(), "File exceeds max size of 100MB");
    }

    #[test]
    fn test_file_too_large_message_in_bytes_below_one_megabyte() {
        let err = IngestError::FileTooLarge {
            size: 5,
            limit: 4,
        };
        assert_eq!(err.to_string(), "File exceeds max size of 4 bytes");
    }

    #[test]
    fn test_file_too_large_message_in_bytes_for_partial_megabytes() {
        let limit = MIB + MIB / 2;
        let err = IngestError::FileTooLarge { size: 2 * MIB, limit };
        assert_eq!(
            err.to_string(),
            format!("File exceeds max size of {limit} bytes")
        );
    }

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(IngestError::MissingFile.kind().as_str(), "missing_file");
        assert_eq!(
            IngestError::Unexpected("boom".into()).kind(),
            IngestErrorKind::Unexpected
        );
    }
}
