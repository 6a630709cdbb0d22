//! Validated value types for the upload vault.
//!
//! These types sit at the boundary between free-form client input and the on-disk layout.
//! Anything that becomes a path segment under the storage root is represented here, so the
//! rest of the workspace never joins raw request strings onto a path.

use std::fmt;

/// Project used when an upload does not name one (or names the empty string).
pub const DEFAULT_PROJECT: &str = "default";

/// Suffix that replaces an artifact's extension to form its metadata sidecar name.
pub const SIDECAR_SUFFIX: &str = "_meta.json";

/// Extension (lowercase, without the dot) of artifacts that are expanded after upload.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Errors that can occur when creating validated name types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The input was empty
    #[error("name cannot be empty")]
    Empty,

    /// The input would not stay a single path segment
    #[error("name '{0}' is not a safe path segment")]
    UnsafeSegment(String),
}

/// Rejects anything that would not resolve to exactly one directory entry.
fn check_segment(input: &str) -> Result<(), NameError> {
    if input.is_empty() {
        return Err(NameError::Empty);
    }
    if input == "." || input == ".." || input.contains(['/', '\\', '\0']) {
        return Err(NameError::UnsafeSegment(input.to_owned()));
    }
    Ok(())
}

/// Splits a filename into `(stem, extension)` where the extension keeps its leading dot.
///
/// Leading dots of the final path segment never start an extension, so `.zip` has no
/// extension and `archive.tar.zip` has the extension `.zip`.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let segment_start = filename.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let segment = &filename[segment_start..];
    let leading_dots = segment.len() - segment.trim_start_matches('.').len();

    match segment.rfind('.') {
        Some(dot) if dot >= leading_dots => {
            let split = segment_start + dot;
            (&filename[..split], &filename[split..])
        }
        _ => (filename, ""),
    }
}

/// Lowercased extension of `filename` including the leading dot, or `""` if it has none.
pub fn extension_of(filename: &str) -> String {
    split_extension(filename).1.to_ascii_lowercase()
}

/// Name of a project directory directly beneath the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectName(String);

impl ProjectName {
    /// Creates a project name, rejecting values that are not a single safe path segment.
    pub fn new(input: impl Into<String>) -> Result<Self, NameError> {
        let input = input.into();
        check_segment(&input)?;
        Ok(Self(input))
    }

    /// Resolves the project for an upload form value.
    ///
    /// `None` and the empty string both fall back to [`DEFAULT_PROJECT`].
    pub fn from_form(value: Option<&str>) -> Result<Self, NameError> {
        match value {
            Some(name) if !name.is_empty() => Self::new(name),
            _ => Ok(Self(DEFAULT_PROJECT.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Client-supplied filename of an uploaded artifact.
///
/// The name is stored verbatim: no case folding, no renaming. Only names that would escape
/// the version directory are refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName(String);

impl ArtifactName {
    pub fn new(input: impl Into<String>) -> Result<Self, NameError> {
        let input = input.into();
        check_segment(&input)?;
        Ok(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased extension including the dot (e.g. `.jpg`), or `""`.
    pub fn extension(&self) -> String {
        extension_of(&self.0)
    }

    /// Filename with its extension removed, case preserved.
    pub fn stem(&self) -> &str {
        split_extension(&self.0).0
    }

    /// Whether this artifact is a zip archive that must be expanded.
    pub fn is_archive(&self) -> bool {
        self.extension() == format!(".{ARCHIVE_EXTENSION}")
    }

    /// Name of the sibling directory an archive expands into.
    ///
    /// Only meaningful when [`Self::is_archive`] holds.
    pub fn expansion_dir_name(&self) -> &str {
        self.stem()
    }

    /// Name of the metadata sidecar stored next to the artifact.
    pub fn sidecar_name(&self) -> String {
        format!("{}{}", self.stem(), SIDECAR_SUFFIX)
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sequential version number within a project, serialised as a `v<N>` directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionNumber(u64);

impl VersionNumber {
    /// Version assigned to the first upload of a project.
    pub const FIRST: VersionNumber = VersionNumber(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Parses a directory label of the form `v` followed by one or more ASCII digits.
    ///
    /// Returns `None` for anything else, including labels whose number overflows `u64`.
    pub fn parse_label(label: &str) -> Option<Self> {
        let digits = label.strip_prefix('v')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }

    /// Directory label, e.g. `v3`.
    pub fn label(self) -> String {
        format!("v{}", self.0)
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
