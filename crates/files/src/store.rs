//! The storage capability consumed by the ingestion pipeline and the catalog reader.

use crate::FilesError;
use std::fmt;
use std::io::Read;
use vault_types::{ArtifactName, ProjectName, VersionNumber};

/// A metadata sidecar read back from a version directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidecar {
    /// File name of the sidecar within its version directory
    pub file_name: String,

    /// Raw document bytes
    pub contents: Vec<u8>,
}

/// Storage of projects, their version directories and the files inside them.
///
/// Version directories are addressed by label (the directory name) when reading, since the
/// tree may contain `v*` directories that do not parse as a number, and by
/// [`VersionNumber`] when writing, since new versions are always well-formed.
///
/// Implementations provide no cross-call atomicity. Callers that need the
/// read-version-then-create sequence to be exclusive must serialise it themselves.
pub trait VersionStore: Send + Sync + fmt::Debug {
    /// Creates the project directory if it does not yet exist.
    fn ensure_project(&self, project: &ProjectName) -> Result<(), FilesError>;

    /// Lists the names of the project's immediate subdirectories that start with `v`.
    ///
    /// The order is whatever the backing store yields and must not be relied upon.
    /// A project that does not exist has no versions.
    fn list_versions(&self, project: &ProjectName) -> Result<Vec<String>, FilesError>;

    /// Whether the version directory `label` holds a file named exactly `artifact`.
    fn contains_artifact(
        &self,
        project: &ProjectName,
        label: &str,
        artifact: &ArtifactName,
    ) -> Result<bool, FilesError>;

    /// Creates the version directory. Succeeds if it already exists.
    fn create_version(&self, project: &ProjectName, version: VersionNumber)
        -> Result<(), FilesError>;

    /// Streams `content` into the version directory under the artifact's name.
    ///
    /// Returns the number of bytes written.
    fn write_artifact(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
        content: &mut dyn Read,
    ) -> Result<u64, FilesError>;

    /// Expands a stored zip artifact into its sibling expansion directory.
    ///
    /// Returns the number of entries written. Fails with [`FilesError::InvalidArchive`] when
    /// the artifact is not a readable zip, in which case no expansion directory is left.
    fn expand_archive(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
    ) -> Result<usize, FilesError>;

    /// Writes the metadata sidecar for an artifact.
    fn write_sidecar(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
        document: &[u8],
    ) -> Result<(), FilesError>;

    /// Lists every project directory under the storage root.
    fn list_projects(&self) -> Result<Vec<ProjectName>, FilesError>;

    /// Reads every file in the version directory whose name ends with `suffix`.
    fn read_sidecars(
        &self,
        project: &ProjectName,
        label: &str,
        suffix: &str,
    ) -> Result<Vec<Sidecar>, FilesError>;
}
