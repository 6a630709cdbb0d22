//! Filesystem-backed [`VersionStore`].
//!
//! The storage root is created (idempotently) and canonicalised when the store is opened.
//! All other paths are built by joining validated [`ProjectName`] and [`ArtifactName`]
//! segments onto that root, so nothing written here can land outside of it.
//!
//! Artifacts and sidecars are first written to a hidden `.part` file in the destination
//! directory and then renamed, so a reader never observes a half-written file under its
//! final name. Archive expansion works the same way on a hidden directory.

use crate::archive::{expand_zip, ArchiveEntry};
use crate::store::{Sidecar, VersionStore};
use crate::FilesError;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use vault_types::{ArtifactName, ProjectName, VersionNumber};

/// Version store rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Opens a store at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the root path exists but is not a directory
    /// - the directory cannot be created or canonicalised
    pub fn open(root: &Path) -> Result<Self, FilesError> {
        if root.exists() && !root.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        fs::create_dir_all(root).map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot create storage root {}: {}",
                root.display(),
                e
            ))
        })?;

        let root = root.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self { root })
    }

    /// Canonicalised storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_dir(&self, project: &ProjectName) -> PathBuf {
        self.root.join(project.as_str())
    }

    fn version_dir(&self, project: &ProjectName, label: &str) -> Result<PathBuf, FilesError> {
        if label.is_empty() || label == "." || label == ".." || label.contains(['/', '\\']) {
            return Err(FilesError::InvalidPath(format!(
                "version label '{label}' is not a single path segment"
            )));
        }
        Ok(self.project_dir(project).join(label))
    }

    /// Absolute path an artifact is (or would be) stored at.
    #[must_use]
    pub fn artifact_path(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
    ) -> PathBuf {
        self.project_dir(project)
            .join(version.label())
            .join(artifact.as_str())
    }

    /// Absolute path of the directory a zip artifact expands into.
    #[must_use]
    pub fn expansion_path(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
    ) -> PathBuf {
        self.project_dir(project)
            .join(version.label())
            .join(artifact.expansion_dir_name())
    }
}

/// Writes `content` to a temporary sibling of `dest` and renames it into place.
fn write_via_rename(dest: &Path, content: &mut dyn Read) -> Result<u64, FilesError> {
    let parent = dest.parent().ok_or_else(|| {
        FilesError::InvalidPath(format!("{} has no parent directory", dest.display()))
    })?;
    if !parent.is_dir() {
        return Err(FilesError::NotFound(format!(
            "Directory does not exist: {}",
            parent.display()
        )));
    }

    let file_name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let part = parent.join(format!(".{}.{}.part", file_name, uuid::Uuid::new_v4().simple()));

    let result = (|| -> io::Result<u64> {
        let mut file = fs::File::create(&part)?;
        let written = io::copy(content, &mut file)?;
        file.flush()?;
        file.sync_all()?;
        fs::rename(&part, dest)?;
        Ok(written)
    })();

    result.map_err(|e| {
        let _ = fs::remove_file(&part);
        FilesError::Io(io::Error::new(
            e.kind(),
            format!("Failed to write {}: {}", dest.display(), e),
        ))
    })
}

/// Names of the immediate subdirectories of `dir`. A missing `dir` has none.
fn subdirectories(dir: &Path) -> Result<Vec<String>, FilesError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::warn!("skipping non UTF-8 directory name: {:?}", raw),
        }
    }
    Ok(names)
}

impl VersionStore for FsStore {
    fn ensure_project(&self, project: &ProjectName) -> Result<(), FilesError> {
        fs::create_dir_all(self.project_dir(project))?;
        Ok(())
    }

    fn list_versions(&self, project: &ProjectName) -> Result<Vec<String>, FilesError> {
        let mut labels = subdirectories(&self.project_dir(project))?;
        labels.retain(|name| name.starts_with('v'));
        Ok(labels)
    }

    fn contains_artifact(
        &self,
        project: &ProjectName,
        label: &str,
        artifact: &ArtifactName,
    ) -> Result<bool, FilesError> {
        let path = self.version_dir(project, label)?.join(artifact.as_str());
        Ok(path.try_exists()?)
    }

    fn create_version(
        &self,
        project: &ProjectName,
        version: VersionNumber,
    ) -> Result<(), FilesError> {
        let dir = self.version_dir(project, &version.label())?;
        fs::create_dir_all(&dir).map_err(|e| {
            FilesError::Io(io::Error::new(
                e.kind(),
                format!("Failed to create version directory {}: {}", dir.display(), e),
            ))
        })?;
        Ok(())
    }

    fn write_artifact(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
        content: &mut dyn Read,
    ) -> Result<u64, FilesError> {
        write_via_rename(&self.artifact_path(project, version, artifact), content)
    }

    fn expand_archive(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
    ) -> Result<usize, FilesError> {
        let source = self.artifact_path(project, version, artifact);
        let target = self.expansion_path(project, version, artifact);
        let staging = target.with_file_name(format!(
            ".{}.{}.expanding",
            artifact.expansion_dir_name(),
            uuid::Uuid::new_v4().simple()
        ));

        let file = fs::File::open(&source).map_err(|e| {
            FilesError::Io(io::Error::new(
                e.kind(),
                format!("Failed to open archive {}: {}", source.display(), e),
            ))
        })?;

        fs::create_dir_all(&staging)?;
        let result = expand_zip(io::BufReader::new(file), |entry| {
            match entry {
                ArchiveEntry::Dir(relative) => fs::create_dir_all(staging.join(relative))?,
                ArchiveEntry::File(relative, contents) => {
                    let out = staging.join(relative);
                    if let Some(parent) = out.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    let mut file = fs::File::create(out)?;
                    io::copy(contents, &mut file)?;
                }
            }
            Ok(())
        })
        .and_then(|count| {
            // Re-expanding into an existing directory merges, matching a plain extract.
            if target.is_dir() {
                merge_dir(&staging, &target)?;
                fs::remove_dir_all(&staging)?;
            } else {
                fs::rename(&staging, &target)?;
            }
            Ok(count)
        });

        if result.is_err() && staging.exists() {
            if let Err(e) = fs::remove_dir_all(&staging) {
                tracing::warn!(
                    "failed to clean up staging directory {}: {}",
                    staging.display(),
                    e
                );
            }
        }
        result
    }

    fn write_sidecar(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
        document: &[u8],
    ) -> Result<(), FilesError> {
        let path = self
            .project_dir(project)
            .join(version.label())
            .join(artifact.sidecar_name());
        let mut reader = document;
        write_via_rename(&path, &mut reader)?;
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<ProjectName>, FilesError> {
        let mut projects = Vec::new();
        for name in subdirectories(&self.root)? {
            match ProjectName::new(name.as_str()) {
                Ok(project) => projects.push(project),
                Err(e) => tracing::warn!("skipping project directory '{}': {}", name, e),
            }
        }
        Ok(projects)
    }

    fn read_sidecars(
        &self,
        project: &ProjectName,
        label: &str,
        suffix: &str,
    ) -> Result<Vec<Sidecar>, FilesError> {
        let dir = self.version_dir(project, label)?;
        let mut sidecars = Vec::new();

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            if !file_name.ends_with(suffix) || !entry.file_type()?.is_file() {
                continue;
            }
            let contents = fs::read(entry.path()).map_err(|e| {
                FilesError::Io(io::Error::new(
                    e.kind(),
                    format!("Failed to read {}: {}", entry.path().display(), e),
                ))
            })?;
            sidecars.push(Sidecar {
                file_name,
                contents,
            });
        }

        Ok(sidecars)
    }
}

/// Moves the contents of `from` into `to`, replacing files that already exist.
fn merge_dir(from: &Path, to: &Path) -> Result<(), FilesError> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            merge_dir(&entry.path(), &dest)?;
        } else {
            fs::rename(entry.path(), dest)?;
        }
    }
    Ok(())
}
