//! In-memory [`VersionStore`] used to exercise ingestion without touching disk.

use crate::archive::{expand_zip, ArchiveEntry};
use crate::store::{Sidecar, VersionStore};
use crate::FilesError;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use vault_types::{ArtifactName, ProjectName, VersionNumber};

#[derive(Debug, Default)]
struct Tree {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl Tree {
    fn add_dir_all(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn children_dirs(&self, parent: &Path) -> Vec<String> {
        self.dirs
            .iter()
            .filter(|d| d.parent() == Some(parent))
            .filter_map(|d| d.file_name().and_then(|n| n.to_str()).map(str::to_owned))
            .collect()
    }
}

/// Version store that keeps the whole tree in memory.
///
/// Paths are relative to an implicit storage root. Directories are tracked explicitly so
/// that empty version directories are visible, as they would be on disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tree: Mutex<Tree>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        // A panic while holding the lock cannot leave the maps half-updated.
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates an arbitrary directory, e.g. to seed malformed version labels in tests.
    pub fn insert_dir(&self, relative: impl AsRef<Path>) {
        self.lock().add_dir_all(relative.as_ref());
    }

    /// Creates or replaces a file, creating its parent directories.
    pub fn insert_file(&self, relative: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let relative = relative.as_ref();
        let mut tree = self.lock();
        if let Some(parent) = relative.parent() {
            tree.add_dir_all(parent);
        }
        tree.files.insert(relative.to_path_buf(), contents.into());
    }

    /// Contents of a file, if present.
    pub fn file(&self, relative: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.lock().files.get(relative.as_ref()).cloned()
    }

    /// Whether a directory exists.
    pub fn has_dir(&self, relative: impl AsRef<Path>) -> bool {
        self.lock().dirs.contains(relative.as_ref())
    }

    fn version_path(project: &ProjectName, label: &str) -> PathBuf {
        Path::new(project.as_str()).join(label)
    }
}

impl VersionStore for MemoryStore {
    fn ensure_project(&self, project: &ProjectName) -> Result<(), FilesError> {
        self.lock().add_dir_all(Path::new(project.as_str()));
        Ok(())
    }

    fn list_versions(&self, project: &ProjectName) -> Result<Vec<String>, FilesError> {
        let mut labels = self.lock().children_dirs(Path::new(project.as_str()));
        labels.retain(|name| name.starts_with('v'));
        Ok(labels)
    }

    fn contains_artifact(
        &self,
        project: &ProjectName,
        label: &str,
        artifact: &ArtifactName,
    ) -> Result<bool, FilesError> {
        let path = Self::version_path(project, label).join(artifact.as_str());
        let tree = self.lock();
        Ok(tree.files.contains_key(&path) || tree.dirs.contains(&path))
    }

    fn create_version(
        &self,
        project: &ProjectName,
        version: VersionNumber,
    ) -> Result<(), FilesError> {
        self.lock()
            .add_dir_all(&Self::version_path(project, &version.label()));
        Ok(())
    }

    fn write_artifact(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
        content: &mut dyn Read,
    ) -> Result<u64, FilesError> {
        let dir = Self::version_path(project, &version.label());
        let mut buffer = Vec::new();
        content.read_to_end(&mut buffer)?;

        let mut tree = self.lock();
        if !tree.dirs.contains(&dir) {
            return Err(FilesError::NotFound(format!(
                "Directory does not exist: {}",
                dir.display()
            )));
        }
        let written = buffer.len() as u64;
        tree.files.insert(dir.join(artifact.as_str()), buffer);
        Ok(written)
    }

    fn expand_archive(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
    ) -> Result<usize, FilesError> {
        let dir = Self::version_path(project, &version.label());
        let source = dir.join(artifact.as_str());
        let bytes = self
            .file(&source)
            .ok_or_else(|| FilesError::NotFound(source.display().to_string()))?;

        let mut staged = Vec::new();
        let count = expand_zip(Cursor::new(bytes), |entry| {
            match entry {
                ArchiveEntry::Dir(relative) => staged.push((relative, None)),
                ArchiveEntry::File(relative, contents) => {
                    let mut buffer = Vec::new();
                    contents.read_to_end(&mut buffer)?;
                    staged.push((relative, Some(buffer)));
                }
            }
            Ok(())
        })?;

        let target = dir.join(artifact.expansion_dir_name());
        let mut tree = self.lock();
        tree.add_dir_all(&target);
        for (relative, contents) in staged {
            let path = target.join(relative);
            match contents {
                None => tree.add_dir_all(&path),
                Some(contents) => {
                    if let Some(parent) = path.parent() {
                        tree.add_dir_all(parent);
                    }
                    tree.files.insert(path, contents);
                }
            }
        }
        Ok(count)
    }

    fn write_sidecar(
        &self,
        project: &ProjectName,
        version: VersionNumber,
        artifact: &ArtifactName,
        document: &[u8],
    ) -> Result<(), FilesError> {
        let dir = Self::version_path(project, &version.label());
        let mut tree = self.lock();
        if !tree.dirs.contains(&dir) {
            return Err(FilesError::NotFound(dir.display().to_string()));
        }
        tree.files
            .insert(dir.join(artifact.sidecar_name()), document.to_vec());
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<ProjectName>, FilesError> {
        self.lock()
            .children_dirs(Path::new(""))
            .into_iter()
            .map(|name| ProjectName::new(name).map_err(|e| FilesError::InvalidPath(e.to_string())))
            .collect()
    }

    fn read_sidecars(
        &self,
        project: &ProjectName,
        label: &str,
        suffix: &str,
    ) -> Result<Vec<Sidecar>, FilesError> {
        let dir = Self::version_path(project, label);
        let tree = self.lock();
        if !tree.dirs.contains(&dir) {
            return Err(FilesError::NotFound(dir.display().to_string()));
        }
        Ok(tree
            .files
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir.as_path()))
            .filter_map(|(path, contents)| {
                let file_name = path.file_name()?.to_str()?;
                file_name.ends_with(suffix).then(|| Sidecar {
                    file_name: file_name.to_owned(),
                    contents: contents.clone(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::{damage, stored_zip, zip_bytes};

    #[test]
    fn test_memory_store_versions_and_files() {
        let store = MemoryStore::new();
        let project = ProjectName::new("birds").unwrap();
        let name = ArtifactName::new("robin.png").unwrap();

        store.ensure_project(&project).unwrap();
        assert!(store.list_versions(&project).unwrap().is_empty());

        store.create_version(&project, VersionNumber::FIRST).unwrap();
        store
            .write_artifact(&project, VersionNumber::FIRST, &name, &mut &b"img"[..])
            .unwrap();
        store.insert_dir("birds/notes");

        assert_eq!(store.list_versions(&project).unwrap(), vec!["v1".to_string()]);
        assert!(store.contains_artifact(&project, "v1", &name).unwrap());
        assert_eq!(store.file("birds/v1/robin.png"), Some(b"img".to_vec()));
    }

    #[test]
    fn test_memory_store_expands_archives() {
        let store = MemoryStore::new();
        let project = ProjectName::new("birds").unwrap();
        let name = ArtifactName::new("pack.zip").unwrap();
        store.insert_file("birds/v1/pack.zip", zip_bytes(&[("x/y.txt", b"y")]));

        let count = store
            .expand_archive(&project, VersionNumber::FIRST, &name)
            .unwrap();

        assert_eq!(count, 1);
        assert!(store.has_dir("birds/v1/pack/x"));
        assert_eq!(store.file("birds/v1/pack/x/y.txt"), Some(b"y".to_vec()));
    }

    #[test]
    fn test_memory_store_corrupt_archive_has_no_expansion() {
        let store = MemoryStore::new();
        let project = ProjectName::new("birds").unwrap();
        let name = ArtifactName::new("pack.zip").unwrap();
        store.insert_file("birds/v1/pack.zip", b"nope".to_vec());

        let result = store.expand_archive(&project, VersionNumber::FIRST, &name);

        assert!(matches!(result, Err(FilesError::InvalidArchive(_))));
        assert!(!store.has_dir("birds/v1/pack"));
    }

    #[test]
    fn test_memory_store_corrupt_entry_data_has_no_expansion() {
        let store = MemoryStore::new();
        let project = ProjectName::new("birds").unwrap();
        let name = ArtifactName::new("pack.zip").unwrap();
        let mut bytes = stored_zip(&[("ok.txt", b"ok"), ("bad.txt", b"PAYLOAD-TO-DAMAGE")]);
        damage(&mut bytes, b"PAYLOAD-TO-DAMAGE");
        store.insert_file("birds/v1/pack.zip", bytes);

        let result = store.expand_archive(&project, VersionNumber::FIRST, &name);

        assert!(matches!(result, Err(FilesError::InvalidArchive(_))));
        assert!(!store.has_dir("birds/v1/pack"));
        assert_eq!(store.file("birds/v1/pack/ok.txt"), None);
    }
}
