//! Read-only listing of every metadata sidecar in the storage tree.

use crate::error::CatalogError;
use crate::metadata::{CatalogEntry, MetadataRecord};
use std::sync::Arc;
use vault_files::VersionStore;
use vault_types::SIDECAR_SUFFIX;

/// Walks project and version directories and collects their sidecars.
///
/// The reader holds no locks and shares nothing with the ingestion pipeline besides the
/// tree itself. A listing taken while an upload is in flight may include a version whose
/// sidecar has not been written yet; such a version simply contributes no entry.
#[derive(Debug, Clone)]
pub struct CatalogReader {
    store: Arc<dyn VersionStore>,
}

impl CatalogReader {
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }

    /// Lists every sidecar, tagged with its project and version directory names.
    ///
    /// The order follows directory enumeration and is not stable.
    ///
    /// # Errors
    ///
    /// A single unreadable or malformed sidecar fails the whole listing; no partial
    /// results are returned.
    pub fn list_all(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut entries = Vec::new();

        for project in self.store.list_projects()? {
            for version in self.store.list_versions(&project)? {
                for sidecar in self
                    .store
                    .read_sidecars(&project, &version, SIDECAR_SUFFIX)?
                {
                    let record: MetadataRecord = serde_json::from_slice(&sidecar.contents)
                        .map_err(|source| CatalogError::Parse {
                            path: format!("{}/{}/{}", project, version, sidecar.file_name),
                            source,
                        })?;
                    entries.push(CatalogEntry {
                        record,
                        project: project.to_string(),
                        version: version.clone(),
                    });
                }
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_files::{FsStore, MemoryStore};

    fn sidecar(name: &str, filename: &str) -> Vec<u8> {
        format!(
            r#"{{"name": "{name}", "description": null, "source": null, "date": null, "status": null, "filename": "{filename}"}}"#
        )
        .into_bytes()
    }

    #[test]
    fn test_lists_two_projects_two_versions() {
        let store = Arc::new(MemoryStore::new());
        for project in ["birds", "fish"] {
            for version in ["v1", "v2"] {
                store.insert_file(
                    format!("{project}/{version}/item_meta.json"),
                    sidecar(project, "item.png"),
                );
                store.insert_file(format!("{project}/{version}/item.png"), b"x".to_vec());
            }
        }

        let mut entries = CatalogReader::new(store).list_all().unwrap();
        entries.sort_by(|a, b| (&a.project, &a.version).cmp(&(&b.project, &b.version)));

        assert_eq!(entries.len(), 4);
        let tags: Vec<_> = entries
            .iter()
            .map(|e| (e.project.as_str(), e.version.as_str()))
            .collect();
        assert_eq!(
            tags,
            vec![("birds", "v1"), ("birds", "v2"), ("fish", "v1"), ("fish", "v2")]
        );
        assert!(entries.iter().all(|e| e.record.filename == "item.png"));
    }

    #[test]
    fn test_empty_tree_lists_nothing() {
        let store = Arc::new(MemoryStore::new());
        assert!(CatalogReader::new(store).list_all().unwrap().is_empty());
    }

    #[test]
    fn test_expanded_archive_contents_are_not_listed() {
        let store = Arc::new(MemoryStore::new());
        store.insert_file("birds/v1/pack_meta.json", sidecar("birds", "pack.zip"));
        store.insert_file("birds/v1/pack/nested_meta.json", sidecar("x", "y.png"));

        let entries = CatalogReader::new(store).list_all().unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record.filename, "pack.zip");
    }

    #[test]
    fn test_malformed_sidecar_fails_listing() {
        let store = Arc::new(MemoryStore::new());
        store.insert_file("birds/v1/good_meta.json", sidecar("birds", "good.png"));
        store.insert_file("birds/v2/bad_meta.json", b"{ not json".to_vec());

        let err = CatalogReader::new(store).list_all().unwrap_err();

        assert!(matches!(err, CatalogError::Parse { ref path, .. } if path == "birds/v2/bad_meta.json"));
    }

    #[test]
    fn test_reads_filesystem_tree() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().join("uploads");
        std::fs::create_dir_all(root.join("birds/v3")).unwrap();
        std::fs::write(
            root.join("birds/v3/robin_meta.json"),
            sidecar("birds", "robin.png"),
        )
        .unwrap();
        let store = Arc::new(FsStore::open(&root).unwrap());

        let entries = CatalogReader::new(store).list_all().unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].project, "birds");
        assert_eq!(entries[0].version, "v3");
        assert_eq!(entries[0].record.name.as_deref(), Some("birds"));
    }
}
