//! Storage layout resolution: which versions a project has and which number comes next.

use crate::error::IngestResult;
use std::sync::Arc;
use vault_files::VersionStore;
use vault_types::{ProjectName, VersionNumber};

/// Computes the version number that follows the given directory labels.
///
/// Only labels of the form `v<digits>` count. Gaps are never backfilled: the result is always
/// one more than the highest number present, or [`VersionNumber::FIRST`] if there is none.
pub fn next_version<'a>(labels: impl IntoIterator<Item = &'a str>) -> VersionNumber {
    labels
        .into_iter()
        .filter_map(VersionNumber::parse_label)
        .max()
        .map_or(VersionNumber::FIRST, VersionNumber::next)
}

/// Resolves existing and next versions of a project against a [`VersionStore`].
#[derive(Debug, Clone)]
pub struct LayoutResolver {
    store: Arc<dyn VersionStore>,
}

impl LayoutResolver {
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }

    /// Creates the project directory if needed and lists its `v*` directory labels.
    ///
    /// Labels that do not parse as a version number are included: they still take part in
    /// duplicate detection even though they never influence numbering.
    pub fn existing_versions(&self, project: &ProjectName) -> IngestResult<Vec<String>> {
        self.store.ensure_project(project)?;
        Ok(self.store.list_versions(project)?)
    }

    /// Returns the version the next upload to `project` will be stored under.
    ///
    /// This does not create the version directory.
    pub fn resolve_next_version(&self, project: &ProjectName) -> IngestResult<VersionNumber> {
        let labels = self.existing_versions(project)?;
        Ok(next_version(labels.iter().map(String::as_str)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_files::MemoryStore;

    #[test]
    fn test_next_version_empty_is_first() {
        assert_eq!(next_version(Vec::<&str>::new()), VersionNumber::FIRST);
    }

    #[test]
    fn test_next_version_skips_gaps() {
        assert_eq!(next_version(["v1", "v3"]), VersionNumber::new(4));
        assert_eq!(next_version(["v3", "v1"]), VersionNumber::new(4));
    }

    #[test]
    fn test_next_version_ignores_malformed_labels() {
        assert_eq!(
            next_version(["vdraft", "v2", "v", "v2b", "v10x"]),
            VersionNumber::new(3)
        );
        assert_eq!(next_version(["vold"]), VersionNumber::FIRST);
    }

    #[test]
    fn test_resolver_creates_project_but_not_version() {
        let store = Arc::new(MemoryStore::new());
        let resolver = LayoutResolver::new(store.clone());
        let project = ProjectName::new("birds").unwrap();

        let next = resolver.resolve_next_version(&project).unwrap();

        assert_eq!(next, VersionNumber::FIRST);
        assert!(store.has_dir("birds"));
        assert!(!store.has_dir("birds/v1"));
    }

    #[test]
    fn test_resolver_reads_existing_versions() {
        let store = Arc::new(MemoryStore::new());
        store.insert_dir("birds/v1");
        store.insert_dir("birds/v3");
        store.insert_dir("birds/vbackup");
        let resolver = LayoutResolver::new(store);
        let project = ProjectName::new("birds").unwrap();

        assert_eq!(
            resolver.resolve_next_version(&project).unwrap(),
            VersionNumber::new(4)
        );
        assert_eq!(resolver.existing_versions(&project).unwrap().len(), 3);
    }
}
