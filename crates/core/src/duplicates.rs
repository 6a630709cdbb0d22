//! Duplicate detection across a project's version history.

use crate::error::IngestResult;
use std::cmp::Ordering;
use std::sync::Arc;
use vault_files::VersionStore;
use vault_types::{ArtifactName, ProjectName, VersionNumber};

/// Orders labels numerically where possible; unnumbered labels sort last, by name.
fn label_order(a: &str, b: &str) -> Ordering {
    match (VersionNumber::parse_label(a), VersionNumber::parse_label(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Reports whether an artifact filename already exists in any version of a project.
#[derive(Debug, Clone)]
pub struct DuplicateGuard {
    store: Arc<dyn VersionStore>,
}

impl DuplicateGuard {
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }

    /// Returns the label of the earliest version that already holds `artifact`.
    ///
    /// Every label is checked before deciding, so the answer does not depend on the order the
    /// store enumerates directories in. Matching is exact and case-sensitive, and only the
    /// artifact itself counts: sidecars and expanded archive contents are never consulted.
    pub fn find_duplicate(
        &self,
        project: &ProjectName,
        labels: &[String],
        artifact: &ArtifactName,
    ) -> IngestResult<Option<String>> {
        let mut matches = Vec::new();
        for label in labels {
            if self.store.contains_artifact(project, label, artifact)? {
                matches.push(label.as_str());
            }
        }

        matches.sort_by(|a, b| label_order(a, b));
        Ok(matches.first().map(|label| (*label).to_owned()))
    }
}
