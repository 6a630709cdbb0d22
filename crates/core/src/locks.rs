//! Per-project mutual exclusion for ingestion.
//!
//! Resolving the next version and creating its directory are separate storage calls. Without
//! a lock, two uploads to the same project can both observe the same highest version and
//! then write into the same new version directory.
//!
//! Entries are never removed: the map holds one mutex for every project name ingested since
//! startup, so its size is bounded by the number of distinct projects, not by upload count.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use vault_types::ProjectName;

#[derive(Debug, Default)]
pub struct ProjectLocks {
    locks: Mutex<HashMap<ProjectName, Arc<Mutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock guarding `project`, creating it on first use.
    pub fn for_project(&self, project: &ProjectName) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(project.clone()).or_default().clone()
    }
}
