use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::record::RawRecord;
use crate::traits::DescriptorStore;

/// In-memory, map-based descriptor store.
///
/// Intended for tests and embedding. Records and artifacts are held behind
/// `RwLock`s so a test can change the store between two registry rebuilds.
pub struct InMemoryDescriptorStore {
    records: RwLock<BTreeMap<String, RawRecord>>,
    artifacts: RwLock<BTreeMap<PathBuf, String>>,
}

impl InMemoryDescriptorStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            artifacts: RwLock::new(BTreeMap::new()),
        }
    }

    /// Add or replace a record.
    pub fn insert_record(&self, record: RawRecord) {
        self.records
            .write()
            .expect("lock poisoned")
            .insert(record.name.clone(), record);
    }

    /// Remove a record. Returns `true` if it existed.
    pub fn remove_record(&self, name: &str) -> bool {
        self.records
            .write()
            .expect("lock poisoned")
            .remove(name)
            .is_some()
    }

    /// Add or replace a text artifact.
    pub fn insert_artifact(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.artifacts
            .write()
            .expect("lock poisoned")
            .insert(path.into(), text.into());
    }

    /// Remove a text artifact. Returns `true` if it existed.
    pub fn remove_artifact(&self, path: &Path) -> bool {
        self.artifacts
            .write()
            .expect("lock poisoned")
            .remove(path)
            .is_some()
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryDescriptorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorStore for InMemoryDescriptorStore {
    fn record_names(&self) -> StoreResult<Vec<String>> {
        let records = self.records.read().expect("lock poisoned");
        Ok(records.keys().cloned().collect())
    }

    fn load(&self, name: &str) -> StoreResult<RawRecord> {
        let records = self.records.read().expect("lock poisoned");
        records
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn read_text(&self, path: &Path) -> StoreResult<String> {
        let artifacts = self.artifacts.read().expect("lock poisoned");
        artifacts
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::ArtifactNotFound(path.to_path_buf()))
    }
}

impl std::fmt::Debug for InMemoryDescriptorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let artifacts = self.artifacts.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryDescriptorStore")
            .field("record_count", &self.len())
            .field("artifact_count", &artifacts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn record(name: &str) -> RawRecord {
        RawRecord::new(name, format!("/mem/{name}.pc")).with_field("project_name", "base")
    }

    #[test]
    fn insert_and_load() {
        let store = InMemoryDescriptorStore::new();
        store.insert_record(record("orogen-project-base"));

        let loaded = store.load("orogen-project-base").unwrap();
        assert_eq!(loaded.field("project_name"), Some("base"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn load_missing_record() {
        let store = InMemoryDescriptorStore::new();
        assert!(matches!(store.load("nope"), Err(StoreError::NotFound(n)) if n == "nope"));
    }

    #[test]
    fn names_are_sorted() {
        let store = InMemoryDescriptorStore::new();
        store.insert_record(record("zeta"));
        store.insert_record(record("alpha"));
        store.insert_record(record("mid"));
        assert_eq!(store.record_names().unwrap(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn records_matching_filters_by_pattern() {
        let store = InMemoryDescriptorStore::new();
        store.insert_record(record("camera-tasks-gnulinux"));
        store.insert_record(record("camera-tasks-xenomai"));
        store.insert_record(record("base-tasks-gnulinux"));

        let pattern = Regex::new("-tasks-gnulinux$").unwrap();
        let names: Vec<String> = store
            .records_matching(&pattern)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["base-tasks-gnulinux", "camera-tasks-gnulinux"]);
    }

    #[test]
    fn artifacts_round_trip_and_removal() {
        let store = InMemoryDescriptorStore::new();
        let path = PathBuf::from("/mem/base.tlb");
        store.insert_artifact(&path, "<typelib/>");
        assert_eq!(store.read_text(&path).unwrap(), "<typelib/>");

        assert!(store.remove_artifact(&path));
        assert!(matches!(
            store.read_text(&path),
            Err(StoreError::ArtifactNotFound(p)) if p == path
        ));
    }
}
