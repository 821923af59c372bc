use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::record::{parse_descriptor, RawRecord};
use crate::traits::DescriptorStore;

/// Extension of descriptor files.
const DESCRIPTOR_EXTENSION: &str = "pc";

/// Descriptor store over `.pc` files found in an ordered list of directories.
///
/// Each directory is scanned non-recursively and symbolic links are followed,
/// so linked `.pc` files count as records. When the same record name
/// exists in several directories, the one from the earliest directory wins,
/// as with `PKG_CONFIG_PATH`. Directories that do not exist are skipped.
///
/// Every call to [`DescriptorStore::record_names`] rescans the directories;
/// [`DescriptorStore::load`] reuses the last scan and rescans only when the
/// name is unknown to it.
pub struct FsDescriptorStore {
    search_paths: Vec<PathBuf>,
    index: RwLock<BTreeMap<String, PathBuf>>,
}

impl FsDescriptorStore {
    pub fn new(search_paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
            index: RwLock::new(BTreeMap::new()),
        }
    }

    /// A store over the directories listed in `PKG_CONFIG_PATH`.
    pub fn from_env() -> Self {
        let paths = std::env::var_os("PKG_CONFIG_PATH")
            .map(|value| std::env::split_paths(&value).collect::<Vec<_>>())
            .unwrap_or_default();
        Self::new(paths)
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Scan all search directories and return record name -> file path.
    fn scan(&self) -> StoreResult<BTreeMap<String, PathBuf>> {
        let mut found = BTreeMap::new();
        for dir in &self.search_paths {
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "skipping missing descriptor directory");
                continue;
            }

            let mut in_dir = Vec::new();
            for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) if e.io_error().map(|io| io.kind()) == Some(std::io::ErrorKind::NotFound) => {
                        debug!(path = ?e.path(), "skipping dangling descriptor link");
                        continue;
                    }
                    Err(e) => {
                        let path = e.path().unwrap_or(dir).to_path_buf();
                        return Err(StoreError::io(path, e.into()));
                    }
                };
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().map(|e| e != DESCRIPTOR_EXTENSION).unwrap_or(true)
                {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    in_dir.push((stem.to_string(), path.to_path_buf()));
                }
            }

            for (name, path) in in_dir {
                found.entry(name).or_insert(path);
            }
        }
        debug!(records = found.len(), "descriptor scan complete");
        Ok(found)
    }

    fn rescan(&self) -> StoreResult<BTreeMap<String, PathBuf>> {
        let found = self.scan()?;
        *self.index.write().expect("lock poisoned") = found.clone();
        Ok(found)
    }

    fn path_of(&self, name: &str) -> StoreResult<PathBuf> {
        if let Some(path) = self.index.read().expect("lock poisoned").get(name) {
            return Ok(path.clone());
        }
        self.rescan()?
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

impl DescriptorStore for FsDescriptorStore {
    fn record_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.rescan()?.into_keys().collect())
    }

    fn load(&self, name: &str) -> StoreResult<RawRecord> {
        let path = self.path_of(name)?;
        let bytes = std::fs::read(&path).map_err(|e| StoreError::io(&path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            StoreError::Parse {
                path: path.clone(),
                line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
                reason: "not valid UTF-8".to_string(),
            }
        })?;
        parse_descriptor(name, &path, &text)
    }

    fn read_text(&self, path: &Path) -> StoreResult<String> {
        std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::ArtifactNotFound(path.to_path_buf())
            } else {
                StoreError::io(path, e)
            }
        })
    }
}

impl std::fmt::Debug for FsDescriptorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsDescriptorStore")
            .field("search_paths", &self.search_paths)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, file: &str, content: &str) -> PathBuf {
        let path = dir.join(file);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn lists_only_descriptor_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "orogen-project-base.pc", "project_name=base\n");
        write(dir.path(), "README", "not a descriptor\n");
        write(dir.path(), "base.tlb", "<typelib/>\n");

        let store = FsDescriptorStore::new([dir.path()]);
        assert_eq!(store.record_names().unwrap(), vec!["orogen-project-base"]);
    }

    #[test]
    fn first_search_path_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write(first.path(), "orogen-project-base.pc", "project_name=base\nVersion: 2\n");
        write(second.path(), "orogen-project-base.pc", "project_name=base\nVersion: 1\n");
        write(second.path(), "orogen-project-extra.pc", "project_name=extra\n");

        let store = FsDescriptorStore::new([first.path(), second.path()]);
        assert_eq!(
            store.record_names().unwrap(),
            vec!["orogen-project-base", "orogen-project-extra"]
        );
        let base = store.load("orogen-project-base").unwrap();
        assert_eq!(base.field("Version"), Some("2"));
        assert_eq!(base.path, first.path().join("orogen-project-base.pc"));
    }

    #[test]
    fn missing_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "orogen-project-base.pc", "project_name=base\n");
        let store = FsDescriptorStore::new([dir.path().join("absent"), dir.path().to_path_buf()]);
        assert_eq!(store.record_names().unwrap().len(), 1);
    }

    #[test]
    fn load_picks_up_records_added_after_scan() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDescriptorStore::new([dir.path()]);
        assert!(store.record_names().unwrap().is_empty());

        write(dir.path(), "camera-tasks-gnulinux.pc", "project_name=camera\n");
        let record = store.load("camera-tasks-gnulinux").unwrap();
        assert_eq!(record.field("project_name"), Some("camera"));
    }

    #[test]
    fn load_unknown_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDescriptorStore::new([dir.path()]);
        assert!(matches!(store.load("absent"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn malformed_descriptor_surfaces_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.pc", "deffile=${prefix}/x\n");
        let store = FsDescriptorStore::new([dir.path()]);
        assert!(matches!(store.load("broken"), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("bad-tasks-gnulinux.pc"),
            b"project_name=base\ntask_models=caf\xe9\n",
        )
        .unwrap();
        let store = FsDescriptorStore::new([dir.path()]);
        match store.load("bad-tasks-gnulinux") {
            Err(StoreError::Parse { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(reason, "not valid UTF-8");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_descriptors_are_listed() {
        let real = tempfile::tempdir().unwrap();
        let linked = tempfile::tempdir().unwrap();
        let target = write(real.path(), "orogen-project-base.pc", "project_name=base\n");
        std::os::unix::fs::symlink(&target, linked.path().join("orogen-project-base.pc"))
            .unwrap();
        std::os::unix::fs::symlink(
            real.path().join("absent.pc"),
            linked.path().join("dangling-tasks-gnulinux.pc"),
        )
        .unwrap();

        let store = FsDescriptorStore::new([linked.path()]);
        assert_eq!(store.record_names().unwrap(), vec!["orogen-project-base"]);
        let record = store.load("orogen-project-base").unwrap();
        assert_eq!(record.field("project_name"), Some("base"));
    }

    #[test]
    fn read_text_reports_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let present = write(dir.path(), "base.typelist", "/base/Time 1\n");
        let store = FsDescriptorStore::new([dir.path()]);

        assert_eq!(store.read_text(&present).unwrap(), "/base/Time 1\n");
        assert!(matches!(
            store.read_text(&dir.path().join("absent.typelist")),
            Err(StoreError::ArtifactNotFound(_))
        ));
    }
}
