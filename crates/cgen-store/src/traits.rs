use std::path::Path;

use regex::Regex;

use crate::error::StoreResult;
use crate::record::RawRecord;

/// Read access to installed descriptors and the artifacts they reference.
///
/// All implementations must satisfy these invariants:
/// - `record_names` is sorted and free of duplicates, so every selection made
///   through it is deterministic.
/// - Loading a listed record either succeeds or reports an I/O-level error;
///   a missing or malformed field is not an error at this level.
/// - All I/O errors are propagated, never silently ignored.
pub trait DescriptorStore: Send + Sync {
    /// Names of all records in the store, sorted.
    fn record_names(&self) -> StoreResult<Vec<String>>;

    /// Load one record by name.
    fn load(&self, name: &str) -> StoreResult<RawRecord>;

    /// Read a text artifact (specification file, type registry, type list).
    fn read_text(&self, path: &Path) -> StoreResult<String>;

    /// Load every record whose name matches `pattern`, in name order.
    ///
    /// Default implementation filters [`Self::record_names`] and calls
    /// [`Self::load`] for each match.
    fn records_matching(&self, pattern: &Regex) -> StoreResult<Vec<RawRecord>> {
        self.record_names()?
            .iter()
            .filter(|name| pattern.is_match(name))
            .map(|name| self.load(name))
            .collect()
    }
}
