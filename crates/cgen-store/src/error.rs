use std::path::PathBuf;

/// Errors from descriptor store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this name exists in the store.
    #[error("descriptor not found: {0}")]
    NotFound(String),

    /// A text artifact referenced by a record does not exist.
    #[error("artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// I/O error from the underlying storage backend.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A descriptor file could not be parsed.
    #[error("malformed descriptor {}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
