//! Error types for registry operations.

use cgen_store::StoreError;
use cgen_types::{RecordClass, TypeError};
use thiserror::Error;

/// Errors that can occur during registry operations.
///
/// Record-level problems found during a rebuild are not errors; they are
/// reported as [`crate::Diagnostic`]s.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A query named an entity absent from the current snapshot.
    #[error("cannot find an installed {class} called {name}")]
    NotFound { class: RecordClass, name: String },

    /// Invalid configuration, or an entity lacks data a query needs.
    #[error("configuration error: {0}")]
    Config(String),

    /// The backing store failed to read a record or artifact.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    pub fn not_found(class: RecordClass, name: impl Into<String>) -> Self {
        Self::NotFound {
            class,
            name: name.into(),
        }
    }
}

impl From<TypeError> for RegistryError {
    fn from(err: TypeError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenience type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
