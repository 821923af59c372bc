use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid target identifier {0:?}: must be non-empty and contain no whitespace")]
    InvalidTarget(String),

    #[error("invalid namespace {0:?}: must be a non-empty identifier")]
    InvalidNamespace(String),

    #[error("invalid record pattern: {0}")]
    Pattern(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
