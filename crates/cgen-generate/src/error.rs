use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("registry error: {0}")]
    Registry(#[from] cgen_registry::RegistryError),

    #[error("store error: {0}")]
    Store(#[from] cgen_store::StoreError),

    #[error("composition error: {0}")]
    Compose(#[from] cgen_compose::ComposeError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl GenerateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the run was rejected for a configuration problem
    /// (such as an unknown initializer) before any work was done.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Compose(cgen_compose::ComposeError::Config(_))
                | Self::Registry(cgen_registry::RegistryError::Config(_))
                | Self::InvalidRequest(_)
        )
    }
}

pub type GenerateResult<T> = Result<T, GenerateError>;
