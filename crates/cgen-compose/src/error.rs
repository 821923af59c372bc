use std::fmt;

/// Errors raised while registering or composing extensions.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// An extension was registered or requested inconsistently: unknown or
    /// duplicate name, invalid template, missing template value.
    #[error("configuration error: {0}")]
    Config(String),

    /// A marshaller plugin failed to produce its contributions.
    #[error("plugin error in '{plugin}': {message}")]
    Plugin { plugin: String, message: String },
}

impl ComposeError {
    /// Create a plugin error with a name and message.
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for configuration errors.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl PartialEq for ComposeError {
    fn eq(&self, other: &Self) -> bool {
        fmt::format(format_args!("{self}")) == fmt::format(format_args!("{other}"))
    }
}

impl Eq for ComposeError {}

/// Convenience type alias for composition operations.
pub type Result<T> = std::result::Result<T, ComposeError>;
