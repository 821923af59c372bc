use serde::{Deserialize, Serialize};

use cgen_types::{RecordNaming, TypeError, DEFAULT_NAMESPACE};

/// Target platform used when none is configured.
pub const DEFAULT_TARGET: &str = "gnulinux";

/// Configuration of a metadata registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Target platform identifier; selects the platform-specific typekit and
    /// task-library descriptors.
    pub target: String,
    /// Namespace prefix of project and deployment descriptors.
    pub namespace: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Default configuration for another target.
    pub fn for_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    /// Compile the descriptor naming patterns for this configuration.
    pub fn naming(&self) -> Result<RecordNaming, TypeError> {
        RecordNaming::new(&self.namespace, &self.target)
    }
}
