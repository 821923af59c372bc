use crate::capability::GenerationCapabilities;
use crate::error::Result;
use crate::initializer::InitializerRegistry;
use crate::plugin::PluginRegistry;
use crate::{initializers, plugins};

/// The frozen extension registries of a process.
///
/// Built once at startup and passed by reference to every generation run.
/// There is no way to remove or replace an extension afterwards.
#[derive(Debug)]
pub struct Extensions {
    pub plugins: PluginRegistry,
    pub initializers: InitializerRegistry,
    pub capabilities: GenerationCapabilities,
}

impl Extensions {
    pub fn new(
        plugins: PluginRegistry,
        initializers: InitializerRegistry,
        capabilities: GenerationCapabilities,
    ) -> Self {
        Self {
            plugins,
            initializers,
            capabilities,
        }
    }

    /// The built-in plugins and initializers, with RTT task-context generators.
    pub fn builtin() -> Result<Self> {
        let mut plugin_builder = PluginRegistry::builder();
        for plugin in plugins::builtin() {
            plugin_builder.register(plugin)?;
        }

        let mut initializer_builder = InitializerRegistry::builder();
        for initializer in initializers::builtin()? {
            initializer_builder.register(initializer)?;
        }

        Ok(Self::new(
            plugin_builder.build(),
            initializer_builder.build(),
            GenerationCapabilities::rtt()?,
        ))
    }
}
