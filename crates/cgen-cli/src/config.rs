use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use cgen_registry::RegistryConfig;
use cgen_store::FsDescriptorStore;

/// Configuration file of the `cgen` binary.
///
/// ```toml
/// search_paths = ["/opt/rock/lib/pkgconfig"]
///
/// [registry]
/// target = "gnulinux"
/// namespace = "orogen"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub registry: RegistryConfig,
    /// Descriptor directories in search order. When empty, the directories
    /// of `PKG_CONFIG_PATH` are used.
    pub search_paths: Vec<PathBuf>,
}

impl CliConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load `path` if given, then apply command-line overrides.
    pub fn resolve(
        path: Option<&Path>,
        target: Option<&str>,
        search_paths: &[PathBuf],
    ) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(target) = target {
            config.registry.target = target.to_string();
        }
        if !search_paths.is_empty() {
            config.search_paths = search_paths.to_vec();
        }
        Ok(config)
    }

    pub fn store(&self) -> FsDescriptorStore {
        if self.search_paths.is_empty() {
            FsDescriptorStore::from_env()
        } else {
            FsDescriptorStore::new(self.search_paths.iter().cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let c = CliConfig::from_toml("").unwrap();
        assert_eq!(c, CliConfig::default());
        assert_eq!(c.registry.target, "gnulinux");
    }

    #[test]
    fn full_file() {
        let c = CliConfig::from_toml(
            "search_paths = [\"/opt/a\", \"/opt/b\"]\n[registry]\ntarget = \"xenomai\"\n",
        )
        .unwrap();
        assert_eq!(c.registry.target, "xenomai");
        assert_eq!(c.registry.namespace, "orogen");
        assert_eq!(c.search_paths.len(), 2);
    }

    #[test]
    fn command_line_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cgen.toml");
        std::fs::write(&path, "search_paths = [\"/opt/a\"]\n[registry]\ntarget = \"xenomai\"\n").unwrap();

        let c = CliConfig::resolve(Some(&path), Some("gnulinux"), &[PathBuf::from("/opt/b")]).unwrap();
        assert_eq!(c.registry.target, "gnulinux");
        assert_eq!(c.search_paths, vec![PathBuf::from("/opt/b")]);
        assert_eq!(c.store().search_paths(), &[PathBuf::from("/opt/b")]);

        let kept = CliConfig::resolve(Some(&path), None, &[]).unwrap();
        assert_eq!(kept.registry.target, "xenomai");
    }

    #[test]
    fn unknown_file_is_an_error() {
        assert!(CliConfig::load(Path::new("/nonexistent/cgen.toml")).is_err());
    }
}
