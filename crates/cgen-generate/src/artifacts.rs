use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use cgen_types::Fingerprint;

use crate::error::{GenerateError, GenerateResult};

/// Name of the manifest written next to the artifacts.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Resolution of one deployment's task models.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentResolution {
    pub project: String,
    /// task model -> task library
    pub task_libraries: BTreeMap<String, String>,
    /// Task models no installed task library defines.
    pub unresolved_models: Vec<String>,
}

/// The complete output of a successful run, held in memory until written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifacts {
    /// Relative path -> content.
    pub files: BTreeMap<PathBuf, String>,
    /// deployment -> model resolution
    pub deployments: BTreeMap<String, DeploymentResolution>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub bytes: usize,
    pub blake3: String,
}

/// Listing of everything a run wrote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub files: Vec<ManifestEntry>,
    pub deployments: BTreeMap<String, DeploymentResolution>,
}

impl GeneratedArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file. A path may only be produced once per run.
    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> GenerateResult<()> {
        let path = path.into();
        if self.files.contains_key(&path) {
            return Err(GenerateError::InvalidRequest(format!(
                "{} would be generated twice",
                path.display()
            )));
        }
        self.files.insert(path, text.into());
        Ok(())
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Task models left unresolved, per deployment. Deployments with none
    /// are omitted.
    pub fn unresolved_models(&self) -> BTreeMap<&str, &[String]> {
        self.deployments
            .iter()
            .filter(|(_, r)| !r.unresolved_models.is_empty())
            .map(|(name, r)| (name.as_str(), r.unresolved_models.as_slice()))
            .collect()
    }

    pub fn manifest(&self) -> Manifest {
        Manifest {
            files: self
                .files
                .iter()
                .map(|(path, text)| ManifestEntry {
                    path: path.clone(),
                    bytes: text.len(),
                    blake3: Fingerprint::from_bytes(text.as_bytes()).to_hex(),
                })
                .collect(),
            deployments: self.deployments.clone(),
        }
    }

    /// Write every artifact under `dir`, then the manifest.
    ///
    /// Each file is written to a temporary file in its target directory and
    /// persisted into place, so a file is either absent or complete.
    pub fn write_to(&self, dir: &Path) -> GenerateResult<Manifest> {
        for (relative, text) in &self.files {
            write_atomic(&dir.join(relative), text.as_bytes())?;
            debug!(path = %relative.display(), bytes = text.len(), "wrote artifact");
        }

        let manifest = self.manifest();
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| GenerateError::Serialization(e.to_string()))?;
        write_atomic(&dir.join(MANIFEST_FILE), json.as_bytes())?;

        info!(
            dir = %dir.display(),
            files = self.files.len(),
            "generation output written"
        );
        Ok(manifest)
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> GenerateResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| GenerateError::InvalidRequest(format!("{} has no parent", path.display())))?;
    fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| GenerateError::io(parent, e))?;
    tmp.write_all(data).map_err(|e| GenerateError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| GenerateError::io(path, e.error))?;
    Ok(())
}
