use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use serde::Serialize;
use tracing::{info, warn};

use cgen_store::DescriptorStore;
use cgen_types::{typelist_path_for, Fingerprint, RecordClass, RecordNaming, TypeList};

use crate::config::RegistryConfig;
use crate::diagnostic::Diagnostic;
use crate::error::{RegistryError, Result};
use crate::rebuild;
use crate::snapshot::Snapshot;

/// Outcome of a successful rebuild.
#[derive(Clone, Debug, Serialize)]
pub struct RebuildReport {
    pub projects: usize,
    pub task_libraries: usize,
    pub deployments: usize,
    pub typekits: usize,
    pub types: usize,
    pub fingerprint: Fingerprint,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RebuildReport {
    fn new(snapshot: &Snapshot, diagnostics: Vec<Diagnostic>, elapsed: Duration) -> Self {
        Self {
            projects: snapshot.projects().len(),
            task_libraries: snapshot.task_libraries().len(),
            deployments: snapshot.deployments().len(),
            typekits: snapshot.typekits().len(),
            types: snapshot.types().len(),
            fingerprint: snapshot.fingerprint(),
            diagnostics,
            elapsed,
        }
    }
}

/// The cross-referenced model of every component installed in a descriptor
/// store.
///
/// A registry starts stale. [`MetadataRegistry::rebuild`] scans the store and
/// publishes a new [`Snapshot`] in a single atomic swap; queries always run
/// against one complete snapshot. Queries on a stale registry behave as if
/// nothing were installed.
pub struct MetadataRegistry {
    config: RegistryConfig,
    naming: RecordNaming,
    store: Arc<dyn DescriptorStore>,
    current: ArcSwapOption<Snapshot>,
}

impl MetadataRegistry {
    /// Create a stale registry over `store`.
    pub fn new(config: RegistryConfig, store: Arc<dyn DescriptorStore>) -> Result<Self> {
        let naming = config.naming()?;
        Ok(Self {
            config,
            naming,
            store,
            current: ArcSwapOption::empty(),
        })
    }

    /// Create a registry and run the first rebuild.
    pub fn open(config: RegistryConfig, store: Arc<dyn DescriptorStore>) -> Result<Self> {
        let registry = Self::new(config, store)?;
        registry.rebuild()?;
        Ok(registry)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Target platform this registry resolves descriptors for.
    pub fn target(&self) -> &str {
        &self.config.target
    }

    pub fn store(&self) -> &Arc<dyn DescriptorStore> {
        &self.store
    }

    /// Rescan the store and publish a fresh snapshot.
    ///
    /// Record-level problems are reported in the returned report. A store
    /// failure aborts the rebuild and leaves the previous snapshot (if any)
    /// published.
    pub fn rebuild(&self) -> Result<RebuildReport> {
        let started = Instant::now();
        let (snapshot, diagnostics) = match rebuild::scan(self.store.as_ref(), &self.naming) {
            Ok(built) => built,
            Err(err) => {
                warn!(platform = %self.config.target, error = %err, "rebuild failed; keeping previous snapshot");
                return Err(err.into());
            }
        };

        let report = RebuildReport::new(&snapshot, diagnostics, started.elapsed());
        self.current.store(Some(Arc::new(snapshot)));

        info!(
            platform = %self.config.target,
            projects = report.projects,
            task_libraries = report.task_libraries,
            deployments = report.deployments,
            typekits = report.typekits,
            types = report.types,
            diagnostics = report.diagnostics.len(),
            fingerprint = %report.fingerprint.short_hex(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "registry rebuilt"
        );
        Ok(report)
    }

    /// The currently published snapshot, or `None` while stale.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    pub fn is_built(&self) -> bool {
        self.current.load().is_some()
    }

    /// The published snapshot, or an empty one while stale.
    fn view(&self) -> Arc<Snapshot> {
        self.snapshot().unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn has_typekit(&self, name: &str) -> bool {
        self.view().typekit(name).is_some()
    }

    /// Specification text of a project and the path it was read from.
    pub fn project_model_text(&self, name: &str) -> Result<(String, PathBuf)> {
        let snapshot = self.view();
        let project = snapshot
            .project(name)
            .ok_or_else(|| RegistryError::not_found(RecordClass::Project, name))?;
        let path = project.spec_path.clone().ok_or_else(|| {
            RegistryError::Config(format!(
                "project {name} (record {}) has no specification file",
                project.record
            ))
        })?;
        let text = self.store.read_text(&path)?;
        Ok((text, path))
    }

    /// Type registry text and type list text of a typekit.
    pub fn typekit_model_text(&self, name: &str) -> Result<(String, String)> {
        let snapshot = self.view();
        let typekit = snapshot
            .typekit(name)
            .ok_or_else(|| RegistryError::not_found(RecordClass::Typekit, name))?;
        let registry = self.store.read_text(&typekit.type_registry)?;
        let typelist = self
            .store
            .read_text(&typelist_path_for(&typekit.type_registry))?;
        Ok((registry, typelist))
    }

    /// Parsed type list of a typekit.
    pub fn typekit_type_list(&self, name: &str) -> Result<TypeList> {
        let (_, typelist) = self.typekit_model_text(name)?;
        Ok(TypeList::parse(&typelist))
    }

    /// Task library defining a task model.
    pub fn task_library_owning(&self, model: &str) -> Option<String> {
        self.view().task_models().get(model).cloned()
    }

    /// Project defining a deployment.
    pub fn project_owning(&self, deployment: &str) -> Option<String> {
        self.view()
            .deployment(deployment)
            .map(|d| d.project.clone())
    }

    /// Deployments instantiating a task.
    pub fn deployments_containing(&self, task: &str) -> BTreeSet<String> {
        self.view()
            .deployed_tasks()
            .get(task)
            .cloned()
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataRegistry")
            .field("config", &self.config)
            .field("built", &self.is_built())
            .finish()
    }
}
