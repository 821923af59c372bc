//! Global initializers and their composition into deployment fragments.
//!
//! A global initializer contributes process-wide setup to every deployment
//! that requests it: code at global scope, code run at startup and shutdown,
//! and build-description fragments. Requests are resolved all at once before
//! anything is rendered, so a single unknown name leaves no partial output.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{ComposeError, Result};
use crate::template::{FragmentTemplate, TemplateValues};

/// Parameters every initializer fragment may reference.
pub const INITIALIZER_PARAMETERS: &[&str] = &["project", "deployment"];

// ---------------------------------------------------------------------------
// BuildTarget
// ---------------------------------------------------------------------------

/// Build description an initializer fragment is appended to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTarget {
    /// Link step of the project's task library.
    TaskLibrary,
    /// Link step of the deployment executable.
    Deployment,
    /// Dependency discovery of the task library.
    TaskLibraryDependencies,
}

impl BuildTarget {
    pub const ALL: [BuildTarget; 3] = [
        BuildTarget::TaskLibrary,
        BuildTarget::Deployment,
        BuildTarget::TaskLibraryDependencies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskLibrary => "task_library",
            Self::Deployment => "deployment",
            Self::TaskLibraryDependencies => "task_library_dependencies",
        }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GlobalInitializer
// ---------------------------------------------------------------------------

/// A named bundle of optional deployment fragments.
#[derive(Clone, Debug)]
pub struct GlobalInitializer {
    name: String,
    global_scope: Option<FragmentTemplate>,
    init: Option<FragmentTemplate>,
    exit: Option<FragmentTemplate>,
    build: BTreeMap<BuildTarget, FragmentTemplate>,
}

impl GlobalInitializer {
    /// An initializer with no fragments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            global_scope: None,
            init: None,
            exit: None,
            build: BTreeMap::new(),
        }
    }

    fn template(text: &str) -> Result<FragmentTemplate> {
        FragmentTemplate::new(text, INITIALIZER_PARAMETERS)
    }

    /// Code placed at global scope of the deployment's main file.
    pub fn with_global_scope(mut self, text: &str) -> Result<Self> {
        self.global_scope = Some(Self::template(text)?);
        Ok(self)
    }

    /// Code run before the deployment's components start.
    pub fn with_init(mut self, text: &str) -> Result<Self> {
        self.init = Some(Self::template(text)?);
        Ok(self)
    }

    /// Code run after the deployment's components stop.
    pub fn with_exit(mut self, text: &str) -> Result<Self> {
        self.exit = Some(Self::template(text)?);
        Ok(self)
    }

    /// Fragment appended to the build description of `target`.
    pub fn with_build(mut self, target: BuildTarget, text: &str) -> Result<Self> {
        self.build.insert(target, Self::template(text)?);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build targets this initializer contributes to.
    pub fn build_targets(&self) -> impl Iterator<Item = BuildTarget> + '_ {
        self.build.keys().copied()
    }

    pub fn has_runtime_code(&self) -> bool {
        self.global_scope.is_some() || self.init.is_some() || self.exit.is_some()
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Identifiers of the deployment being generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeploymentContext {
    pub project: String,
    pub deployment: String,
}

impl DeploymentContext {
    pub fn new(project: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            deployment: deployment.into(),
        }
    }

    fn values(&self) -> TemplateValues {
        TemplateValues::new()
            .with("project", self.project.as_str())
            .with("deployment", self.deployment.as_str())
    }
}

/// Rendered output of the initializers selected for one deployment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComposedInitializers {
    /// Selected initializer names, in registration order.
    pub initializers: Vec<String>,
    pub global_scope: String,
    pub init: String,
    /// Shutdown code; initializers appear in reverse registration order.
    pub exit: String,
    pub build: BTreeMap<BuildTarget, String>,
}

impl ComposedInitializers {
    pub fn is_empty(&self) -> bool {
        self.initializers.is_empty()
    }
}

fn append(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Collects initializers before the registry is frozen.
#[derive(Debug, Default)]
pub struct InitializerRegistryBuilder {
    initializers: Vec<GlobalInitializer>,
}

impl InitializerRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an initializer. Names must be unique and non-empty.
    pub fn register(&mut self, initializer: GlobalInitializer) -> Result<&mut Self> {
        if initializer.name.trim().is_empty() {
            return Err(ComposeError::Config(
                "global initializer name must not be empty".into(),
            ));
        }
        if self.initializers.iter().any(|i| i.name == initializer.name) {
            return Err(ComposeError::Config(format!(
                "a global initializer called {} is already registered",
                initializer.name
            )));
        }
        self.initializers.push(initializer);
        Ok(self)
    }

    pub fn build(self) -> InitializerRegistry {
        InitializerRegistry {
            initializers: self.initializers,
        }
    }
}

/// Frozen, ordered set of global initializers.
#[derive(Debug)]
pub struct InitializerRegistry {
    initializers: Vec<GlobalInitializer>,
}

impl InitializerRegistry {
    pub fn builder() -> InitializerRegistryBuilder {
        InitializerRegistryBuilder::new()
    }

    /// Initializer names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.initializers.iter().map(|i| i.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&GlobalInitializer> {
        self.initializers.iter().find(|i| i.name == name)
    }

    pub fn len(&self) -> usize {
        self.initializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initializers.is_empty()
    }

    /// Resolve requested names to initializers in registration order.
    ///
    /// Duplicate requests collapse. Any unknown name fails the whole request.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<&GlobalInitializer>> {
        let mut unknown: Vec<&str> = requested
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| self.get(name).is_none())
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            unknown.dedup();
            return Err(ComposeError::Config(format!(
                "unknown global initializer(s) {}; known initializers: {}",
                unknown.join(", "),
                self.names().join(", ")
            )));
        }

        Ok(self
            .initializers
            .iter()
            .filter(|i| requested.iter().any(|r| r.as_ref() == i.name))
            .collect())
    }

    /// Render the requested initializers for one deployment.
    pub fn compose<S: AsRef<str>>(
        &self,
        requested: &[S],
        context: &DeploymentContext,
    ) -> Result<ComposedInitializers> {
        let selected = self.resolve(requested)?;
        let values = context.values();
        let mut out = ComposedInitializers::default();

        for init in &selected {
            out.initializers.push(init.name.clone());
            if let Some(t) = &init.global_scope {
                append(&mut out.global_scope, &t.render(&values)?);
            }
            if let Some(t) = &init.init {
                append(&mut out.init, &t.render(&values)?);
            }
            for (target, t) in &init.build {
                append(out.build.entry(*target).or_default(), &t.render(&values)?);
            }
        }
        for init in selected.iter().rev() {
            if let Some(t) = &init.exit {
                append(&mut out.exit, &t.render(&values)?);
            }
        }

        debug!(
            project = %context.project,
            deployment = %context.deployment,
            initializers = ?out.initializers,
            "composed global initializers"
        );
        Ok(out)
    }
}
