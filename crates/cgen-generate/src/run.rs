use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use cgen_compose::{DeploymentContext, Extensions, TaskContextSpec, TypekitInput};
use cgen_registry::{MetadataRegistry, RegistryError};
use cgen_types::{RecordClass, TypeList};

use crate::artifacts::{DeploymentResolution, GeneratedArtifacts};
use crate::error::{GenerateError, GenerateResult};
use crate::request::{DeploymentRequest, GenerationRequest};

/// One generation run over a registry and the process's extensions.
///
/// Validation happens up front: an unknown deployment or initializer fails
/// the run before any plugin or template runs. Nothing touches the disk until
/// [`GeneratedArtifacts::write_to`] is called on the result.
pub struct GenerationRun<'a> {
    registry: &'a MetadataRegistry,
    extensions: &'a Extensions,
}

impl<'a> GenerationRun<'a> {
    pub fn new(registry: &'a MetadataRegistry, extensions: &'a Extensions) -> Self {
        Self {
            registry,
            extensions,
        }
    }

    pub fn execute(&self, request: &GenerationRequest) -> GenerateResult<GeneratedArtifacts> {
        let started = Instant::now();
        if !self.registry.is_built() {
            self.registry.rebuild()?;
        }

        let projects = self.validate(request)?;
        let mut artifacts = GeneratedArtifacts::new();

        let typekits: BTreeSet<&str> = request.typekits.iter().map(String::as_str).collect();
        for name in typekits {
            self.generate_typekit(name, &mut artifacts)?;
        }
        for task in &request.task_contexts {
            self.generate_task_context(task, &mut artifacts)?;
        }
        for deployment in &request.deployments {
            let project = projects
                .get(deployment.name.as_str())
                .cloned()
                .unwrap_or_default();
            self.generate_deployment(deployment, project, &mut artifacts)?;
        }

        info!(
            typekits = request.typekits.len(),
            deployments = request.deployments.len(),
            task_contexts = request.task_contexts.len(),
            files = artifacts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generation run complete"
        );
        Ok(artifacts)
    }

    /// Check every name in the request. Returns deployment -> project.
    fn validate(&self, request: &GenerationRequest) -> GenerateResult<BTreeMap<String, String>> {
        let mut projects = BTreeMap::new();
        for deployment in &request.deployments {
            if projects.contains_key(&deployment.name) {
                return Err(GenerateError::InvalidRequest(format!(
                    "deployment {} is requested twice",
                    deployment.name
                )));
            }
            self.extensions
                .initializers
                .resolve(&deployment.initializers)?;
            let project = self
                .registry
                .project_owning(&deployment.name)
                .ok_or_else(|| RegistryError::not_found(RecordClass::Deployment, &deployment.name))?;
            projects.insert(deployment.name.clone(), project);
        }
        for typekit in &request.typekits {
            if !self.registry.has_typekit(typekit) {
                return Err(RegistryError::not_found(RecordClass::Typekit, typekit).into());
            }
        }
        let mut tasks = BTreeSet::new();
        for task in &request.task_contexts {
            if !tasks.insert(task.name.as_str()) {
                return Err(GenerateError::InvalidRequest(format!(
                    "task context {} is requested twice",
                    task.name
                )));
            }
        }
        Ok(projects)
    }

    fn generate_typekit(&self, name: &str, artifacts: &mut GeneratedArtifacts) -> GenerateResult<()> {
        let project = self
            .registry
            .snapshot()
            .and_then(|s| s.typekit(name).map(|t| t.project.clone()))
            .ok_or_else(|| RegistryError::not_found(RecordClass::Typekit, name))?;
        let (_, typelist) = self.registry.typekit_model_text(name)?;
        let input = TypekitInput::from_type_list(name, project, &TypeList::parse(&typelist));

        let contributions = self.extensions.plugins.contributions_for(&input)?;
        let root = PathBuf::from("typekits").join(name);
        for c in contributions.sources() {
            artifacts.insert(root.join(&c.path), c.text.clone())?;
        }
        artifacts.insert(root.join("build.fragment"), contributions.build_fragment())?;
        debug!(typekit = name, types = input.types.len(), "typekit generated");
        Ok(())
    }

    fn generate_task_context(
        &self,
        task: &TaskContextSpec,
        artifacts: &mut GeneratedArtifacts,
    ) -> GenerateResult<()> {
        let code = self.extensions.capabilities.generate_task_context(task)?;
        let root = PathBuf::from("tasks").join(&task.name);
        artifacts.insert(root.join("declarations.fragment"), code.declarations)?;
        artifacts.insert(root.join("initializers.fragment"), code.initializers)?;
        artifacts.insert(root.join("registrations.fragment"), code.registrations)?;
        debug!(task = %task.name, elements = task.elements.len(), "task context generated");
        Ok(())
    }

    fn generate_deployment(
        &self,
        request: &DeploymentRequest,
        project: String,
        artifacts: &mut GeneratedArtifacts,
    ) -> GenerateResult<()> {
        let context = DeploymentContext::new(project.clone(), request.name.clone());
        let composed = self
            .extensions
            .initializers
            .compose(&request.initializers, &context)?;

        let root = PathBuf::from("deployments").join(&request.name);
        artifacts.insert(root.join("global_scope.fragment"), composed.global_scope)?;
        artifacts.insert(root.join("init.fragment"), composed.init)?;
        artifacts.insert(root.join("exit.fragment"), composed.exit)?;
        for (target, text) in composed.build {
            artifacts.insert(root.join("build").join(format!("{target}.fragment")), text)?;
        }

        let mut resolution = DeploymentResolution {
            project,
            ..Default::default()
        };
        for model in &request.task_models {
            match self.registry.task_library_owning(model) {
                Some(library) => {
                    resolution.task_libraries.insert(model.clone(), library);
                }
                None => {
                    warn!(deployment = %request.name, model = %model, "task model not provided by any installed task library");
                    resolution.unresolved_models.push(model.clone());
                }
            }
        }
        artifacts
            .deployments
            .insert(request.name.clone(), resolution);
        Ok(())
    }
}
