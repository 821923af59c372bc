use serde::{Deserialize, Serialize};

use cgen_compose::TaskContextSpec;

/// One deployment to generate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentRequest {
    /// Installed deployment name.
    pub name: String,
    /// Global initializers to compose into the deployment.
    pub initializers: Vec<String>,
    /// Task models the deployment instantiates; resolved to task libraries.
    pub task_models: Vec<String>,
}

impl DeploymentRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_initializer(mut self, name: impl Into<String>) -> Self {
        self.initializers.push(name.into());
        self
    }

    pub fn with_task_model(mut self, model: impl Into<String>) -> Self {
        self.task_models.push(model.into());
        self
    }
}

/// Everything a generation run should produce.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    /// Installed typekits to run the marshaller plugins on.
    pub typekits: Vec<String>,
    pub deployments: Vec<DeploymentRequest>,
    /// Task contexts to generate member code for.
    pub task_contexts: Vec<TaskContextSpec>,
}

impl GenerationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_typekit(mut self, name: impl Into<String>) -> Self {
        self.typekits.push(name.into());
        self
    }

    pub fn with_deployment(mut self, deployment: DeploymentRequest) -> Self {
        self.deployments.push(deployment);
        self
    }

    pub fn with_task_context(mut self, task: TaskContextSpec) -> Self {
        self.task_contexts.push(task);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.typekits.is_empty() && self.deployments.is_empty() && self.task_contexts.is_empty()
    }
}
