use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A named unit of ownership.
///
/// Every typekit, task library and deployment belongs to exactly one project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project name, as declared by the descriptor's `project_name` field.
    pub name: String,
    /// Name of the raw descriptor this project was registered from.
    pub record: String,
    /// Path to the project's specification file, when the descriptor has one.
    pub spec_path: Option<PathBuf>,
    /// Type-registry path declared on the project descriptor. Present only
    /// when the project exports a typekit.
    pub typekit_registry: Option<PathBuf>,
}

impl Project {
    /// Returns `true` if the project declares a typekit.
    pub fn has_typekit(&self) -> bool {
        self.typekit_registry.is_some()
    }
}

/// The set of data types a project exports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typekit {
    pub name: String,
    pub project: String,
    pub record: String,
    /// Serialized type registry. The type list lives next to it, see
    /// [`crate::typelist_path_for`].
    pub type_registry: PathBuf,
}

/// A compiled artifact hosting task-model implementations for one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLibrary {
    pub name: String,
    pub project: String,
    pub record: String,
    /// Task models in descriptor order.
    pub task_models: Vec<String>,
}

/// A runnable configuration that instantiates task models under fixed names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub name: String,
    pub project: String,
    pub record: String,
    /// Deployed task names in descriptor order.
    pub deployed_tasks: Vec<String>,
}

/// Ownership record of one type name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    /// Typekit that registered the name first.
    pub owner: String,
    /// Whether any registration marked the type as part of a public interface.
    pub exported: bool,
}

impl TypeEntry {
    pub fn new(owner: impl Into<String>, exported: bool) -> Self {
        Self {
            owner: owner.into(),
            exported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_typekit_flag_follows_registry_path() {
        let mut project = Project {
            name: "base".into(),
            record: "orogen-project-base".into(),
            spec_path: Some(PathBuf::from("/opt/base/base.orogen")),
            typekit_registry: None,
        };
        assert!(!project.has_typekit());

        project.typekit_registry = Some(PathBuf::from("/opt/base/base.tlb"));
        assert!(project.has_typekit());
    }

    #[test]
    fn entities_serialize_with_field_names() {
        let tasklib = TaskLibrary {
            name: "camera".into(),
            project: "camera".into(),
            record: "camera-tasks-gnulinux".into(),
            task_models: vec!["camera::Task".into()],
        };
        let json = serde_json::to_value(&tasklib).unwrap();
        assert_eq!(json["project"], "camera");
        assert_eq!(json["task_models"][0], "camera::Task");
    }
}
