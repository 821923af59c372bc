//! Descriptor naming conventions.
//!
//! Installed components publish one descriptor per entity. The class of a
//! descriptor is encoded in its record name, parameterized by a namespace and
//! the target platform identifier:
//!
//! | class        | record name                     | entity name        |
//! |--------------|---------------------------------|--------------------|
//! | project      | `{ns}-project-{name}`           | `project_name` field |
//! | task library | `{name}-tasks-{target}`         | `{name}`           |
//! | deployment   | `{ns}-{name}` (`name` is `\w+`) | `{name}`           |
//! | typekit      | `{name}-typekit-{target}`       | `{name}`           |

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Namespace used by installed descriptors unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "orogen";

/// The four descriptor classes, in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordClass {
    Project,
    TaskLibrary,
    Deployment,
    Typekit,
}

impl RecordClass {
    /// All classes in the order a rebuild must process them. Projects come
    /// first because every other class validates against them.
    pub const ALL: [RecordClass; 4] = [
        RecordClass::Project,
        RecordClass::TaskLibrary,
        RecordClass::Deployment,
        RecordClass::Typekit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::TaskLibrary => "task library",
            Self::Deployment => "deployment",
            Self::Typekit => "typekit",
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled naming patterns for one namespace and target platform.
#[derive(Clone, Debug)]
pub struct RecordNaming {
    namespace: String,
    target: String,
    project: Regex,
    task_library: Regex,
    deployment: Regex,
    typekit: Regex,
}

impl RecordNaming {
    /// Compile the patterns for `namespace` and `target`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cgen_types::{RecordClass, RecordNaming};
    ///
    /// let naming = RecordNaming::new("orogen", "gnulinux").unwrap();
    /// assert!(naming.matches(RecordClass::TaskLibrary, "camera-tasks-gnulinux"));
    /// assert!(!naming.matches(RecordClass::TaskLibrary, "camera-tasks-xenomai"));
    /// assert_eq!(
    ///     naming.entity_name(RecordClass::Typekit, "base-typekit-gnulinux").as_deref(),
    ///     Some("base"),
    /// );
    /// ```
    pub fn new(namespace: &str, target: &str) -> Result<Self, TypeError> {
        if target.is_empty() || target.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidTarget(target.to_string()));
        }
        if namespace.is_empty() || !namespace.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(TypeError::InvalidNamespace(namespace.to_string()));
        }

        let ns = regex::escape(namespace);
        let tg = regex::escape(target);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| TypeError::Pattern(e.to_string()))
        };

        Ok(Self {
            namespace: namespace.to_string(),
            target: target.to_string(),
            project: compile(format!("^{ns}-project-"))?,
            task_library: compile(format!("-tasks-{tg}$"))?,
            deployment: compile(format!(r"^{ns}-\w+$"))?,
            typekit: compile(format!("-typekit-{tg}$"))?,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The record-name pattern selecting descriptors of `class`.
    pub fn pattern(&self, class: RecordClass) -> &Regex {
        match class {
            RecordClass::Project => &self.project,
            RecordClass::TaskLibrary => &self.task_library,
            RecordClass::Deployment => &self.deployment,
            RecordClass::Typekit => &self.typekit,
        }
    }

    /// Returns `true` if `record` is a descriptor of `class`.
    pub fn matches(&self, class: RecordClass, record: &str) -> bool {
        self.pattern(class).is_match(record)
    }

    /// Derive the entity name from a record name.
    ///
    /// For projects this is the record-name suffix, which is only a hint: the
    /// registered name comes from the descriptor's `project_name` field.
    /// Returns `None` if `record` is not of `class` or the derived name is
    /// empty.
    pub fn entity_name(&self, class: RecordClass, record: &str) -> Option<String> {
        if !self.matches(class, record) {
            return None;
        }
        let name = match class {
            RecordClass::Project => {
                record.strip_prefix(&format!("{}-project-", self.namespace))
            }
            RecordClass::Deployment => record.strip_prefix(&format!("{}-", self.namespace)),
            RecordClass::TaskLibrary => record.strip_suffix(&format!("-tasks-{}", self.target)),
            RecordClass::Typekit => record.strip_suffix(&format!("-typekit-{}", self.target)),
        }?;
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// Build the record name under which an entity of `class` is published.
    pub fn record_name(&self, class: RecordClass, entity: &str) -> String {
        match class {
            RecordClass::Project => format!("{}-project-{entity}", self.namespace),
            RecordClass::TaskLibrary => format!("{entity}-tasks-{}", self.target),
            RecordClass::Deployment => format!("{}-{entity}", self.namespace),
            RecordClass::Typekit => format!("{entity}-typekit-{}", self.target),
        }
    }
}

/// Path of the type-list artifact that sits next to a type registry.
///
/// ```
/// use std::path::Path;
/// use cgen_types::typelist_path_for;
///
/// assert_eq!(
///     typelist_path_for(Path::new("/opt/lib/base.tlb")),
///     Path::new("/opt/lib/base.typelist"),
/// );
/// ```
pub fn typelist_path_for(type_registry: &Path) -> PathBuf {
    type_registry.with_extension("typelist")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> RecordNaming {
        RecordNaming::new(DEFAULT_NAMESPACE, "gnulinux").unwrap()
    }

    #[test]
    fn project_records() {
        let n = naming();
        assert!(n.matches(RecordClass::Project, "orogen-project-base"));
        assert!(!n.matches(RecordClass::Project, "orogen-base"));
        assert_eq!(
            n.entity_name(RecordClass::Project, "orogen-project-base").as_deref(),
            Some("base")
        );
    }

    #[test]
    fn deployment_pattern_excludes_hyphenated_names() {
        let n = naming();
        assert!(n.matches(RecordClass::Deployment, "orogen-camera_test"));
        assert!(!n.matches(RecordClass::Deployment, "orogen-project-base"));
        assert!(!n.matches(RecordClass::Deployment, "rtt-orogen-camera"));
        assert_eq!(
            n.entity_name(RecordClass::Deployment, "orogen-camera_test").as_deref(),
            Some("camera_test")
        );
    }

    #[test]
    fn target_is_part_of_the_pattern() {
        let n = naming();
        assert!(n.matches(RecordClass::Typekit, "base-typekit-gnulinux"));
        assert!(!n.matches(RecordClass::Typekit, "base-typekit-xenomai"));
        assert!(!n.matches(RecordClass::Typekit, "base-typekit-gnulinux-extra"));
    }

    #[test]
    fn target_metacharacters_are_escaped() {
        let n = RecordNaming::new("orogen", "gnu.linux").unwrap();
        assert!(n.matches(RecordClass::TaskLibrary, "x-tasks-gnu.linux"));
        assert!(!n.matches(RecordClass::TaskLibrary, "x-tasks-gnuXlinux"));
    }

    #[test]
    fn empty_entity_name_is_rejected() {
        let n = naming();
        assert_eq!(n.entity_name(RecordClass::TaskLibrary, "-tasks-gnulinux"), None);
        assert_eq!(n.entity_name(RecordClass::TaskLibrary, "camera-typekit-gnulinux"), None);
    }

    #[test]
    fn record_name_inverts_entity_name() {
        let n = naming();
        for class in RecordClass::ALL {
            let record = n.record_name(class, "camera");
            assert!(n.matches(class, &record), "{class}: {record}");
            assert_eq!(n.entity_name(class, &record).as_deref(), Some("camera"));
        }
    }

    #[test]
    fn invalid_configuration() {
        assert_eq!(
            RecordNaming::new("orogen", "").unwrap_err(),
            TypeError::InvalidTarget(String::new())
        );
        assert!(RecordNaming::new("orogen", "gnu linux").is_err());
        assert!(RecordNaming::new("oro-gen", "gnulinux").is_err());
        assert!(RecordNaming::new("", "gnulinux").is_err());
    }

    #[test]
    fn typelist_sits_next_to_registry() {
        assert_eq!(
            typelist_path_for(Path::new("lib/typekit/camera.tlb")),
            PathBuf::from("lib/typekit/camera.typelist")
        );
    }
}
