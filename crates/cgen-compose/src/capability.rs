//! Code generation for task-context model elements.
//!
//! Each element kind is handled by one [`ElementGenerator`]. The set of
//! generators is fixed when [`GenerationCapabilities`] is built, and building
//! fails unless every kind is covered.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, Result};
use crate::plugin::TypeInfo;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Attribute,
    Property,
    Operation,
    InputPort,
    OutputPort,
}

impl ElementKind {
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Attribute,
        ElementKind::Property,
        ElementKind::Operation,
        ElementKind::InputPort,
        ElementKind::OutputPort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Property => "property",
            Self::Operation => "operation",
            Self::InputPort => "input port",
            Self::OutputPort => "output port",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a task context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub kind: ElementKind,
    pub name: String,
    /// Registry type name (`/base/Time`) for data elements, C++ signature
    /// (`bool(int)`) for operations.
    pub type_name: String,
}

impl ElementSpec {
    pub fn new(kind: ElementKind, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Generated code for one element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ElementCode {
    /// Member declaration in the task class.
    pub declaration: String,
    /// Entry of the constructor's member initializer list.
    pub initializer: String,
    /// Statement in the constructor body exposing the element.
    pub registration: String,
}

/// Generator for one element kind.
pub trait ElementGenerator: Send + Sync {
    fn kind(&self) -> ElementKind;

    /// Generate the code of `element`, a member of task context `task`.
    fn generate(&self, task: &str, element: &ElementSpec) -> Result<ElementCode>;
}

// ---------------------------------------------------------------------------
// RTT generators
// ---------------------------------------------------------------------------

/// Generator targeting the Orocos RTT component API.
pub struct RttGenerator {
    kind: ElementKind,
}

impl RttGenerator {
    pub fn new(kind: ElementKind) -> Self {
        Self { kind }
    }
}

impl ElementGenerator for RttGenerator {
    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn generate(&self, task: &str, element: &ElementSpec) -> Result<ElementCode> {
        let name = &element.name;
        let data_type = || format!("::{}", TypeInfo::new(element.type_name.as_str(), true).cxx_name());
        let code = match self.kind {
            ElementKind::Attribute => ElementCode {
                declaration: format!("RTT::Attribute< {} > _{name};", data_type()),
                initializer: format!("_{name}(\"{name}\")"),
                registration: format!("provides()->addAttribute(_{name});"),
            },
            ElementKind::Property => ElementCode {
                declaration: format!("RTT::Property< {} > _{name};", data_type()),
                initializer: format!("_{name}(\"{name}\", \"\")"),
                registration: format!("properties()->addProperty(_{name});"),
            },
            ElementKind::Operation => ElementCode {
                declaration: format!("RTT::Operation< {} > _{name};", element.type_name),
                initializer: format!("_{name}(\"{name}\", &{task}Base::{name}, this, RTT::OwnThread)"),
                registration: format!("provides()->addOperation(_{name});"),
            },
            ElementKind::InputPort => ElementCode {
                declaration: format!("RTT::InputPort< {} > _{name};", data_type()),
                initializer: format!("_{name}(\"{name}\")"),
                registration: format!("ports()->addPort(_{name});"),
            },
            ElementKind::OutputPort => ElementCode {
                declaration: format!("RTT::OutputPort< {} > _{name};", data_type()),
                initializer: format!("_{name}(\"{name}\")"),
                registration: format!("ports()->addPort(_{name});"),
            },
        };
        Ok(code)
    }
}

// ---------------------------------------------------------------------------
// Task contexts
// ---------------------------------------------------------------------------

/// A task context: a name and its elements in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContextSpec {
    pub name: String,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

impl TaskContextSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Builder-style element append.
    pub fn with(mut self, kind: ElementKind, name: &str, type_name: &str) -> Self {
        self.elements.push(ElementSpec::new(kind, name, type_name));
        self
    }
}

/// Generated code for a whole task context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TaskContextCode {
    pub declarations: String,
    pub initializers: String,
    pub registrations: String,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// GenerationCapabilities
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct GenerationCapabilitiesBuilder {
    generators: BTreeMap<ElementKind, Box<dyn ElementGenerator>>,
}

impl GenerationCapabilitiesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the generator of one element kind. Each kind takes exactly one.
    pub fn register(&mut self, generator: Box<dyn ElementGenerator>) -> Result<&mut Self> {
        let kind = generator.kind();
        if self.generators.contains_key(&kind) {
            return Err(ComposeError::Config(format!(
                "a generator for {kind} elements is already registered"
            )));
        }
        self.generators.insert(kind, generator);
        Ok(self)
    }

    /// Freeze the set. Fails if any element kind has no generator.
    pub fn build(self) -> Result<GenerationCapabilities> {
        let missing: Vec<&str> = ElementKind::ALL
            .iter()
            .filter(|k| !self.generators.contains_key(*k))
            .map(ElementKind::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(ComposeError::Config(format!(
                "no generator for {} elements",
                missing.join(", ")
            )));
        }
        Ok(GenerationCapabilities {
            generators: self.generators,
        })
    }
}

/// Complete, frozen set of element generators.
pub struct GenerationCapabilities {
    generators: BTreeMap<ElementKind, Box<dyn ElementGenerator>>,
}

impl GenerationCapabilities {
    pub fn builder() -> GenerationCapabilitiesBuilder {
        GenerationCapabilitiesBuilder::new()
    }

    /// RTT generators for every element kind.
    pub fn rtt() -> Result<Self> {
        let mut b = Self::builder();
        for kind in ElementKind::ALL {
            b.register(Box::new(RttGenerator::new(kind)))?;
        }
        b.build()
    }

    pub fn generate(&self, task: &str, element: &ElementSpec) -> Result<ElementCode> {
        if !is_identifier(&element.name) {
            return Err(ComposeError::Config(format!(
                "{} name {:?} of task {task} is not a valid identifier",
                element.kind, element.name
            )));
        }
        if element.type_name.trim().is_empty() {
            return Err(ComposeError::Config(format!(
                "{} {} of task {task} has no type",
                element.kind, element.name
            )));
        }
        let generator = self.generators.get(&element.kind).ok_or_else(|| {
            ComposeError::Config(format!("no generator for {} elements", element.kind))
        })?;
        generator.generate(task, element)
    }

    /// Generate every element of `task`, in declaration order.
    ///
    /// Element names must be unique within the task.
    pub fn generate_task_context(&self, task: &TaskContextSpec) -> Result<TaskContextCode> {
        if !is_identifier(&task.name) {
            return Err(ComposeError::Config(format!(
                "task context name {:?} is not a valid identifier",
                task.name
            )));
        }

        let mut seen = BTreeSet::new();
        let mut out = TaskContextCode::default();
        let mut initializers = Vec::with_capacity(task.elements.len());
        for element in &task.elements {
            if !seen.insert(element.name.as_str()) {
                return Err(ComposeError::Config(format!(
                    "task context {} declares {} twice",
                    task.name, element.name
                )));
            }
            let code = self.generate(&task.name, element)?;
            out.declarations.push_str(&code.declaration);
            out.declarations.push('\n');
            out.registrations.push_str(&code.registration);
            out.registrations.push('\n');
            initializers.push(code.initializer);
        }
        out.initializers = initializers.join(",\n");
        Ok(out)
    }
}

impl fmt::Debug for GenerationCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationCapabilities")
            .field("kinds", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}
