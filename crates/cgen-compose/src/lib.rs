//! Extension composition for cgen.
//!
//! Two kinds of independently authored extensions attach generated code to
//! the artifacts of a generation run:
//!
//! - [`MarshallerPlugin`]s contribute per-typekit sources and build
//!   fragments, run in registration order through a [`PluginRegistry`].
//! - [`GlobalInitializer`]s contribute process-wide deployment fragments,
//!   selected by name and rendered through an [`InitializerRegistry`].
//!
//! A third set, the [`GenerationCapabilities`], turns [`TaskContextSpec`]s
//! into task-context member code with one generator per element kind.
//!
//! All three are assembled with builders and frozen into an
//! [`Extensions`] value before any generation starts. Fragment text is
//! parameterized with [`FragmentTemplate`]s, validated at registration.
//!
//! # Built-ins
//!
//! | plugins                                      | initializers |
//! |----------------------------------------------|--------------|
//! | `ros`, `corba`, `mqueue`, `type_info`, `typelib` | `qt`, `qt5` |

pub mod capability;
pub mod error;
pub mod extensions;
pub mod initializer;
pub mod initializers;
pub mod plugin;
pub mod plugins;
pub mod template;

pub use capability::{
    ElementCode, ElementGenerator, ElementKind, ElementSpec, GenerationCapabilities,
    GenerationCapabilitiesBuilder, RttGenerator, TaskContextCode, TaskContextSpec,
};
pub use error::{ComposeError, Result};
pub use extensions::Extensions;
pub use initializer::{
    BuildTarget, ComposedInitializers, DeploymentContext, GlobalInitializer, InitializerRegistry,
    InitializerRegistryBuilder, INITIALIZER_PARAMETERS,
};
pub use plugin::{
    Contribution, ContributionKind, MarshallerPlugin, PluginRegistry, PluginRegistryBuilder,
    TypeInfo, TypekitContributions, TypekitInput,
};
pub use template::{Filter, FragmentTemplate, TemplateValues};
