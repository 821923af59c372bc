//! Metadata registry for cgen.
//!
//! The registry scans a [`cgen_store::DescriptorStore`] for project, task
//! library, deployment and typekit descriptors of one target platform and
//! cross-references them into an immutable [`Snapshot`].
//!
//! # Rebuild Rules
//!
//! 1. Projects are registered first; every other entity must name a
//!    registered project or it is dropped with a diagnostic.
//! 2. A type name belongs to the first typekit that registers it. Later
//!    typekits may only mark it exported.
//! 3. A task model belongs to the last task library that claims it.
//! 4. Deployed task names accumulate across deployments.
//! 5. Record-level problems are [`Diagnostic`]s; only store failures abort a
//!    rebuild, and the previous snapshot then stays published.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cgen_registry::{MetadataRegistry, RegistryConfig};
//! use cgen_store::{InMemoryDescriptorStore, RawRecord};
//!
//! let store = InMemoryDescriptorStore::new();
//! store.insert_record(
//!     RawRecord::new("orogen-project-camera", "camera.pc")
//!         .with_field("project_name", "camera")
//!         .with_field("deffile", "/share/camera.orogen"),
//! );
//! store.insert_record(
//!     RawRecord::new("camera-tasks-gnulinux", "camera-tasks.pc")
//!         .with_field("project_name", "camera")
//!         .with_field("task_models", "camera::Task"),
//! );
//!
//! let registry = MetadataRegistry::open(RegistryConfig::default(), Arc::new(store)).unwrap();
//! assert_eq!(registry.task_library_owning("camera::Task").as_deref(), Some("camera"));
//! assert_eq!(registry.task_library_owning("other::Task"), None);
//! ```

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod rebuild;
pub mod registry;
pub mod snapshot;

pub use config::{RegistryConfig, DEFAULT_TARGET};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{RegistryError, Result};
pub use registry::{MetadataRegistry, RebuildReport};
pub use snapshot::Snapshot;
