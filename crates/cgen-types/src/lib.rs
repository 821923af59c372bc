//! Foundation types for cgen.
//!
//! This crate provides the entities of the installed-component model and the
//! conventions used to find their descriptors. Every other cgen crate depends
//! on `cgen-types`.
//!
//! # Key Types
//!
//! - [`Project`] — Named unit of ownership; root of every other entity
//! - [`Typekit`] — A project's exported data types and their registry artifact
//! - [`TaskLibrary`] — Compiled artifact hosting task-model implementations
//! - [`Deployment`] — Runnable configuration instantiating deployed tasks
//! - [`TypeEntry`] — Ownership record of a single type name
//! - [`TypeList`] — Parsed content of a typekit's type-list artifact
//! - [`RecordNaming`] — Descriptor naming patterns for one target platform
//! - [`Fingerprint`] — BLAKE3 digest of a canonical JSON value

pub mod entity;
pub mod error;
pub mod fingerprint;
pub mod naming;
pub mod typelist;

pub use entity::{Deployment, Project, TaskLibrary, TypeEntry, Typekit};
pub use error::TypeError;
pub use fingerprint::Fingerprint;
pub use naming::{typelist_path_for, RecordClass, RecordNaming, DEFAULT_NAMESPACE};
pub use typelist::TypeList;
