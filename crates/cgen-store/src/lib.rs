//! Descriptor store access for cgen.
//!
//! Installed components describe themselves with small key/value descriptor
//! files. This crate reads them as [`RawRecord`]s and gives access to the
//! text artifacts they point at (specification files, type registries, type
//! lists). It never interprets record contents; that is the registry's job.
//!
//! # Storage Backends
//!
//! All backends implement the [`DescriptorStore`] trait:
//!
//! - [`InMemoryDescriptorStore`] -- map-based store for tests and embedding
//! - [`FsDescriptorStore`] -- `.pc` descriptor files found on a search path
//!
//! # Design Rules
//!
//! 1. Record names are unique within a store; listing is sorted.
//! 2. The store never interprets field values.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod record;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsDescriptorStore;
pub use memory::InMemoryDescriptorStore;
pub use record::{parse_descriptor, RawRecord};
pub use traits::DescriptorStore;
