//! Generation runs for cgen.
//!
//! A [`GenerationRun`] ties a [`cgen_registry::MetadataRegistry`] to the
//! process's [`cgen_compose::Extensions`]. It validates a
//! [`GenerationRequest`] as a whole, runs the marshaller plugins over the
//! requested typekits, generates member code for the requested task
//! contexts, composes the requested global initializers into each
//! deployment, and returns the laid-out [`GeneratedArtifacts`]:
//!
//! ```text
//! typekits/<typekit>/<plugin source paths>
//! typekits/<typekit>/build.fragment
//! tasks/<task>/declarations.fragment
//! tasks/<task>/initializers.fragment
//! tasks/<task>/registrations.fragment
//! deployments/<deployment>/global_scope.fragment
//! deployments/<deployment>/init.fragment
//! deployments/<deployment>/exit.fragment
//! deployments/<deployment>/build/<target>.fragment
//! manifest.json
//! ```
//!
//! A failed run produces no files.

pub mod artifacts;
pub mod error;
pub mod request;
pub mod run;

pub use artifacts::{DeploymentResolution, GeneratedArtifacts, Manifest, ManifestEntry, MANIFEST_FILE};
pub use error::{GenerateError, GenerateResult};
pub use request::{DeploymentRequest, GenerationRequest};
pub use run::GenerationRun;
