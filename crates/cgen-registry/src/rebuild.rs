//! Scanning the descriptor store into a fresh snapshot.
//!
//! Record-level problems become diagnostics and the record is skipped. Only
//! store read failures abort the scan.

use std::path::PathBuf;

use tracing::debug;

use cgen_store::{DescriptorStore, RawRecord, StoreError, StoreResult};
use cgen_types::{
    typelist_path_for, Deployment, Project, RecordClass, RecordNaming, TaskLibrary, TypeList,
    Typekit,
};

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::snapshot::{Snapshot, SnapshotBuilder};

/// Descriptor field names.
pub mod fields {
    pub const PROJECT_NAME: &str = "project_name";
    pub const SPEC_FILE: &str = "deffile";
    pub const TYPE_REGISTRY: &str = "type_registry";
    pub const TASK_MODELS: &str = "task_models";
    pub const DEPLOYED_TASKS: &str = "deployed_tasks";
}

/// Build a snapshot from everything the store currently holds.
pub(crate) fn scan(
    store: &dyn DescriptorStore,
    naming: &RecordNaming,
) -> StoreResult<(Snapshot, Vec<Diagnostic>)> {
    let mut builder = SnapshotBuilder::new(naming.target());
    let names = store.record_names()?;

    for class in RecordClass::ALL {
        let records = load_class(store, naming, class, &names, &mut builder)?;
        debug!(%class, count = records.len(), "scanning descriptors");

        for record in &records {
            match class {
                RecordClass::Project => {
                    if let Some(project) = parse_project(record, &mut builder) {
                        builder.add_project(project);
                    }
                }
                RecordClass::TaskLibrary => {
                    if let Some(library) = parse_task_library(record, naming, &mut builder) {
                        builder.add_task_library(library);
                    }
                }
                RecordClass::Deployment => {
                    if let Some(deployment) = parse_deployment(record, naming, &mut builder) {
                        builder.add_deployment(deployment);
                    }
                }
                RecordClass::Typekit => {
                    let Some(typekit) = parse_typekit(record, naming, &mut builder) else {
                        continue;
                    };
                    if !builder.accepts_typekit(&typekit) {
                        continue;
                    }
                    let text = store.read_text(&typelist_path_for(&typekit.type_registry))?;
                    builder.add_typekit(typekit, &TypeList::parse(&text));
                }
            }
        }
    }

    Ok(builder.finish())
}

/// Load the records of one class. A descriptor that fails to parse is a
/// malformed record, not a store failure.
fn load_class(
    store: &dyn DescriptorStore,
    naming: &RecordNaming,
    class: RecordClass,
    names: &[String],
    builder: &mut SnapshotBuilder,
) -> StoreResult<Vec<RawRecord>> {
    let mut records = Vec::new();
    for name in names.iter().filter(|n| naming.matches(class, n)) {
        match store.load(name) {
            Ok(record) => records.push(record),
            Err(err @ StoreError::Parse { .. }) => {
                builder.diagnose(Diagnostic::new(
                    DiagnosticKind::MalformedRecord,
                    name,
                    err.to_string(),
                ));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(records)
}

fn malformed(builder: &mut SnapshotBuilder, record: &RawRecord, message: String) {
    builder.diagnose(Diagnostic::new(
        DiagnosticKind::MalformedRecord,
        &record.name,
        message,
    ));
}

/// The owner project named by a record, or a malformed diagnostic.
fn owner(record: &RawRecord, builder: &mut SnapshotBuilder) -> Option<String> {
    match record.field(fields::PROJECT_NAME) {
        Some(project) => Some(project.to_string()),
        None => {
            malformed(
                builder,
                record,
                format!(
                    "{} does not have a {} field",
                    record.path.display(),
                    fields::PROJECT_NAME
                ),
            );
            None
        }
    }
}

/// The entity name derived from a record name. Records are selected by the
/// same pattern, so this only fails for degenerate names such as
/// `-tasks-gnulinux`.
fn entity_name(
    record: &RawRecord,
    class: RecordClass,
    naming: &RecordNaming,
    builder: &mut SnapshotBuilder,
) -> Option<String> {
    let name = naming.entity_name(class, &record.name);
    if name.is_none() {
        malformed(builder, record, format!("cannot derive a {class} name from the record name"));
    }
    name
}

/// A comma-list field that must be present (it may be empty).
fn required_list(
    record: &RawRecord,
    key: &str,
    builder: &mut SnapshotBuilder,
) -> Option<Vec<String>> {
    if record.has_field(key) {
        Some(record.list(key))
    } else {
        malformed(
            builder,
            record,
            format!("{} does not have a {key} field", record.path.display()),
        );
        None
    }
}

fn parse_project(record: &RawRecord, builder: &mut SnapshotBuilder) -> Option<Project> {
    let name = owner(record, builder)?;

    let spec_path = record.field(fields::SPEC_FILE).map(PathBuf::from);
    if spec_path.is_none() {
        builder.diagnose(Diagnostic::new(
            DiagnosticKind::MissingOptionalField,
            &record.name,
            format!(
                "{} does not have a {} field",
                record.path.display(),
                fields::SPEC_FILE
            ),
        ));
    }

    Some(Project {
        name,
        record: record.name.clone(),
        spec_path,
        typekit_registry: record.field(fields::TYPE_REGISTRY).map(PathBuf::from),
    })
}

fn parse_task_library(
    record: &RawRecord,
    naming: &RecordNaming,
    builder: &mut SnapshotBuilder,
) -> Option<TaskLibrary> {
    let name = entity_name(record, RecordClass::TaskLibrary, naming, builder)?;
    let project = owner(record, builder)?;
    let task_models = required_list(record, fields::TASK_MODELS, builder)?;
    Some(TaskLibrary {
        name,
        project,
        record: record.name.clone(),
        task_models,
    })
}

fn parse_deployment(
    record: &RawRecord,
    naming: &RecordNaming,
    builder: &mut SnapshotBuilder,
) -> Option<Deployment> {
    let name = entity_name(record, RecordClass::Deployment, naming, builder)?;
    let project = owner(record, builder)?;
    let deployed_tasks = required_list(record, fields::DEPLOYED_TASKS, builder)?;
    Some(Deployment {
        name,
        project,
        record: record.name.clone(),
        deployed_tasks,
    })
}

fn parse_typekit(
    record: &RawRecord,
    naming: &RecordNaming,
    builder: &mut SnapshotBuilder,
) -> Option<Typekit> {
    let name = entity_name(record, RecordClass::Typekit, naming, builder)?;
    let project = owner(record, builder)?;
    let Some(type_registry) = record.field(fields::TYPE_REGISTRY) else {
        malformed(
            builder,
            record,
            format!(
                "{} does not have a {} field",
                record.path.display(),
                fields::TYPE_REGISTRY
            ),
        );
        return None;
    };
    Some(Typekit {
        name,
        project,
        record: record.name.clone(),
        type_registry: PathBuf::from(type_registry),
    })
}
