//! Immutable registry snapshots and the merge rules used to build them.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use cgen_types::{Deployment, Fingerprint, Project, TaskLibrary, TypeEntry, TypeList, Typekit};

use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// A complete, internally consistent view of the installed components.
///
/// Snapshots are built from scratch by a rebuild and never mutated once
/// published. Every task library, deployment and typekit references a project
/// present in [`Snapshot::projects`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    target: String,
    projects: BTreeMap<String, Project>,
    task_libraries: BTreeMap<String, TaskLibrary>,
    deployments: BTreeMap<String, Deployment>,
    typekits: BTreeMap<String, Typekit>,
    /// task model -> owning task library
    task_models: BTreeMap<String, String>,
    /// type name -> owning typekit
    types: BTreeMap<String, TypeEntry>,
    /// deployed task -> deployments instantiating it
    deployed_tasks: BTreeMap<String, BTreeSet<String>>,
}

impl Snapshot {
    /// Target platform the snapshot was built for.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn projects(&self) -> &BTreeMap<String, Project> {
        &self.projects
    }

    pub fn task_libraries(&self) -> &BTreeMap<String, TaskLibrary> {
        &self.task_libraries
    }

    pub fn deployments(&self) -> &BTreeMap<String, Deployment> {
        &self.deployments
    }

    pub fn typekits(&self) -> &BTreeMap<String, Typekit> {
        &self.typekits
    }

    pub fn task_models(&self) -> &BTreeMap<String, String> {
        &self.task_models
    }

    pub fn types(&self) -> &BTreeMap<String, TypeEntry> {
        &self.types
    }

    pub fn deployed_tasks(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.deployed_tasks
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    pub fn typekit(&self, name: &str) -> Option<&Typekit> {
        self.typekits.get(name)
    }

    pub fn deployment(&self, name: &str) -> Option<&Deployment> {
        self.deployments.get(name)
    }

    pub fn task_library(&self, name: &str) -> Option<&TaskLibrary> {
        self.task_libraries.get(name)
    }

    pub fn type_entry(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    /// BLAKE3 digest of the snapshot's canonical JSON form.
    ///
    /// Two rebuilds over unchanged store content produce equal fingerprints.
    pub fn fingerprint(&self) -> Fingerprint {
        // Every map is a BTreeMap of plain data; encoding cannot fail.
        Fingerprint::of_json(self).unwrap_or_else(|_| Fingerprint::from_bytes(&[]))
    }

    /// Returns `true` if every entity references a registered project.
    pub fn is_referentially_consistent(&self) -> bool {
        let owned = |project: &String| self.projects.contains_key(project);
        self.task_libraries.values().all(|t| owned(&t.project))
            && self.deployments.values().all(|d| owned(&d.project))
            && self.typekits.values().all(|t| owned(&t.project))
            && self.task_models.values().all(|lib| self.task_libraries.contains_key(lib))
            && self.types.values().all(|t| self.typekits.contains_key(&t.owner))
    }
}

/// Accumulates entities into a fresh [`Snapshot`], applying the merge rules
/// and collecting diagnostics.
///
/// Projects must all be added before any other class: every other entity is
/// validated against the project map when it is added.
#[derive(Debug)]
pub(crate) struct SnapshotBuilder {
    snapshot: Snapshot,
    diagnostics: Vec<Diagnostic>,
}

impl SnapshotBuilder {
    pub(crate) fn new(target: &str) -> Self {
        Self {
            snapshot: Snapshot {
                target: target.to_string(),
                ..Default::default()
            },
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn diagnose(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.diagnostics.push(diagnostic);
    }

    /// Register a project. The first record naming a project wins.
    pub(crate) fn add_project(&mut self, project: Project) {
        if let Some(existing) = self.snapshot.projects.get(&project.name) {
            let message = format!(
                "project {} is already registered from {}",
                project.name, existing.record
            );
            self.diagnose(Diagnostic::new(
                DiagnosticKind::DuplicateProject,
                &project.record,
                message,
            ));
            return;
        }
        self.snapshot.projects.insert(project.name.clone(), project);
    }

    /// Check that `project` is registered, emitting an orphan diagnostic if
    /// not.
    fn owner_registered(&mut self, class: &str, name: &str, project: &str, record: &str) -> bool {
        if self.snapshot.projects.contains_key(project) {
            return true;
        }
        self.diagnose(Diagnostic::new(
            DiagnosticKind::OrphanedRecord,
            record,
            format!(
                "found {class} {name}, but the corresponding project {project} could not be found"
            ),
        ));
        false
    }

    /// Register a task library and its task models. A task model claimed by
    /// an earlier library is taken over by this one.
    pub(crate) fn add_task_library(&mut self, library: TaskLibrary) {
        if !self.owner_registered("task library", &library.name, &library.project, &library.record)
        {
            return;
        }

        for model in &library.task_models {
            let previous = self
                .snapshot
                .task_models
                .insert(model.clone(), library.name.clone());
            if let Some(previous) = previous.filter(|p| *p != library.name) {
                self.diagnose(Diagnostic::new(
                    DiagnosticKind::DuplicateTaskModel,
                    &library.record,
                    format!(
                        "task model {model} is defined by both {previous} and {}; using {}",
                        library.name, library.name
                    ),
                ));
            }
        }
        self.snapshot
            .task_libraries
            .insert(library.name.clone(), library);
    }

    /// Register a deployment. Deployed task names accumulate across
    /// deployments.
    pub(crate) fn add_deployment(&mut self, deployment: Deployment) {
        if !self.owner_registered(
            "deployment",
            &deployment.name,
            &deployment.project,
            &deployment.record,
        ) {
            return;
        }

        for task in &deployment.deployed_tasks {
            self.snapshot
                .deployed_tasks
                .entry(task.clone())
                .or_default()
                .insert(deployment.name.clone());
        }
        self.snapshot
            .deployments
            .insert(deployment.name.clone(), deployment);
    }

    /// Returns `true` if `typekit` may be registered: its project exists and
    /// declares a typekit.
    pub(crate) fn accepts_typekit(&mut self, typekit: &Typekit) -> bool {
        if !self.owner_registered("typekit", &typekit.name, &typekit.project, &typekit.record) {
            return false;
        }
        let declares_typekit = self
            .snapshot
            .projects
            .get(&typekit.project)
            .map(Project::has_typekit)
            .unwrap_or(false);
        if !declares_typekit {
            self.diagnose(Diagnostic::new(
                DiagnosticKind::ProjectWithoutTypekit,
                &typekit.record,
                format!(
                    "found typekit {}, but the corresponding project {} does not have a typekit",
                    typekit.name, typekit.project
                ),
            ));
        }
        declares_typekit
    }

    /// Register a typekit and the types listed in its type list.
    ///
    /// The first typekit to register a type name owns it. A later
    /// registration that exports the name marks it exported without changing
    /// its owner. Every re-registration emits a duplicate diagnostic.
    pub(crate) fn add_typekit(&mut self, typekit: Typekit, types: &TypeList) {
        let non_exported: Vec<&str> = types.non_exported().collect();
        for name in non_exported {
            self.register_type(&typekit, name, false);
        }
        for name in &types.exported {
            self.register_type(&typekit, name, true);
        }
        self.snapshot.typekits.insert(typekit.name.clone(), typekit);
    }

    fn register_type(&mut self, typekit: &Typekit, name: &str, exported: bool) {
        match self.snapshot.types.get_mut(name) {
            Some(entry) => {
                if exported {
                    entry.exported = true;
                }
                let message = format!(
                    "{name} is defined by both {} and {}",
                    entry.owner, typekit.name
                );
                self.diagnose(Diagnostic::new(
                    DiagnosticKind::DuplicateType,
                    &typekit.record,
                    message,
                ));
            }
            None => {
                self.snapshot
                    .types
                    .insert(name.to_string(), TypeEntry::new(&typekit.name, exported));
            }
        }
    }

    pub(crate) fn finish(self) -> (Snapshot, Vec<Diagnostic>) {
        (self.snapshot, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn project(name: &str, with_typekit: bool) -> Project {
        Project {
            name: name.into(),
            record: format!("orogen-project-{name}"),
            spec_path: Some(PathBuf::from(format!("/opt/{name}/{name}.orogen"))),
            typekit_registry: with_typekit.then(|| PathBuf::from(format!("/opt/{name}/{name}.tlb"))),
        }
    }

    fn typekit(name: &str, project: &str) -> Typekit {
        Typekit {
            name: name.into(),
            project: project.into(),
            record: format!("{name}-typekit-gnulinux"),
            type_registry: PathBuf::from(format!("/opt/{name}/{name}.tlb")),
        }
    }

    fn library(name: &str, project: &str, models: &[&str]) -> TaskLibrary {
        TaskLibrary {
            name: name.into(),
            project: project.into(),
            record: format!("{name}-tasks-gnulinux"),
            task_models: models.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn deployment(name: &str, project: &str, tasks: &[&str]) -> Deployment {
        Deployment {
            name: name.into(),
            project: project.into(),
            record: format!("orogen-{name}"),
            deployed_tasks: tasks.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(|d| d.kind).collect()
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    #[test]
    fn first_project_record_wins() {
        let mut b = SnapshotBuilder::new("gnulinux");
        b.add_project(project("base", false));
        let mut dup = project("base", true);
        dup.record = "orogen-project-base2".into();
        b.add_project(dup);

        let (snap, diags) = b.finish();
        assert_eq!(snap.projects().len(), 1);
        assert_eq!(snap.project("base").unwrap().record, "orogen-project-base");
        assert_eq!(kinds(&diags), vec![DiagnosticKind::DuplicateProject]);
    }

    // -----------------------------------------------------------------------
    // Referential integrity
    // -----------------------------------------------------------------------

    #[test]
    fn orphans_are_dropped_whole() {
        let mut b = SnapshotBuilder::new("gnulinux");
        b.add_project(project("base", true));
        b.add_task_library(library("camera", "camera", &["camera::Task"]));
        b.add_deployment(deployment("camera_test", "camera", &["cam"]));
        let tk = typekit("camera", "camera");
        assert!(!b.accepts_typekit(&tk));

        let (snap, diags) = b.finish();
        assert!(snap.task_libraries().is_empty());
        assert!(snap.task_models().is_empty());
        assert!(snap.deployments().is_empty());
        assert!(snap.deployed_tasks().is_empty());
        assert_eq!(diags.len(), 3);
        assert!(diags.iter().all(|d| d.kind == DiagnosticKind::OrphanedRecord));
        assert!(snap.is_referentially_consistent());
    }

    #[test]
    fn typekit_of_project_without_typekit_is_rejected() {
        let mut b = SnapshotBuilder::new("gnulinux");
        b.add_project(project("base", false));
        assert!(!b.accepts_typekit(&typekit("base", "base")));
        let (_, diags) = b.finish();
        assert_eq!(kinds(&diags), vec![DiagnosticKind::ProjectWithoutTypekit]);
    }

    // -----------------------------------------------------------------------
    // Merge rules
    // -----------------------------------------------------------------------

    #[test]
    fn exported_flag_merges_but_owner_stays() {
        let mut b = SnapshotBuilder::new("gnulinux");
        b.add_project(project("a", true));
        b.add_project(project("b", true));
        b.add_typekit(typekit("a", "a"), &TypeList::parse("/T 0\n"));
        b.add_typekit(typekit("b", "b"), &TypeList::parse("/T 1\n"));

        let (snap, diags) = b.finish();
        assert_eq!(snap.type_entry("/T"), Some(&TypeEntry::new("a", true)));
        assert_eq!(kinds(&diags), vec![DiagnosticKind::DuplicateType]);
    }

    #[test]
    fn non_exported_reregistration_keeps_exported_flag() {
        let mut b = SnapshotBuilder::new("gnulinux");
        b.add_project(project("a", true));
        b.add_project(project("b", true));
        b.add_typekit(typekit("a", "a"), &TypeList::parse("/T 1\n"));
        b.add_typekit(typekit("b", "b"), &TypeList::parse("/T 0\n"));

        let (snap, diags) = b.finish();
        assert_eq!(snap.type_entry("/T"), Some(&TypeEntry::new("a", true)));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn task_model_last_registration_wins() {
        let mut b = SnapshotBuilder::new("gnulinux");
        b.add_project(project("p", false));
        b.add_task_library(library("l1", "p", &["M"]));
        b.add_task_library(library("l2", "p", &["M"]));

        let (snap, diags) = b.finish();
        assert_eq!(snap.task_models().get("M").map(String::as_str), Some("l2"));
        assert_eq!(kinds(&diags), vec![DiagnosticKind::DuplicateTaskModel]);
    }

    #[test]
    fn deployed_tasks_accumulate() {
        let mut b = SnapshotBuilder::new("gnulinux");
        b.add_project(project("p", false));
        b.add_deployment(deployment("d1", "p", &["cam", "log"]));
        b.add_deployment(deployment("d2", "p", &["cam"]));

        let (snap, diags) = b.finish();
        let cam: Vec<&str> = snap.deployed_tasks()["cam"].iter().map(String::as_str).collect();
        assert_eq!(cam, vec!["d1", "d2"]);
        assert_eq!(snap.deployed_tasks()["log"].len(), 1);
        assert!(diags.is_empty());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let build = |extra: bool| {
            let mut b = SnapshotBuilder::new("gnulinux");
            b.add_project(project("p", false));
            if extra {
                b.add_project(project("q", false));
            }
            b.finish().0
        };
        assert_eq!(build(false).fingerprint(), build(false).fingerprint());
        assert_ne!(build(false).fingerprint(), build(true).fingerprint());
    }
}
