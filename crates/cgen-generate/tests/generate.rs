use std::sync::Arc;

use proptest::prelude::*;

use cgen_compose::{ElementKind, Extensions, TaskContextSpec};
use cgen_generate::{
    DeploymentRequest, GenerateError, GeneratedArtifacts, GenerationRequest, GenerationRun,
    MANIFEST_FILE,
};
use cgen_registry::{MetadataRegistry, RegistryConfig};
use cgen_store::{InMemoryDescriptorStore, RawRecord};

fn installation() -> MetadataRegistry {
    let store = InMemoryDescriptorStore::new();
    store.insert_record(
        RawRecord::new("orogen-project-camera", "/pc/orogen-project-camera.pc")
            .with_field("project_name", "camera")
            .with_field("deffile", "/share/camera.orogen")
            .with_field("type_registry", "/share/camera.tlb"),
    );
    store.insert_record(
        RawRecord::new("camera-typekit-gnulinux", "/pc/camera-typekit-gnulinux.pc")
            .with_field("project_name", "camera")
            .with_field("type_registry", "/share/camera.tlb"),
    );
    store.insert_record(
        RawRecord::new("camera-tasks-gnulinux", "/pc/camera-tasks-gnulinux.pc")
            .with_field("project_name", "camera")
            .with_field("task_models", "camera::Driver"),
    );
    store.insert_record(
        RawRecord::new("orogen-camera_viewer", "/pc/orogen-camera_viewer.pc")
            .with_field("project_name", "camera")
            .with_field("deployed_tasks", "driver, viewer"),
    );
    store.insert_artifact("/share/camera.tlb", "<typelib/>\n");
    store.insert_artifact(
        "/share/camera.typelist",
        "/camera/Frame 1\n/camera/Settings 1\n/camera/internal/Buffer 0\n",
    );
    MetadataRegistry::open(RegistryConfig::default(), Arc::new(store)).unwrap()
}

fn viewer_request(initializers: &[&str]) -> GenerationRequest {
    let mut deployment = DeploymentRequest::new("camera_viewer")
        .with_task_model("camera::Driver")
        .with_task_model("gui::ImageView");
    for name in initializers {
        deployment = deployment.with_initializer(*name);
    }
    GenerationRequest::new()
        .with_typekit("camera")
        .with_deployment(deployment)
}

fn run(request: &GenerationRequest) -> Result<GeneratedArtifacts, GenerateError> {
    let registry = installation();
    let extensions = Extensions::builtin().unwrap();
    GenerationRun::new(&registry, &extensions).execute(request)
}

// ---------------------------------------------------------------------------
// Fail-fast
// ---------------------------------------------------------------------------

#[test]
fn unknown_initializer_fails_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let result = run(&viewer_request(&["qt", "gui-v9"]))
        .and_then(|artifacts| artifacts.write_to(&out).map(|_| ()));

    let err = result.unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("gui-v9"));
    assert!(!out.exists());
}

#[test]
fn bad_task_context_fails_whole_run() {
    let request = viewer_request(&["qt"]).with_task_context(
        TaskContextSpec::new("Viewer")
            .with(ElementKind::InputPort, "frame", "/camera/Frame")
            .with(ElementKind::OutputPort, "frame", "/camera/Frame"),
    );
    let err = run(&request).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("frame"));
}

#[test]
fn task_contexts_land_beside_typekits() {
    let request = viewer_request(&[]).with_task_context(
        TaskContextSpec::new("Viewer").with(ElementKind::InputPort, "frame", "/camera/Frame"),
    );
    let artifacts = run(&request).unwrap();
    assert_eq!(
        artifacts.get("tasks/Viewer/declarations.fragment"),
        Some("RTT::InputPort< ::camera::Frame > _frame;\n")
    );
    assert!(artifacts.get("typekits/camera/build.fragment").is_some());
}

#[test]
fn unknown_typekit_fails_the_run() {
    let req = GenerationRequest::new().with_typekit("nope");
    assert!(matches!(run(&req), Err(GenerateError::Registry(_))));
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[test]
fn typekit_and_deployment_layout() {
    let artifacts = run(&viewer_request(&["qt5"])).unwrap();

    assert!(artifacts
        .get("typekits/camera/transports/corba/Convertions.cpp")
        .unwrap()
        .contains("toCORBA(orogen::Corba::camera_Frame&"));
    assert!(artifacts.get("typekits/camera/type_info/camera_Settings.cpp").is_some());
    assert!(artifacts.get("typekits/camera/type_info/camera_internal_Buffer.cpp").is_none());

    let build = artifacts.get("typekits/camera/build.fragment").unwrap();
    let ros = build.find("camera-transport-ros-").unwrap();
    let typelib = build.find("camera-transport-typelib-").unwrap();
    assert!(ros < typelib);

    assert!(artifacts
        .get("deployments/camera_viewer/init.fragment")
        .unwrap()
        .contains("pthread_create"));
    assert!(artifacts
        .get("deployments/camera_viewer/build/task_library.fragment")
        .unwrap()
        .contains("${CAMERA_TASKLIB_NAME}"));
    assert!(artifacts
        .get("deployments/camera_viewer/build/deployment.fragment")
        .unwrap()
        .contains("target_link_libraries(camera_viewer Qt5::Core"));

    let resolution = &artifacts.deployments["camera_viewer"];
    assert_eq!(resolution.project, "camera");
    assert_eq!(resolution.task_libraries["camera::Driver"], "camera");
    assert_eq!(resolution.unresolved_models, vec!["gui::ImageView"]);
}

#[test]
fn deployment_without_initializers_has_empty_fragments() {
    let artifacts = run(&viewer_request(&[])).unwrap();
    assert_eq!(artifacts.get("deployments/camera_viewer/init.fragment"), Some(""));
    assert!(artifacts
        .get("deployments/camera_viewer/build/deployment.fragment")
        .is_none());
}

#[test]
fn written_output_matches_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = run(&viewer_request(&["qt"])).unwrap();
    let manifest = artifacts.write_to(dir.path()).unwrap();

    assert_eq!(manifest.files.len(), artifacts.len());
    for entry in &manifest.files {
        let on_disk = std::fs::read_to_string(dir.path().join(&entry.path)).unwrap();
        assert_eq!(on_disk.len(), entry.bytes);
    }
    assert!(dir.path().join(MANIFEST_FILE).is_file());
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn composition_is_independent_of_request_order(
        picks in proptest::collection::vec(prop_oneof![Just("qt"), Just("qt5")], 0..5)
    ) {
        let mut reversed = picks.clone();
        reversed.reverse();

        let first = run(&viewer_request(&picks)).unwrap();
        let second = run(&viewer_request(&reversed)).unwrap();
        prop_assert_eq!(first, second);
    }
}
