use std::collections::HashSet;

use unimigrate_sequencer::{MigrationSequencer, load_manifest};
use unimigrate_types::{
    ClusterDescriptor, JobDescriptor, MigrationManifest, MigrationStep, NodeKey, ObjectKind, ReferenceFact, Registration, TableDescriptor,
    TaskDescriptor,
};

fn load_fixture() -> MigrationManifest {
    let manifest = include_str!("data/workspace_manifest.yaml");
    serde_yaml::from_str(manifest).expect("parse fixture manifest")
}

fn keys(steps: &[MigrationStep]) -> Vec<NodeKey> {
    steps.iter().map(MigrationStep::node_key).collect()
}

fn key(kind: ObjectKind, id: &str) -> NodeKey {
    NodeKey::new(kind, id).unwrap()
}

fn assert_gap_free_and_unique(steps: &[MigrationStep]) {
    let numbers: Vec<u32> = steps.iter().map(|step| step.step_number).collect();
    let expected: Vec<u32> = (1..=steps.len() as u32).collect();
    assert_eq!(numbers, expected, "step numbers must start at 1 with no gaps");
    let distinct: HashSet<_> = keys(steps).into_iter().collect();
    assert_eq!(distinct.len(), steps.len(), "every object must appear exactly once");
}

fn reference(from: (ObjectKind, &str), to: (ObjectKind, &str)) -> ReferenceFact {
    ReferenceFact {
        from: NodeKey::new(from.0, from.1).unwrap(),
        to: NodeKey::new(to.0, to.1).unwrap(),
    }
}

#[test]
fn cluster_from_task_is_sequenced_after_job_and_task() {
    let task = TaskDescriptor::new("test-task").on_cluster("cluster-123");
    let job = JobDescriptor::new("1234", Some("test-job".into())).with_task(task.clone());
    let mut sequencer = MigrationSequencer::new();
    sequencer.register_workflow_task(&task, &job).unwrap();

    let steps = sequencer.generate_steps().unwrap();
    assert_eq!(steps.len(), 3);
    let step = steps.last().unwrap();
    assert_eq!(step.object_type, ObjectKind::Cluster);
    assert_eq!(step.object_id, "cluster-123");
    assert_eq!(step.step_number, 3);
    assert_eq!(steps[0].object_type, ObjectKind::Job);
    assert_eq!(steps[1].object_type, ObjectKind::Task);
}

#[test]
fn fixture_manifest_produces_a_complete_plan() {
    let manifest = load_fixture();
    let mut sequencer = MigrationSequencer::from_manifest(&manifest).unwrap();
    let steps = sequencer.generate_steps().unwrap();
    assert_gap_free_and_unique(&steps);

    let expected = vec![
        (ObjectKind::Job, "1234"),
        (ObjectKind::Task, "1234/test-task"),
        (ObjectKind::Cluster, "cluster-123"),
        (ObjectKind::ClusterPolicy, "policy-1"),
        (ObjectKind::Task, "1234/refresh"),
        (ObjectKind::Pipeline, "pipeline-7"),
        (ObjectKind::Schema, "main.sales"),
        (ObjectKind::Catalog, "main"),
        (ObjectKind::Library, "whl:/Workspace/libs/etl-0.1.0-py3-none-any.whl"),
        (ObjectKind::Library, "pypi:requests==2.32.0"),
        (ObjectKind::Table, "main.sales.orders"),
        (ObjectKind::Grant, "analysts:SELECT:TABLE:main.sales.orders"),
        (ObjectKind::Principal, "analysts"),
    ];
    let actual: Vec<(ObjectKind, &str)> = steps.iter().map(|step| (step.object_type, step.object_id.as_str())).collect();
    assert_eq!(actual, expected);

    let cluster = steps.iter().find(|step| step.object_id == "cluster-123").unwrap();
    assert_eq!(cluster.object_name.as_deref(), Some("shared-autoscaling"));
    let pipeline = steps.iter().find(|step| step.object_id == "pipeline-7").unwrap();
    assert_eq!(pipeline.object_name.as_deref(), Some("nightly-refresh"));
}

#[test]
fn manifest_file_round_trips_through_the_loader() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manifest_path = temp_dir.path().join("workspace.yaml");
    std::fs::write(&manifest_path, include_str!("data/workspace_manifest.yaml")).unwrap();

    let manifest = load_manifest(&manifest_path).unwrap();
    assert_eq!(manifest, load_fixture());
}

#[test]
fn empty_sequencer_yields_no_steps() {
    let mut sequencer = MigrationSequencer::new();
    assert!(sequencer.generate_steps().unwrap().is_empty());
    assert!(sequencer.generate_steps().unwrap().is_empty());
}

#[test]
fn re_registration_never_duplicates_or_reorders() {
    let manifest = load_fixture();
    let mut once = MigrationSequencer::from_manifest(&manifest).unwrap();
    let baseline = once.generate_steps().unwrap();

    let mut twice = MigrationSequencer::from_manifest(&manifest).unwrap();
    twice.register_all(&manifest.registrations).unwrap();
    twice
        .register_cluster(&ClusterDescriptor::new("cluster-123", Some("renamed".into())))
        .unwrap();
    let repeated = twice.generate_steps().unwrap();

    assert_eq!(keys(&repeated), keys(&baseline));
    let cluster = repeated.iter().find(|step| step.object_id == "cluster-123").unwrap();
    assert_eq!(cluster.object_name.as_deref(), Some("renamed"));
}

#[test]
fn forward_reference_becomes_one_named_step() {
    let mut sequencer = MigrationSequencer::new();
    sequencer
        .register_reference(&reference((ObjectKind::Task, "1/load"), (ObjectKind::Table, "main.sales.orders")))
        .unwrap();
    sequencer.register_table(&TableDescriptor::new("main", "sales", "orders")).unwrap();

    let steps = sequencer.generate_steps().unwrap();
    assert_gap_free_and_unique(&steps);
    let tables: Vec<&MigrationStep> = steps.iter().filter(|step| step.object_type == ObjectKind::Table).collect();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].step_number, 2);
    assert_eq!(tables[0].object_name.as_deref(), Some("orders"));
}

#[test]
fn reference_cycles_terminate() {
    let mut sequencer = MigrationSequencer::new();
    let facts = [
        reference((ObjectKind::Table, "a.b.one"), (ObjectKind::Table, "a.b.two")),
        reference((ObjectKind::Table, "a.b.two"), (ObjectKind::Table, "a.b.three")),
        reference((ObjectKind::Table, "a.b.three"), (ObjectKind::Table, "a.b.one")),
        reference((ObjectKind::Table, "a.b.two"), (ObjectKind::Table, "a.b.one")),
    ];
    for fact in &facts {
        sequencer.register_reference(fact).unwrap();
    }

    let steps = sequencer.generate_steps().unwrap();
    assert_gap_free_and_unique(&steps);
    let ids: Vec<&str> = steps.iter().map(|step| step.object_id.as_str()).collect();
    assert_eq!(ids, vec!["a.b.one", "a.b.two", "a.b.three"]);
}

#[test]
fn replanning_only_appends_new_objects() {
    let task = TaskDescriptor::new("test-task").on_cluster("cluster-123");
    let job = JobDescriptor::new("1234", None).with_task(task.clone());
    let mut sequencer = MigrationSequencer::new();
    sequencer.register_workflow_task(&task, &job).unwrap();
    let first = sequencer.generate_steps().unwrap();

    let later = TaskDescriptor::new("publish").on_cluster("cluster-456").after("test-task");
    sequencer.register_workflow_task(&later, &job).unwrap();
    sequencer.register_table(&TableDescriptor::new("main", "sales", "orders")).unwrap();
    let second = sequencer.generate_steps().unwrap();

    assert_gap_free_and_unique(&second);
    assert_eq!(keys(&second[..first.len()]), keys(&first));
    assert_eq!(
        keys(&second[first.len()..]),
        vec![
            key(ObjectKind::Task, "1234/publish"),
            key(ObjectKind::Cluster, "cluster-456"),
            key(ObjectKind::Table, "main.sales.orders"),
            key(ObjectKind::Schema, "main.sales"),
            key(ObjectKind::Catalog, "main"),
        ]
    );
}

#[test]
fn replanning_matches_a_single_pass_over_the_same_facts() {
    let task = TaskDescriptor::new("t");
    let job = JobDescriptor::new("1", None).with_task(task.clone());
    let unrelated = ClusterDescriptor::new("unrelated", None);
    let pinned = reference((ObjectKind::Task, "1/t"), (ObjectKind::Cluster, "pinned"));

    let mut incremental = MigrationSequencer::new();
    incremental.register_workflow_task(&task, &job).unwrap();
    let first = incremental.generate_steps().unwrap();
    assert_eq!(keys(&first), vec![key(ObjectKind::Job, "1"), key(ObjectKind::Task, "1/t")]);
    incremental.register_cluster(&unrelated).unwrap();
    incremental.register_reference(&pinned).unwrap();
    let replanned = incremental.generate_steps().unwrap();

    let mut single = MigrationSequencer::new();
    single.register_workflow_task(&task, &job).unwrap();
    single.register_cluster(&unrelated).unwrap();
    single.register_reference(&pinned).unwrap();
    let one_pass = single.generate_steps().unwrap();

    let tail: Vec<(u32, &str)> = replanned[first.len()..]
        .iter()
        .map(|step| (step.step_number, step.object_id.as_str()))
        .collect();
    assert_eq!(tail, vec![(3, "pinned"), (4, "unrelated")]);
    assert_eq!(replanned, one_pass);
}

#[test]
fn tagged_registrations_dispatch_to_their_registrar() {
    let task = TaskDescriptor::new("test-task").on_cluster("cluster-123");
    let registrations = vec![
        Registration::Task {
            job: JobDescriptor::new("1234", Some("test-job".into())),
            task,
        },
        Registration::Cluster(ClusterDescriptor::new("cluster-123", Some("shared".into()))),
    ];
    let mut sequencer = MigrationSequencer::new();
    sequencer.register_all(&registrations).unwrap();

    let steps = sequencer.generate_steps().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[2].display_name(), "shared");
}
