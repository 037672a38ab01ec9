use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vigil_core::{
    EngineError, FeatureSwitch, HostGraph, ModuleCapabilities, ModuleRegistry, Orchestrator,
    OrchestratorState, ScanContext, ScanEvent, ScanMode, SessionStatus, ValidatorConfig,
    ValidatorModule, World,
};
use vigil_diagnostics::{DiagnosticRecord, ModuleId, Origin, RemediationError};
use vigil_model::{ContainerId, FieldPath, SceneGraph, Severity};
use vigil_test_utils::{
    diamond_world, door, door_types, door_world, lock, summarize, wide_world, EventLog, NoRoots,
    CODE_MESSAGE, DOOR_MESSAGE,
};
use vigil_traverse::{BatchSize, BatchingPriority, Step};

fn orchestrator(world: &World, config: ValidatorConfig) -> Orchestrator {
    Orchestrator::new(ModuleRegistry::with_defaults(world.features().clone()), config)
}

fn run_autorun(orch: &mut Orchestrator, world: &World) {
    while orch.tick(world).unwrap() != SessionStatus::Finished {}
}

#[derive(Default)]
struct Audit {
    logs: Vec<DiagnosticRecord>,
}

impl ValidatorModule for Audit {
    fn id(&self) -> ModuleId {
        ModuleId::from_static("Audit")
    }

    fn display_name(&self) -> &str {
        "Audit"
    }

    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::default().full_scan_only()
    }

    fn begin_scan(&mut self, _: &[ContainerId], _: BatchSize) {
        self.logs.clear();
    }

    fn resume(&mut self, _: &ScanContext<'_>) -> Step {
        self.logs.push(DiagnosticRecord::new(
            self.id(),
            Severity::Info,
            "audited",
            Origin::detached("audit"),
        ));
        Step::Complete
    }

    fn logs(&self) -> &[DiagnosticRecord] {
        &self.logs
    }
}

#[test]
fn test_field_condition_follows_value() {
    let (mut world, component) = door_world(false);
    let mut orch = orchestrator(&world, ValidatorConfig::default());

    orch.run_full_scan(&world).unwrap();
    assert_eq!(orch.records().len(), 1);
    assert_eq!(orch.records()[0].severity(), Severity::Error);
    assert_eq!(orch.records()[0].message(), DOOR_MESSAGE);
    assert_eq!(orch.counters().severity(Severity::Error), 1);

    world
        .graph_mut()
        .set_field(component, &FieldPath::field("ready"), true)
        .unwrap();
    orch.run_full_scan(&world).unwrap();
    assert!(orch.records().is_empty());
    assert_eq!(orch.counters().total(), 0);
}

#[test]
fn test_full_scan_is_idempotent() {
    let world = wide_world(3, 7);
    let mut orch = orchestrator(&world, ValidatorConfig::default());
    orch.run_full_scan(&world).unwrap();
    let first = summarize(orch.records());
    let counters = orch.counters().clone();
    orch.run_full_scan(&world).unwrap();
    assert_eq!(summarize(orch.records()), first);
    assert_eq!(orch.counters(), &counters);
}

#[test]
fn test_expected_findings_in_wide_world() {
    let world = wide_world(2, 6);
    let mut orch = orchestrator(&world, ValidatorConfig::default());
    orch.run_full_scan(&world).unwrap();
    let counters = orch.counters();
    // 14 doors not ready, 2 negative hinges, 4 missing components
    assert_eq!(counters.severity(Severity::Error), 18);
    assert_eq!(counters.severity(Severity::Warning), 2);
    assert_eq!(counters.scene("Main"), 10);
    assert_eq!(counters.scene("Side"), 10);
    assert_eq!(counters.module(&ModuleId::from_static("MissingComponent")), 4);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_batch_size_does_not_change_results(
        roots in 1usize..4,
        children in 0usize..12,
        priority in prop_oneof![
            Just(BatchingPriority::Low),
            Just(BatchingPriority::Medium),
            Just(BatchingPriority::VeryHigh),
            Just(BatchingPriority::Absolute),
        ],
    ) {
        let world = wide_world(roots, children);
        let mut full = orchestrator(&world, ValidatorConfig::default());
        full.run_full_scan(&world).unwrap();

        let mut sliced = orchestrator(&world, ValidatorConfig::default().with_batching(priority));
        run_autorun(&mut sliced, &world);

        prop_assert_eq!(summarize(sliced.records()), summarize(full.records()));
        prop_assert_eq!(sliced.counters(), full.counters());
    }
}

#[test]
fn test_module_results_visible_before_session_ends() {
    let world = wide_world(2, 6);
    let config = ValidatorConfig::default().with_batching(BatchingPriority::Low);
    let mut orch = orchestrator(&world, config);

    assert_eq!(orch.tick(&world).unwrap(), SessionStatus::Suspended);
    assert!(orch.records().is_empty());
    assert_eq!(orch.tick(&world).unwrap(), SessionStatus::Suspended);
    assert_eq!(orch.state(), OrchestratorState::Scanning);
    assert_eq!(orch.records().len(), 4);
    assert_eq!(orch.counters().severity(Severity::Error), 4);
}

#[test]
fn test_structural_change_discards_staged_results() {
    let mut world = wide_world(2, 6);
    let config = ValidatorConfig::default().with_batching(BatchingPriority::Low);
    let mut orch = orchestrator(&world, config);
    let log = EventLog::new();
    orch.subscribe(log.listener());

    orch.tick(&world).unwrap();
    orch.tick(&world).unwrap();
    assert_eq!(orch.records().len(), 4);

    let first_root = world.graph().roots()[0];
    world.graph_mut().destroy(first_root);
    orch.on_structural_change();
    assert_eq!(orch.state(), OrchestratorState::Idle);
    assert!(orch.records().is_empty());
    assert_eq!(log.count(|e| matches!(e, ScanEvent::Cancelled { generation: 1 })), 1);

    orch.run_full_scan(&world).unwrap();
    assert_eq!(orch.counters().module(&ModuleId::from_static("MissingComponent")), 2);
    assert_eq!(orch.counters().severity(Severity::Error), 9);
}

#[test]
fn test_new_request_supersedes_suspended_session() {
    let world = wide_world(3, 9);
    let config = ValidatorConfig::default().with_batching(BatchingPriority::Low);
    let mut orch = orchestrator(&world, config);
    let log = EventLog::new();
    orch.subscribe(log.listener());

    assert_eq!(orch.tick(&world).unwrap(), SessionStatus::Suspended);
    let generation = orch.run_full_scan(&world).unwrap();
    assert_eq!(generation, 2);

    let mut reference = orchestrator(&world, ValidatorConfig::default());
    reference.run_full_scan(&world).unwrap();
    assert_eq!(summarize(orch.records()), summarize(reference.records()));

    let events = log.events();
    assert!(events.contains(&ScanEvent::Cancelled { generation: 1 }));
    assert!(matches!(events.last(), Some(ScanEvent::Finished { generation: 2, .. })));
}

#[test]
fn test_autorun_skips_full_scan_only_modules() {
    let world = wide_world(1, 2);
    let registry = ModuleRegistry::with_defaults(world.features().clone())
        .with(Audit::default())
        .unwrap();
    let mut orch = Orchestrator::new(registry, ValidatorConfig::default());

    run_autorun(&mut orch, &world);
    assert_eq!(orch.counters().severity(Severity::Info), 0);

    orch.run_full_scan(&world).unwrap();
    assert_eq!(orch.counters().severity(Severity::Info), 1);

    // the next autorun session commits without the skipped module
    run_autorun(&mut orch, &world);
    assert_eq!(orch.counters().severity(Severity::Info), 0);
}

#[test]
fn test_autorun_disabled_stays_idle() {
    let (world, _) = door_world(false);
    let mut orch = orchestrator(&world, ValidatorConfig::default().with_autorun(false));
    assert_eq!(orch.tick(&world).unwrap(), SessionStatus::Idle);
    assert_eq!(orch.generation(), 0);
}

#[test]
fn test_fatal_preconditions() {
    let (world, _) = door_world(false);
    let mut empty = Orchestrator::new(ModuleRegistry::new(), ValidatorConfig::default());
    let err = empty.run_full_scan(&world).unwrap_err();
    assert!(matches!(err, EngineError::NoModules));
    assert!(err.is_fatal_precondition());

    let host = NoRoots(world);
    let mut orch = orchestrator(&host.0, ValidatorConfig::default());
    let err = orch.tick(&host).unwrap_err();
    assert!(matches!(err, EngineError::RootSetUnavailable));
    assert_eq!(orch.state(), OrchestratorState::Idle);
}

#[test]
fn test_feature_toggle_fix() {
    let (world, _) = door_world(true);
    let world = world.with_features(FeatureSwitch::new(false));
    let mut orch = orchestrator(&world, ValidatorConfig::default());
    orch.run_full_scan(&world).unwrap();

    assert_eq!(orch.records().len(), 1);
    assert_eq!(orch.records()[0].severity(), Severity::Warning);
    orch.apply_fix(0).unwrap();
    assert!(world.features().is_enabled());

    orch.run_full_scan(&world).unwrap();
    assert!(orch.records().is_empty());
    assert!(matches!(orch.apply_fix(0), Err(EngineError::RecordIndex(0))));
}

#[test]
fn test_apply_fix_without_action() {
    let (world, _) = door_world(false);
    let mut orch = orchestrator(&world, ValidatorConfig::default());
    orch.run_full_scan(&world).unwrap();
    let err = orch.apply_fix(0).unwrap_err();
    assert!(matches!(err, EngineError::Remediation(RemediationError::NoFix)));
}

#[test]
fn test_full_scan_events() {
    let (world, _) = door_world(false);
    let mut orch = orchestrator(&world, ValidatorConfig::default());
    let log = EventLog::new();
    orch.subscribe(log.listener());
    orch.run_full_scan(&world).unwrap();

    let events = log.events();
    assert_eq!(
        events.first(),
        Some(&ScanEvent::Started {
            generation: 1,
            mode: ScanMode::Full
        })
    );
    let fractions: Vec<f64> = events.iter().filter_map(ScanEvent::fraction).collect();
    assert_eq!(fractions, vec![0.25, 0.5, 0.75]);
    assert_eq!(log.count(|e| matches!(e, ScanEvent::ModuleCompleted { .. })), 3);
    assert_eq!(
        events.last(),
        Some(&ScanEvent::Finished {
            generation: 1,
            records: 1
        })
    );
}

#[test]
fn test_unsubscribe_and_dispose() {
    let (world, _) = door_world(false);
    let mut orch = orchestrator(&world, ValidatorConfig::default());
    let log = EventLog::new();
    let id = orch.subscribe(log.listener());
    assert!(orch.unsubscribe(id));
    assert!(!orch.unsubscribe(id));
    orch.run_full_scan(&world).unwrap();
    assert!(log.events().is_empty());

    orch.subscribe(log.listener());
    orch.dispose();
    orch.run_full_scan(&world).unwrap();
    assert!(log.events().is_empty());
}

#[test]
fn test_method_condition_uses_out_slots() {
    let mut graph = SceneGraph::new();
    let root = graph.add_root("Vault", "Main");
    graph.attach(root, lock("12", false)).unwrap();
    let child = graph.add_child(root, "Back").unwrap();
    graph.attach(child, lock("1234", true)).unwrap();
    let world = World::new(graph, door_types());

    let mut orch = orchestrator(&world, ValidatorConfig::default());
    orch.run_full_scan(&world).unwrap();
    assert_eq!(
        summarize(orch.records()),
        vec![
            ("ValidateInput".to_string(), Severity::Error, CODE_MESSAGE.to_string()),
            ("ValidateInput".to_string(), Severity::Warning, "Invalid Input".to_string()),
        ]
    );
}

#[test]
fn test_element_conditions_per_element() {
    let mut graph = SceneGraph::new();
    let root = graph.add_root("Hall", "Main");
    graph.attach(root, door(true, &[1, -1, -2, 4])).unwrap();
    let world = World::new(graph, door_types());

    let mut orch = orchestrator(&world, ValidatorConfig::default());
    orch.run_full_scan(&world).unwrap();
    let labels: Vec<&str> = orch.records().iter().map(|r| r.origin().label.as_str()).collect();
    assert_eq!(labels, vec!["Hall > Door.hinges.1", "Hall > Door.hinges.2"]);
}

#[test]
fn test_shared_and_cyclic_containers_validated_once() {
    let (world, shared) = diamond_world();
    let mut orch = orchestrator(&world, ValidatorConfig::default());
    orch.run_full_scan(&world).unwrap();
    assert_eq!(orch.records().len(), 1);
    assert_eq!(orch.records()[0].origin().container_id(), Some(shared));
}

#[test]
fn test_live_reevaluation() {
    let (mut world, component) = door_world(false);
    let mut orch = orchestrator(&world, ValidatorConfig::default());
    orch.run_full_scan(&world).unwrap();

    let updates = orch.reevaluate(component, &world);
    assert_eq!(updates.len(), 1);
    assert!(!updates[0].valid);

    world
        .graph_mut()
        .set_field(component, &FieldPath::field("ready"), true)
        .unwrap();
    let updates = orch.reevaluate(component, &world);
    assert!(updates[0].valid);
}

#[test]
fn test_filters_over_visible_records() {
    let world = wide_world(2, 3);
    let mut orch = orchestrator(&world, ValidatorConfig::default());
    orch.run_full_scan(&world).unwrap();
    let all = orch.records().len();
    assert_eq!(orch.filtered(&orch.pipeline()).len(), all);

    orch.config_mut().filters.set_severity(Severity::Error, false);
    let warnings = orch.filtered(&orch.pipeline());
    assert_eq!(warnings.len(), orch.counters().severity(Severity::Warning));

    orch.config_mut().filters.set_severity(Severity::Error, true);
    orch.config_mut().filters.set_scene("Side", false);
    assert_eq!(orch.filtered(&orch.pipeline()).len(), orch.counters().scene("Main"));

    orch.config_mut().filters.set_module("ValidateInput", false);
    let remaining = orch.filtered(&orch.pipeline());
    assert!(remaining.iter().all(|r| r.module().as_str() == "MissingComponent"));
}

#[test]
fn test_modules_and_scenes_registered_in_filters() {
    let world = wide_world(2, 1);
    let mut orch = orchestrator(&world, ValidatorConfig::default());
    assert!(orch.config().filters.modules.contains_key("ValidateInput"));
    assert!(orch.config().filters.scenes.is_empty());
    orch.run_full_scan(&world).unwrap();
    let scenes: Vec<&str> = orch.config().filters.scenes.keys().map(String::as_str).collect();
    assert_eq!(scenes, vec!["Main", "Side"]);
}
