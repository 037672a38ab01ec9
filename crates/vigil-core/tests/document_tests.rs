use vigil_core::{ModuleRegistry, Orchestrator, SceneDocument, ValidatorConfig};
use vigil_model::Severity;

const SCENE: &str = r#"{
    "types": [{
        "name": "Spawner",
        "fields": [
            { "name": "enabled", "type": "bool" },
            { "name": "count", "type": "int",
              "annotations": [{ "kind": "validate_input", "condition": "enabled",
                                "message": "spawner is off", "severity": "warning" }] },
            { "name": "waves", "type": "list",
              "annotations": [{ "kind": "validate_input", "condition": "false",
                                "applies_to": "elements" }] }
        ]
    }],
    "containers": [
        { "name": "Arena", "group": "Level1",
          "components": [{ "$type": "Spawner", "enabled": false, "count": 3, "waves": [1, 2] }],
          "children": [{ "name": "Broken", "components": [{ "missing": "OldSpawner" }] }] },
        { "name": "Menu", "group": "Level2" }
    ],
    "features_enabled": false
}"#;

#[test]
fn test_scan_from_document() {
    let world = SceneDocument::from_json(SCENE).unwrap().into_world().unwrap();
    let registry = ModuleRegistry::with_defaults(world.features().clone());
    let mut orch = Orchestrator::new(registry, ValidatorConfig::default());
    orch.run_full_scan(&world).unwrap();

    let counters = orch.counters();
    // missing component, two failing wave elements
    assert_eq!(counters.severity(Severity::Error), 3);
    // spawner off, features disabled
    assert_eq!(counters.severity(Severity::Warning), 2);
    assert_eq!(counters.scene("Level1"), 4);
    assert_eq!(counters.scene("Level2"), 0);
    assert!(orch.records().iter().any(|r| r.message() == "spawner is off"));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    std::fs::write(&path, SCENE).unwrap();
    let doc = SceneDocument::load(&path).unwrap();
    assert_eq!(doc.types.len(), 1);
    assert_eq!(doc.containers.len(), 2);
    assert!(!doc.features_enabled);
}
