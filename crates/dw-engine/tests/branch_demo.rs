//! End-to-end checks over the branch supply demo.

use std::path::Path;

use dw_engine::{
    DesignEngine, DetectionConfig, DimensionChange, DimensionProperty, EngineConfig, EndPoint,
    IssueCode, Severity,
};
use dw_model::{EntitySnapshot, FittingType, load_snapshot};

fn demo() -> EntitySnapshot {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/branch_system.yaml");
    load_snapshot(&path).unwrap_or_else(|e| panic!("Failed to load demo: {e}"))
}

#[test]
fn branch_meets_trunk_with_an_elbow() {
    let snapshot = demo();
    let engine = DesignEngine::default();

    let found = engine.detect_connections(&snapshot, "branch-n");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].existing_duct.entity_id, "trunk-1");
    assert_eq!(found[0].existing_duct.end_point, EndPoint::End);
    assert_eq!(found[0].fitting_type, FittingType::Elbow);
}

#[test]
fn junction_mode_reports_a_tee() {
    let snapshot = demo();
    let engine = DesignEngine::new(EngineConfig {
        detection: DetectionConfig {
            junction_classification: true,
            ..DetectionConfig::default()
        },
        ..EngineConfig::default()
    });

    let found = engine.detect_connections(&snapshot, "branch-n");
    let ids: Vec<&str> = found.iter().map(|c| c.existing_duct.entity_id.as_str()).collect();
    assert_eq!(ids, ["branch-s", "trunk-1"]);
    assert!(found.iter().all(|c| c.fitting_type == FittingType::Tee));
}

#[test]
fn flows_through_the_demo() {
    let snapshot = demo();
    let mut engine = DesignEngine::default();
    let flows = engine.calculate_flows(&snapshot);

    assert_eq!(flows.len(), 3);
    assert_eq!(flows["branch-n"], 200.0);
    assert_eq!(flows["branch-s"], 150.0);
    // The AHU is a degree-1 leaf and releases the trunk before the branches
    // reach the tee.
    assert_eq!(flows["trunk-1"], 0.0);
}

#[test]
fn ahu_is_undersized_for_connected_diffusers() {
    let snapshot = demo();
    let mut engine = DesignEngine::default();
    let issues = engine.system_capacity_report(&snapshot);

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].entity_id, "ahu-1");
    assert_eq!(issues[0].code, IssueCode::CapacityExceeded);
    assert_eq!(
        issues[0].message,
        "System load (350 CFM) exceeds ahu capacity (300 CFM) by 16.7%"
    );
}

#[test]
fn trunk_change_reaches_terminals() {
    let snapshot = demo();
    let mut engine = DesignEngine::default();

    let affected = engine.affected_entities(&snapshot, "trunk-1");
    assert_eq!(affected.directly_affected.len(), 2);
    assert!(affected.directly_affected.iter().any(|id| id == "tee-1"));
    assert_eq!(affected.indirectly_affected.len(), 4);
    assert!(!affected.all_affected.iter().any(|id| id == "office"));
    assert_eq!(affected.paths["diffuser-n"].len(), 4);

    let change = DimensionChange::new("trunk-1", DimensionProperty::Airflow, 350.0, 156_000.0);
    let result = engine.apply_dimension_change(&snapshot, &change);
    assert_eq!(result.updated_entity_ids.len(), 6);
    assert_eq!(result.validation_issues.len(), 2);
    assert!(
        result
            .validation_issues
            .iter()
            .all(|i| i.severity == Severity::Error)
    );

    // Served from one cached graph.
    assert_eq!(engine.cache().len(), 1);
}

#[test]
fn batch_over_both_branches() {
    let snapshot = demo();
    let mut engine = DesignEngine::default();
    let changes = [
        DimensionChange::new("branch-n", DimensionProperty::Diameter, 8.0, 10.0),
        DimensionChange::new("branch-s", DimensionProperty::Diameter, 8.0, 10.0),
    ];
    let result = engine.batch_update(&snapshot, &changes);

    assert!(result.validation_issues.is_empty());
    assert!(result.undo_group_id.starts_with("batch-"));
    let mut ids = result.updated_entity_ids.clone();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), result.updated_entity_ids.len());
    assert!(ids.iter().any(|id| id == "tee-1"));
}
