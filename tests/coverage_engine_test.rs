// ==========================================
// Coverage engine integration tests
// ==========================================
// Scope: worked examples and bounds of compute_coverage
// ==========================================

mod helpers;

use brick_buildability::domain::PartKey;
use brick_buildability::engine::{CoverageEngine, EngineError};
use helpers::test_data_builder::{InventoryBuilder, SetBuilder};

// ==========================================
// Worked examples
// ==========================================

#[test]
fn test_partial_set_two_thirds_covered() {
    let requirements = SetBuilder::new().part("A", 0, 4).part("B", 1, 2).build();
    let inventory = InventoryBuilder::new().owns("A", 0, 4).owns("B", 1, 0).build();

    let report = CoverageEngine::compute_coverage("S-1", &requirements, &inventory).unwrap();

    assert_eq!(report.total_needed, 6);
    assert_eq!(report.total_have, 4);
    assert!((report.coverage - 0.6667).abs() < 1e-3);
    assert_eq!(report.coverage_percent(), 66.7);
    let b = report.line(&PartKey::new("B", 1)).unwrap();
    assert_eq!(b.short, 2);
    assert_eq!(report.missing_lines().len(), 1);
    assert!(!report.is_buildable());
}

#[test]
fn test_overstock_is_capped_per_line() {
    let requirements = SetBuilder::new().part("A", 0, 2).build();
    let inventory = InventoryBuilder::new().owns("A", 0, 10).build();

    let report = CoverageEngine::compute_coverage("S-2", &requirements, &inventory).unwrap();

    assert_eq!(report.total_have, 2);
    assert_eq!(report.coverage, 1.0);
    assert_eq!(report.lines[0].short, 0);
    assert!(report.is_buildable());
}

// ==========================================
// Properties over a grid of small quantities
// ==========================================

#[test]
fn test_coverage_bounds_and_shortfall_over_grid() {
    for needed_a in 0..4 {
        for needed_b in 0..4 {
            for have_a in 0..6 {
                for have_b in 0..6 {
                    let requirements = SetBuilder::new()
                        .part("A", 0, needed_a)
                        .part("B", 0, needed_b)
                        .build();
                    let inventory = InventoryBuilder::new()
                        .owns("A", 0, have_a)
                        .owns("B", 0, have_b)
                        .build();

                    let report =
                        CoverageEngine::compute_coverage("grid", &requirements, &inventory).unwrap();

                    assert!((0.0..=1.0).contains(&report.coverage));
                    assert!(report.total_have <= report.total_needed);
                    for line in &report.lines {
                        assert_eq!(line.short, (line.needed - line.have).max(0));
                    }
                    if have_a >= needed_a && have_b >= needed_b {
                        assert_eq!(report.coverage, 1.0);
                    }
                }
            }
        }
    }
}

#[test]
fn test_no_requirements_is_vacuously_complete() {
    let inventory = InventoryBuilder::new().owns("A", 0, 3).build();
    let report = CoverageEngine::compute_coverage("S-0", &[], &inventory).unwrap();

    assert_eq!(report.total_needed, 0);
    assert_eq!(report.coverage, 1.0);
    assert!(report.is_buildable());
}

#[test]
fn test_sorted_by_shortfall_does_not_touch_input_order() {
    let requirements = SetBuilder::new()
        .part("A", 0, 1)
        .part("B", 0, 5)
        .part("C", 0, 3)
        .build();

    let report = CoverageEngine::compute_coverage("S-3", &requirements, &[]).unwrap();

    let sorted: Vec<&str> = report
        .sorted_by_shortfall()
        .iter()
        .map(|l| l.part_key.part_num.as_str())
        .collect();
    assert_eq!(sorted, vec!["B", "C", "A"]);

    let original: Vec<&str> = report.lines.iter().map(|l| l.part_key.part_num.as_str()).collect();
    assert_eq!(original, vec!["A", "B", "C"]);
}

#[test]
fn test_negative_have_fails_loudly() {
    let requirements = SetBuilder::new().part("A", 0, 1).build();
    let inventory = InventoryBuilder::new().owns("A", 0, -1).build();

    let err = CoverageEngine::compute_coverage("S-4", &requirements, &inventory).unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn test_report_serializes_to_json() {
    let requirements = SetBuilder::new().part("3001", 4, 2).build();
    let report = CoverageEngine::compute_coverage("6020-1", &requirements, &[]).unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["set_id"], "6020-1");
    assert_eq!(value["lines"][0]["short"], 2);
    assert_eq!(value["lines"][0]["part_key"]["part_num"], "3001");
}
