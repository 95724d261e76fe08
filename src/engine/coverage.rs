// ==========================================
// Brick Buildability - coverage engine
// ==========================================
// Joins a set's requirements against an inventory snapshot.
// Rule: stateless, no side effects, no I/O
// ==========================================
// Input: requirement lines + inventory lines
// Output: CoverageReport, lines in requirement order
// ==========================================

use crate::domain::coverage::{CoverageLine, CoverageReport};
use crate::domain::lines::{InventoryLine, RequirementLine};
use crate::domain::types::PartKey;
use crate::engine::error::{EngineError, EngineResult};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

// ==========================================
// CoverageEngine
// ==========================================
pub struct CoverageEngine;

impl CoverageEngine {
    /// Compute the buildability report of a set.
    ///
    /// # Rules
    /// - a part absent from the inventory has `have = 0`
    /// - inventory lines for parts the set does not need are ignored
    /// - `short = max(needed - have, 0)`
    /// - `total_have` counts at most `needed` per line, so overstock of one
    ///   part never hides shortfall of another
    /// - `coverage = total_have / total_needed`, or 1.0 when nothing is needed
    ///
    /// # Errors
    /// `InvalidInput` for negative quantities, empty part numbers, a key
    /// repeated within either input, or totals that overflow `i64`.
    /// Inputs are never clamped.
    #[instrument(skip(set_id, requirements, inventory), fields(
        set_id = %set_id,
        requirement_count = requirements.len(),
        inventory_count = inventory.len()
    ))]
    pub fn compute_coverage(
        set_id: &str,
        requirements: &[RequirementLine],
        inventory: &[InventoryLine],
    ) -> EngineResult<CoverageReport> {
        let owned = Self::index_inventory(inventory)?;

        let mut seen: HashSet<&PartKey> = HashSet::with_capacity(requirements.len());
        let mut lines = Vec::with_capacity(requirements.len());
        let mut total_needed: i64 = 0;
        let mut total_have: i64 = 0;

        for req in requirements {
            Self::check_key(&req.part_key, "requirements")?;
            if req.needed < 0 {
                return Err(EngineError::InvalidInput(format!(
                    "negative needed quantity {} for {}",
                    req.needed, req.part_key
                )));
            }
            if !seen.insert(&req.part_key) {
                return Err(EngineError::InvalidInput(format!(
                    "duplicate requirement for {}; rows must be aggregated first",
                    req.part_key
                )));
            }

            let have = owned.get(&req.part_key).copied().unwrap_or(0);
            let line = CoverageLine::new(req.part_key.clone(), req.needed, have);
            total_needed = Self::add_total(total_needed, line.needed, "needed", set_id)?;
            total_have = Self::add_total(total_have, line.capped_have(), "owned", set_id)?;
            lines.push(line);
        }

        let coverage = Self::coverage_ratio(total_have, total_needed);

        debug!(
            total_needed,
            total_have,
            coverage,
            missing = lines.iter().filter(|l| l.short > 0).count(),
            "coverage computed"
        );

        Ok(CoverageReport {
            set_id: set_id.to_string(),
            total_needed,
            total_have,
            coverage,
            lines,
            generated_at: Utc::now(),
        })
    }

    /// Ratio clamped to [0, 1]; vacuously 1.0 when nothing is needed.
    pub fn coverage_ratio(total_have: i64, total_needed: i64) -> f64 {
        if total_needed == 0 {
            return 1.0;
        }
        (total_have as f64 / total_needed as f64).clamp(0.0, 1.0)
    }

    fn add_total(total: i64, qty: i64, what: &str, set_id: &str) -> EngineResult<i64> {
        total.checked_add(qty).ok_or_else(|| {
            EngineError::InvalidInput(format!("total {} quantity of {} overflows", what, set_id))
        })
    }

    fn index_inventory(inventory: &[InventoryLine]) -> EngineResult<HashMap<&PartKey, i64>> {
        let mut owned = HashMap::with_capacity(inventory.len());
        for line in inventory {
            Self::check_key(&line.part_key, "inventory")?;
            if line.have < 0 {
                return Err(EngineError::InvalidInput(format!(
                    "negative owned quantity {} for {}",
                    line.have, line.part_key
                )));
            }
            if owned.insert(&line.part_key, line.have).is_some() {
                return Err(EngineError::InvalidInput(format!(
                    "duplicate inventory entry for {}; rows must be aggregated first",
                    line.part_key
                )));
            }
        }
        Ok(owned)
    }

    fn check_key(key: &PartKey, source: &str) -> EngineResult<()> {
        if key.is_well_formed() {
            Ok(())
        } else {
            Err(EngineError::InvalidInput(format!(
                "empty part number in {} (color {})",
                source, key.color_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(part: &str, color: i64, needed: i64) -> RequirementLine {
        RequirementLine::new(part, color, needed)
    }

    fn inv(part: &str, color: i64, have: i64) -> InventoryLine {
        InventoryLine::new(part, color, have)
    }

    #[test]
    fn test_partial_coverage() {
        let report = CoverageEngine::compute_coverage(
            "S-1",
            &[req("A", 0, 4), req("B", 1, 2)],
            &[inv("A", 0, 4), inv("B", 1, 0)],
        )
        .unwrap();

        assert_eq!(report.total_needed, 6);
        assert_eq!(report.total_have, 4);
        assert!((report.coverage - 4.0 / 6.0).abs() < 1e-9);
        assert_eq!(report.lines[1].short, 2);
        assert_eq!(report.lines[0].short, 0);
    }

    #[test]
    fn test_overstock_is_capped() {
        let report =
            CoverageEngine::compute_coverage("S-2", &[req("A", 0, 2)], &[inv("A", 0, 10)]).unwrap();

        assert_eq!(report.total_have, 2);
        assert_eq!(report.coverage, 1.0);
        assert_eq!(report.lines[0].short, 0);
        assert_eq!(report.lines[0].have, 10);
    }

    #[test]
    fn test_overstock_does_not_mask_shortfall() {
        let report = CoverageEngine::compute_coverage(
            "S-3",
            &[req("A", 0, 2), req("B", 0, 2)],
            &[inv("A", 0, 50)],
        )
        .unwrap();

        assert_eq!(report.total_have, 2);
        assert_eq!(report.coverage, 0.5);
    }

    #[test]
    fn test_empty_requirements_is_vacuously_buildable() {
        let report = CoverageEngine::compute_coverage("S-4", &[], &[inv("A", 0, 3)]).unwrap();
        assert_eq!(report.total_needed, 0);
        assert_eq!(report.coverage, 1.0);
        assert!(report.lines.is_empty());
    }

    #[test]
    fn test_zero_needed_lines_only() {
        let report =
            CoverageEngine::compute_coverage("S-5", &[req("A", 0, 0)], &[]).unwrap();
        assert_eq!(report.coverage, 1.0);
        assert_eq!(report.lines[0].short, 0);
    }

    #[test]
    fn test_unrelated_inventory_is_ignored() {
        let report = CoverageEngine::compute_coverage(
            "S-6",
            &[req("A", 0, 1)],
            &[inv("Z", 9, 100), inv("A", 1, 5)],
        )
        .unwrap();

        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].have, 0);
        assert_eq!(report.coverage, 0.0);
    }

    #[test]
    fn test_requirement_order_is_preserved() {
        let report = CoverageEngine::compute_coverage(
            "S-7",
            &[req("C", 0, 1), req("A", 0, 1), req("B", 0, 1)],
            &[],
        )
        .unwrap();

        let order: Vec<&str> = report.lines.iter().map(|l| l.part_key.part_num.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_negative_quantities_are_rejected() {
        let err = CoverageEngine::compute_coverage("S-8", &[req("A", 0, -1)], &[]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = CoverageEngine::compute_coverage("S-8", &[req("A", 0, 1)], &[inv("A", 0, -3)])
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let err = CoverageEngine::compute_coverage(
            "S-9",
            &[req("A", 0, 1), req("A", 0, 2)],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = CoverageEngine::compute_coverage(
            "S-9",
            &[req("A", 0, 1)],
            &[inv("A", 0, 1), inv("A", 0, 1)],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_part_num_is_rejected() {
        let err = CoverageEngine::compute_coverage("S-10", &[req(" ", 0, 1)], &[]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        let err = CoverageEngine::compute_coverage(
            "S-11",
            &[req("A", 0, i64::MAX), req("B", 0, 1)],
            &[inv("A", 0, i64::MAX), inv("B", 0, 1)],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_single_huge_line_is_fine() {
        let report =
            CoverageEngine::compute_coverage("S-12", &[req("A", 0, i64::MAX)], &[inv("A", 0, 1)])
                .unwrap();
        assert_eq!(report.total_needed, i64::MAX);
        assert_eq!(report.lines[0].short, i64::MAX - 1);
        assert!(report.coverage >= 0.0 && report.coverage <= 1.0);
    }

    #[test]
    fn test_coverage_ratio_bounds() {
        assert_eq!(CoverageEngine::coverage_ratio(0, 0), 1.0);
        assert_eq!(CoverageEngine::coverage_ratio(0, 7), 0.0);
        assert_eq!(CoverageEngine::coverage_ratio(7, 7), 1.0);
    }
}
