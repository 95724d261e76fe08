// ==========================================
// Brick Buildability - coverage report
// ==========================================
// Derived data owned by the engine. Views below never
// mutate the report; callers that need another order
// sort a view.
// ==========================================

use crate::domain::types::PartKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coverage of one required part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageLine {
    pub part_key: PartKey,
    pub needed: i64,
    pub have: i64,
    /// max(needed - have, 0)
    pub short: i64,
}

impl CoverageLine {
    pub fn new(part_key: PartKey, needed: i64, have: i64) -> Self {
        Self {
            part_key,
            needed,
            have,
            short: needed.saturating_sub(have).max(0),
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.short == 0
    }

    /// Owned quantity counted towards coverage; overstock is not counted.
    pub fn capped_have(&self) -> i64 {
        self.have.min(self.needed)
    }
}

/// Buildability report of one set against one inventory snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub set_id: String,
    pub total_needed: i64,
    /// Sum of min(have, needed) over all lines.
    pub total_have: i64,
    /// total_have / total_needed in [0, 1]; 1.0 when nothing is needed.
    pub coverage: f64,
    /// Same order as the requirements the report was computed from.
    pub lines: Vec<CoverageLine>,
    pub generated_at: DateTime<Utc>,
}

impl CoverageReport {
    /// Lines still short, in report order.
    pub fn missing_lines(&self) -> Vec<&CoverageLine> {
        self.lines.iter().filter(|l| !l.is_satisfied()).collect()
    }

    /// Lines ordered by shortfall (largest first), ties by part key.
    pub fn sorted_by_shortfall(&self) -> Vec<&CoverageLine> {
        let mut lines: Vec<&CoverageLine> = self.lines.iter().collect();
        lines.sort_by(|a, b| {
            b.short
                .cmp(&a.short)
                .then_with(|| a.part_key.cmp(&b.part_key))
        });
        lines
    }

    /// Saturates at `i64::MAX`.
    pub fn total_short(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |acc, l| acc.saturating_add(l.short))
    }

    /// Coverage as a percentage, one decimal place.
    pub fn coverage_percent(&self) -> f64 {
        (self.coverage * 1000.0).round() / 10.0
    }

    pub fn is_buildable(&self) -> bool {
        self.total_short() == 0
    }

    /// Owned quantity recorded for a key; 0 for keys outside the report.
    pub fn have_for(&self, key: &PartKey) -> i64 {
        self.lines
            .iter()
            .find(|l| &l.part_key == key)
            .map(|l| l.have)
            .unwrap_or(0)
    }

    pub fn line(&self, key: &PartKey) -> Option<&CoverageLine> {
        self.lines.iter().find(|l| &l.part_key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(lines: Vec<CoverageLine>) -> CoverageReport {
        let total_needed: i64 = lines.iter().map(|l| l.needed).sum();
        let total_have: i64 = lines.iter().map(|l| l.capped_have()).sum();
        CoverageReport {
            set_id: "10696-1".to_string(),
            total_needed,
            total_have,
            coverage: if total_needed == 0 {
                1.0
            } else {
                total_have as f64 / total_needed as f64
            },
            lines,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_coverage_line_short_never_negative() {
        let line = CoverageLine::new(PartKey::new("3001", 0), 2, 10);
        assert_eq!(line.short, 0);
        assert_eq!(line.capped_have(), 2);
        assert!(line.is_satisfied());
    }

    #[test]
    fn test_report_views() {
        let r = report(vec![
            CoverageLine::new(PartKey::new("3001", 0), 4, 4),
            CoverageLine::new(PartKey::new("3003", 1), 2, 0),
            CoverageLine::new(PartKey::new("3002", 1), 5, 2),
        ]);

        let missing: Vec<_> = r.missing_lines().iter().map(|l| l.part_key.clone()).collect();
        assert_eq!(missing, vec![PartKey::new("3003", 1), PartKey::new("3002", 1)]);

        let sorted = r.sorted_by_shortfall();
        assert_eq!(sorted[0].part_key, PartKey::new("3002", 1));
        assert_eq!(sorted[1].part_key, PartKey::new("3003", 1));

        assert_eq!(r.total_short(), 5);
        assert!(!r.is_buildable());
        assert_eq!(r.have_for(&PartKey::new("3002", 1)), 2);
        assert_eq!(r.have_for(&PartKey::new("9999", 1)), 0);
        assert_eq!(r.coverage_percent(), 54.5);
    }

    #[test]
    fn test_total_short_saturates() {
        let r = CoverageReport {
            set_id: "huge-1".to_string(),
            total_needed: i64::MAX,
            total_have: 0,
            coverage: 0.0,
            lines: vec![
                CoverageLine::new(PartKey::new("3001", 0), i64::MAX, 0),
                CoverageLine::new(PartKey::new("3002", 0), i64::MAX, 0),
            ],
            generated_at: Utc::now(),
        };
        assert_eq!(r.total_short(), i64::MAX);
        assert!(!r.is_buildable());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let r = report(vec![CoverageLine::new(PartKey::new("3001", 0), 1, 0)]);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["set_id"], "10696-1");
        assert_eq!(json["lines"][0]["short"], 1);
        assert_eq!(json["lines"][0]["part_key"]["part_num"], "3001");
    }
}
