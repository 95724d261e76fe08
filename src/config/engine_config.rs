// ==========================================
// Brick Buildability - resolved settings
// ==========================================

use crate::domain::coverage::{CoverageLine, CoverageReport};
use crate::engine::staging::DEFAULT_STAGING_FLOOR;
use crate::provider::http::DEFAULT_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_REPORT_SORT: ReportSort = ReportSort::RequirementOrder;

/// Line order for printed reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSort {
    /// As listed in the set's parts list
    RequirementOrder,
    /// Largest shortfall first
    Shortfall,
}

impl ReportSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSort::RequirementOrder => "requirement_order",
            ReportSort::Shortfall => "shortfall",
        }
    }

    /// Lines of `report` in this order.
    pub fn order<'a>(&self, report: &'a CoverageReport) -> Vec<&'a CoverageLine> {
        match self {
            ReportSort::RequirementOrder => report.lines.iter().collect(),
            ReportSort::Shortfall => report.sorted_by_shortfall(),
        }
    }
}

impl fmt::Display for ReportSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "requirement_order" | "requirements" | "input" => Ok(ReportSort::RequirementOrder),
            "shortfall" | "short" => Ok(ReportSort::Shortfall),
            other => Err(format!("unknown report sort: {}", other)),
        }
    }
}

/// Settings after defaults are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub staging_floor: i64,
    pub provider_base_url: Option<String>,
    pub provider_timeout_ms: u64,
    pub report_sort: ReportSort,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            staging_floor: DEFAULT_STAGING_FLOOR,
            provider_base_url: None,
            provider_timeout_ms: DEFAULT_TIMEOUT_MS,
            report_sort: DEFAULT_REPORT_SORT,
        }
    }
}
