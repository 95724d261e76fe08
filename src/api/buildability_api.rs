// ==========================================
// Brick Buildability - buildability API
// ==========================================
// Role: the single entry point a UI or CLI talks to
// - load a report (BOM + inventory fetched concurrently)
// - open a staging session, apply it
// Rule: a load superseded by a newer load for another set,
// or by cancel_loads, never publishes its result
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{BuildabilityConfigReader, EngineConfig};
use crate::domain::coverage::CoverageReport;
use crate::domain::lines::{aggregate_inventory, aggregate_requirements, InventoryLine, RequirementLine};
use crate::engine::{ApplyReport, CoverageEngine, FetchGuard, StagingSession};
use crate::provider::{InventoryProvider, RequirementsProvider};
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of `load_report`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Report for the set the caller is still looking at.
    Fresh(CoverageReport),
    /// A newer load or a cancel happened while fetching; discard.
    Superseded { set_id: String },
}

impl LoadOutcome {
    pub fn into_report(self) -> Option<CoverageReport> {
        match self {
            LoadOutcome::Fresh(report) => Some(report),
            LoadOutcome::Superseded { .. } => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, LoadOutcome::Superseded { .. })
    }
}

// ==========================================
// BuildabilityApi
// ==========================================
pub struct BuildabilityApi {
    requirements: Arc<dyn RequirementsProvider>,
    inventory: Arc<dyn InventoryProvider>,
    config: Arc<dyn BuildabilityConfigReader>,
    guard: FetchGuard,
}

impl BuildabilityApi {
    pub fn new(
        requirements: Arc<dyn RequirementsProvider>,
        inventory: Arc<dyn InventoryProvider>,
        config: Arc<dyn BuildabilityConfigReader>,
    ) -> Self {
        Self {
            requirements,
            inventory,
            config,
            guard: FetchGuard::new(),
        }
    }

    /// Fetch the BOM of `set_id` and the inventory, then compute coverage.
    ///
    /// # Returns
    /// - `Fresh(report)`: still the latest load
    /// - `Superseded`: a load for another set or `cancel_loads` happened
    ///   meanwhile; errors of superseded loads are discarded too
    #[instrument(skip(self), fields(generation = tracing::field::Empty))]
    pub async fn load_report(&self, set_id: &str) -> ApiResult<LoadOutcome> {
        let set_id = set_id.trim();
        if set_id.is_empty() {
            return Err(ApiError::InvalidInput("set_id is empty".to_string()));
        }

        let ticket = self.guard.begin(set_id);
        tracing::Span::current().record("generation", ticket.generation());

        let fetched = futures::try_join!(
            self.requirements.fetch_requirements(set_id),
            self.inventory.fetch_inventory()
        );

        if !ticket.is_current() {
            info!(set_id, "load superseded, result discarded");
            return Ok(LoadOutcome::Superseded {
                set_id: set_id.to_string(),
            });
        }

        let (requirements, inventory) = fetched?;
        let report = self.report_from(set_id, requirements, inventory)?;

        // the report was computed synchronously; check once more before publishing
        Ok(match ticket.publish(report) {
            Some(report) => LoadOutcome::Fresh(report),
            None => LoadOutcome::Superseded {
                set_id: set_id.to_string(),
            },
        })
    }

    /// Coverage over caller-supplied rows (aggregated here first).
    pub fn report_from(
        &self,
        set_id: &str,
        requirements: Vec<RequirementLine>,
        inventory: Vec<InventoryLine>,
    ) -> ApiResult<CoverageReport> {
        let requirements = aggregate_requirements(requirements);
        let inventory = aggregate_inventory(inventory);
        Ok(CoverageEngine::compute_coverage(
            set_id,
            &requirements,
            &inventory,
        )?)
    }

    /// Open a staging session on `report` with the configured floor.
    pub async fn begin_editing(&self, report: CoverageReport) -> ApiResult<StagingSession> {
        let config = self.engine_config().await?;
        Ok(StagingSession::with_floor(report, config.staging_floor)?)
    }

    /// Send the session's diff to the inventory provider.
    ///
    /// Per-op failures (including `Locked`) are in the returned report,
    /// not in `Err`.
    pub async fn apply(&self, session: &mut StagingSession) -> ApiResult<ApplyReport> {
        Ok(session.apply(self.inventory.as_ref()).await?)
    }

    /// Supersede every in-flight load (e.g. the caller navigated away).
    pub fn cancel_loads(&self) {
        self.guard.cancel();
    }

    pub async fn engine_config(&self) -> ApiResult<EngineConfig> {
        self.config
            .load_engine_config()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }
}
