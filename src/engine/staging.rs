// ==========================================
// Brick Buildability - staging session
// ==========================================
// Local overlay of proposed owned quantities on top of one
// CoverageReport. stage() is pure in-memory arithmetic; the
// only I/O is apply().
// ==========================================
// States: ACTIVE -> APPLYING -> CONSUMED (terminal)
// ==========================================

use crate::domain::coverage::{CoverageLine, CoverageReport};
use crate::domain::reconciliation::ReconciliationOp;
use crate::domain::types::{PartKey, SessionState};
use crate::engine::coverage::CoverageEngine;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::reconcile::{apply_ops, ApplyReport};
use crate::provider::InventoryProvider;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Default lower bound for staged quantities.
pub const DEFAULT_STAGING_FLOOR: i64 = 0;

// ==========================================
// StagingSession
// ==========================================
#[derive(Debug, Clone)]
pub struct StagingSession {
    session_id: String,
    report: CoverageReport,
    /// Original owned quantity per key; keys outside the report default to 0.
    baseline: HashMap<PartKey, i64>,
    overlay: HashMap<PartKey, i64>,
    /// Staged keys that are not lines of the report, in first-staged order.
    extra_keys: Vec<PartKey>,
    floor: i64,
    state: SessionState,
    created_at: DateTime<Utc>,
}

impl StagingSession {
    /// Open a session over a report with the default floor.
    pub fn new(report: CoverageReport) -> Self {
        let baseline = report
            .lines
            .iter()
            .map(|l| (l.part_key.clone(), l.have))
            .collect();

        Self {
            session_id: Uuid::new_v4().to_string(),
            report,
            baseline,
            overlay: HashMap::new(),
            extra_keys: Vec::new(),
            floor: DEFAULT_STAGING_FLOOR,
            state: SessionState::Active,
            created_at: Utc::now(),
        }
    }

    /// Open a session with a custom floor; a negative floor is rejected.
    pub fn with_floor(report: CoverageReport, floor: i64) -> EngineResult<Self> {
        if floor < 0 {
            return Err(EngineError::InvalidInput(format!(
                "staging floor must be >= 0, got {}",
                floor
            )));
        }
        let mut session = Self::new(report);
        session.floor = floor;
        Ok(session)
    }

    // ==========================================
    // Accessors
    // ==========================================

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn floor(&self) -> i64 {
        self.floor
    }

    pub fn report(&self) -> &CoverageReport {
        &self.report
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn original_have(&self, key: &PartKey) -> i64 {
        self.baseline.get(key).copied().unwrap_or(0)
    }

    /// Staged value if any, otherwise the original quantity.
    pub fn staged_have(&self, key: &PartKey) -> i64 {
        self.overlay
            .get(key)
            .copied()
            .unwrap_or_else(|| self.original_have(key))
    }

    pub fn has_changes(&self) -> bool {
        !self.diff().is_empty()
    }

    // ==========================================
    // Editing
    // ==========================================

    /// Add `delta` to the staged quantity of a key.
    ///
    /// `new = max(current, 0) + delta`, then raised to the floor.
    /// Calls apply in order; the last write for a key wins.
    ///
    /// # Returns
    /// The new staged quantity.
    pub fn stage(&mut self, key: &PartKey, delta: i64) -> EngineResult<i64> {
        self.ensure_state(SessionState::Active)?;
        if !key.is_well_formed() {
            return Err(EngineError::InvalidInput(format!(
                "cannot stage empty part number (color {})",
                key.color_id
            )));
        }

        let current = self.staged_have(key).max(0);
        let next = current.saturating_add(delta).max(self.floor);

        if self.report.line(key).is_none() && !self.extra_keys.contains(key) {
            self.extra_keys.push(key.clone());
        }
        self.overlay.insert(key.clone(), next);

        debug!(
            session_id = %self.session_id,
            part_key = %key,
            delta,
            staged = next,
            "staged"
        );
        Ok(next)
    }

    /// Stage an absolute quantity for a key.
    pub fn set_quantity(&mut self, key: &PartKey, quantity: i64) -> EngineResult<i64> {
        let current = self.staged_have(key).max(0);
        self.stage(key, quantity.saturating_sub(current))
    }

    /// Drop the staged value of one key.
    pub fn reset(&mut self, key: &PartKey) -> EngineResult<()> {
        self.ensure_state(SessionState::Active)?;
        self.overlay.remove(key);
        self.extra_keys.retain(|k| k != key);
        Ok(())
    }

    /// Discard all staged edits; the session cannot be used afterwards.
    pub fn cancel(&mut self) -> EngineResult<()> {
        self.ensure_state(SessionState::Active)?;
        self.overlay.clear();
        self.extra_keys.clear();
        self.state = SessionState::Consumed;
        debug!(session_id = %self.session_id, "staging session cancelled");
        Ok(())
    }

    // ==========================================
    // Diff
    // ==========================================

    /// One op per key whose staged value differs from the original.
    ///
    /// Keys are emitted in report order, then staged extra keys in the
    /// order they were first staged.
    pub fn diff(&self) -> Vec<ReconciliationOp> {
        self.ordered_keys()
            .filter_map(|key| {
                let staged = self.overlay.get(key)?;
                ReconciliationOp::from_delta(key.clone(), staged - self.original_have(key))
            })
            .collect()
    }

    /// Report recomputed with staged quantities, for previewing edits.
    pub fn preview(&self) -> CoverageReport {
        rebuild_report(&self.report, |key| self.staged_have(key))
    }

    fn ordered_keys(&self) -> impl Iterator<Item = &PartKey> {
        self.report
            .lines
            .iter()
            .map(|l| &l.part_key)
            .chain(self.extra_keys.iter())
    }

    // ==========================================
    // Apply
    // ==========================================

    /// Send the diff to the inventory provider, one op at a time.
    ///
    /// The session is consumed afterwards whatever the outcome. Per-op
    /// failures are reported in the `ApplyReport`, not as an `Err`; use
    /// [`StagingSession::retry_session`] to keep the edits that did not go
    /// through. If the returned future is dropped mid-way the session stays
    /// `APPLYING` and accepts no further edits.
    #[instrument(skip(self, provider), fields(session_id = %self.session_id, set_id = %self.report.set_id))]
    pub async fn apply(&mut self, provider: &dyn InventoryProvider) -> EngineResult<ApplyReport> {
        self.ensure_state(SessionState::Active)?;
        self.state = SessionState::Applying;

        let ops = self.diff();
        let started_at = Utc::now();
        let outcomes = apply_ops(&ops, provider).await;
        self.state = SessionState::Consumed;

        let report = ApplyReport {
            session_id: self.session_id.clone(),
            set_id: self.report.set_id.clone(),
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            ops = report.outcomes.len(),
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            "staging session applied"
        );
        Ok(report)
    }

    /// New active session holding the edits an apply could not commit.
    ///
    /// The baseline takes the authoritative quantities returned by the
    /// successful ops; the overlay keeps the staged values of the failed
    /// ones. Returns `None` when nothing failed.
    pub fn retry_session(&self, applied: &ApplyReport) -> EngineResult<Option<StagingSession>> {
        self.ensure_state(SessionState::Consumed)?;
        if applied.session_id != self.session_id {
            return Err(EngineError::InvalidInput(format!(
                "apply report {} does not belong to session {}",
                applied.session_id, self.session_id
            )));
        }
        if applied.is_complete() {
            return Ok(None);
        }

        let mut baseline = self.baseline.clone();
        for outcome in applied.succeeded() {
            if let Ok(line) = &outcome.result {
                baseline.insert(line.part_key.clone(), line.have);
            }
        }

        let mut overlay = HashMap::new();
        let mut extra_keys = Vec::new();
        for outcome in applied.failed() {
            let key = outcome.part_key();
            overlay.insert(key.clone(), self.staged_have(key));
            if self.report.line(key).is_none() {
                extra_keys.push(key.clone());
            }
        }

        let report = rebuild_report(&self.report, |key| {
            baseline.get(key).copied().unwrap_or(0)
        });

        Ok(Some(StagingSession {
            session_id: Uuid::new_v4().to_string(),
            report,
            baseline,
            overlay,
            extra_keys,
            floor: self.floor,
            state: SessionState::Active,
            created_at: Utc::now(),
        }))
    }

    fn ensure_state(&self, expected: SessionState) -> EngineResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EngineError::SessionState {
                session_id: self.session_id.clone(),
                expected,
                actual: self.state,
            })
        }
    }
}

/// Same lines and order as `report`, with owned quantities from `have_of`.
fn rebuild_report<F>(report: &CoverageReport, have_of: F) -> CoverageReport
where
    F: Fn(&PartKey) -> i64,
{
    let lines: Vec<CoverageLine> = report
        .lines
        .iter()
        .map(|l| CoverageLine::new(l.part_key.clone(), l.needed, have_of(&l.part_key)))
        .collect();
    let total_needed = lines
        .iter()
        .fold(0i64, |acc, l| acc.saturating_add(l.needed));
    let total_have = lines
        .iter()
        .fold(0i64, |acc, l| acc.saturating_add(l.capped_have().max(0)));

    CoverageReport {
        set_id: report.set_id.clone(),
        total_needed,
        total_have,
        coverage: CoverageEngine::coverage_ratio(total_have, total_needed),
        lines,
        generated_at: Utc::now(),
    }
}
