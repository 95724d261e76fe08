// ==========================================
// Brick Buildability - reconciliation
// ==========================================
// Runs add/decrement ops against the inventory provider.
// Rule: strictly sequential; a failed op never stops the
// remaining ones; no retries (a blind retried decrement
// could apply twice)
// ==========================================

use crate::domain::lines::InventoryLine;
use crate::domain::reconciliation::ReconciliationOp;
use crate::domain::types::{OpKind, PartKey};
use crate::provider::error::ProviderError;
use crate::provider::InventoryProvider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Result of one reconciliation op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpOutcome {
    pub op: ReconciliationOp,
    /// Authoritative line returned by the provider, or its error.
    pub result: Result<InventoryLine, ProviderError>,
}

impl OpOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&ProviderError> {
        self.result.as_ref().err()
    }

    pub fn part_key(&self) -> &PartKey {
        &self.op.part_key
    }
}

/// Everything that happened during one apply, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub session_id: String,
    pub set_id: String,
    pub outcomes: Vec<OpOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ApplyReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &OpOutcome> {
        self.outcomes.iter().filter(|o| o.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &OpOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// Failures rejected by the provider's lock rule.
    pub fn locked(&self) -> impl Iterator<Item = &OpOutcome> {
        self.failed()
            .filter(|o| o.error().is_some_and(ProviderError::is_locked))
    }

    /// True when every op went through (also for an empty apply).
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(OpOutcome::is_ok)
    }

    pub fn outcome_for(&self, key: &PartKey) -> Option<&OpOutcome> {
        self.outcomes.iter().find(|o| &o.op.part_key == key)
    }
}

/// Run ops one after another and collect an outcome per op.
#[instrument(skip(ops, provider), fields(op_count = ops.len()))]
pub async fn apply_ops(
    ops: &[ReconciliationOp],
    provider: &dyn InventoryProvider,
) -> Vec<OpOutcome> {
    let mut outcomes = Vec::with_capacity(ops.len());

    for (idx, op) in ops.iter().enumerate() {
        let result = match op.kind {
            OpKind::Add => provider.add_inventory(&op.part_key, op.amount).await,
            OpKind::Decrement => provider.decrement_inventory(&op.part_key, op.amount).await,
        };

        match &result {
            Ok(line) => info!(
                seq = idx,
                op = %op,
                have = line.have,
                "reconciliation op applied"
            ),
            Err(e) => warn!(
                seq = idx,
                op = %op,
                error = %e,
                "reconciliation op failed"
            ),
        }

        outcomes.push(OpOutcome {
            op: op.clone(),
            result,
        });
    }

    outcomes
}
