// ==========================================
// Brick Buildability - reconciliation ops
// ==========================================

use crate::domain::types::{OpKind, PartKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One inventory call needed to make persisted quantities match staged ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationOp {
    pub part_key: PartKey,
    pub kind: OpKind,
    /// Always > 0.
    pub amount: i64,
}

impl ReconciliationOp {
    /// Op for a net delta; `None` when the delta is zero.
    pub fn from_delta(part_key: PartKey, delta: i64) -> Option<Self> {
        match delta {
            0 => None,
            d if d > 0 => Some(Self {
                part_key,
                kind: OpKind::Add,
                amount: d,
            }),
            d => Some(Self {
                part_key,
                kind: OpKind::Decrement,
                amount: -d,
            }),
        }
    }

    /// Signed delta the op applies to the owned quantity.
    pub fn signed_delta(&self) -> i64 {
        match self.kind {
            OpKind::Add => self.amount,
            OpKind::Decrement => -self.amount,
        }
    }
}

impl fmt::Display for ReconciliationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} x{}", self.kind, self.part_key, self.amount)
    }
}
