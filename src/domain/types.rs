// ==========================================
// Brick Buildability - domain types
// ==========================================
// PartKey identity, reconciliation op kinds, staging
// session states, build locks
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// PartKey
// ==========================================
// Identity of an orderable element: part number + color.
// Ordering is part_num first, then color_id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartKey {
    pub part_num: String,
    pub color_id: i64,
}

impl PartKey {
    /// Build a key; surrounding whitespace in the part number is dropped.
    pub fn new(part_num: impl Into<String>, color_id: i64) -> Self {
        let part_num = part_num.into();
        let trimmed = part_num.trim();
        let part_num = if trimmed.len() == part_num.len() {
            part_num
        } else {
            trimmed.to_string()
        };
        Self { part_num, color_id }
    }

    /// Whether the part number is usable as an identifier.
    pub fn is_well_formed(&self) -> bool {
        !self.part_num.is_empty()
    }
}

impl fmt::Display for PartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.part_num, self.color_id)
    }
}

// ==========================================
// Reconciliation op kind
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Add,
    Decrement,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Add => write!(f, "add"),
            OpKind::Decrement => write!(f, "decrement"),
        }
    }
}

// ==========================================
// Staging session state
// ==========================================
// Active -> Applying -> Consumed; Consumed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Active,
    Applying,
    Consumed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Active => write!(f, "ACTIVE"),
            SessionState::Applying => write!(f, "APPLYING"),
            SessionState::Consumed => write!(f, "CONSUMED"),
        }
    }
}

// ==========================================
// BuildLock
// ==========================================

/// A completed build that reserves some quantity of a part.
///
/// Attached to a `Locked` rejection so the caller can tell the user which
/// builds block the decrement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLock {
    pub build_id: String,
    pub set_id: String,
    pub quantity: i64,
}

impl fmt::Display for BuildLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "build {} (set {}) x{}", self.build_id, self.set_id, self.quantity)
    }
}
