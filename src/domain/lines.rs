// ==========================================
// Brick Buildability - requirement and inventory lines
// ==========================================
// Raw provider rows may repeat a PartKey; they are summed
// here before entering the engine.
// ==========================================

use crate::domain::types::PartKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One line of a set's bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementLine {
    pub part_key: PartKey,
    pub needed: i64,
}

impl RequirementLine {
    pub fn new(part_num: impl Into<String>, color_id: i64, needed: i64) -> Self {
        Self {
            part_key: PartKey::new(part_num, color_id),
            needed,
        }
    }
}

/// Owned quantity of one part/color, independent of any set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub part_key: PartKey,
    pub have: i64,
}

impl InventoryLine {
    pub fn new(part_num: impl Into<String>, color_id: i64, have: i64) -> Self {
        Self {
            part_key: PartKey::new(part_num, color_id),
            have,
        }
    }
}

/// Sum rows sharing a PartKey, keeping first-seen order.
fn aggregate_by_key<I>(rows: I) -> Vec<(PartKey, i64)>
where
    I: IntoIterator<Item = (PartKey, i64)>,
{
    let mut order: Vec<(PartKey, i64)> = Vec::new();
    let mut index: HashMap<PartKey, usize> = HashMap::new();

    for (key, qty) in rows {
        match index.get(&key) {
            Some(&pos) => order[pos].1 += qty,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, qty));
            }
        }
    }

    order
}

/// Pre-aggregate requirement rows so each PartKey appears once.
pub fn aggregate_requirements<I>(rows: I) -> Vec<RequirementLine>
where
    I: IntoIterator<Item = RequirementLine>,
{
    aggregate_by_key(rows.into_iter().map(|r| (r.part_key, r.needed)))
        .into_iter()
        .map(|(part_key, needed)| RequirementLine { part_key, needed })
        .collect()
}

/// Pre-aggregate inventory rows so each PartKey appears once.
pub fn aggregate_inventory<I>(rows: I) -> Vec<InventoryLine>
where
    I: IntoIterator<Item = InventoryLine>,
{
    aggregate_by_key(rows.into_iter().map(|r| (r.part_key, r.have)))
        .into_iter()
        .map(|(part_key, have)| InventoryLine { part_key, have })
        .collect()
}
