// ==========================================
// Brick Buildability - payload normalization
// ==========================================
// Loosely shaped JSON rows -> RequirementLine / InventoryLine
// Upstream field names are inconsistent; every logical field
// is looked up through an alias list.
// ==========================================

use crate::domain::lines::{
    aggregate_inventory, aggregate_requirements, InventoryLine, RequirementLine,
};
use crate::domain::types::{BuildLock, PartKey};
use crate::provider::error::{ProviderError, ProviderResult};
use serde_json::Value;

const PART_NUM_ALIASES: &[&str] = &[
    "part_num",
    "partNum",
    "part_number",
    "partNumber",
    "part.part_num",
    "part.partNum",
    "element.part_num",
];

const COLOR_ALIASES: &[&str] = &["color_id", "colorId", "color.id", "color"];

const NEEDED_ALIASES: &[&str] = &["quantity", "qty", "needed", "quantity_needed", "count"];

const HAVE_ALIASES: &[&str] = &["quantity", "qty", "have", "owned", "quantity_owned", "count"];

const ROW_CONTAINERS: &[&str] = &["results", "parts", "items", "inventory", "data"];

// ==========================================
// Public entry points
// ==========================================

/// Requirements of a set from any supported payload shape.
///
/// Spare-part rows are skipped; repeated keys are summed.
pub fn requirements_from_json(payload: &Value) -> ProviderResult<Vec<RequirementLine>> {
    let mut lines = Vec::new();
    for (idx, row) in rows(payload)?.iter().enumerate() {
        if get_bool(row, &["is_spare", "isSpare", "spare"]).unwrap_or(false) {
            continue;
        }
        let part_key = part_key(row, idx)?;
        let needed = require_int(row, NEEDED_ALIASES, "quantity", idx)?;
        lines.push(RequirementLine { part_key, needed });
    }
    Ok(aggregate_requirements(lines))
}

/// Inventory from any supported payload shape; repeated keys are summed.
pub fn inventory_from_json(payload: &Value) -> ProviderResult<Vec<InventoryLine>> {
    let mut lines = Vec::new();
    for (idx, row) in rows(payload)?.iter().enumerate() {
        lines.push(inventory_row(row, idx)?);
    }
    Ok(aggregate_inventory(lines))
}

/// Single line returned by an add/decrement call.
///
/// Accepts the line itself or an envelope (`{"item": {...}}`, `{"data": {...}}`).
pub fn inventory_line_from_json(payload: &Value) -> ProviderResult<InventoryLine> {
    let row = ["item", "data", "inventory"]
        .iter()
        .find_map(|k| payload.get(*k).filter(|v| v.is_object()))
        .unwrap_or(payload);
    inventory_row(row, 0)
}

/// Blocking builds listed in a lock rejection body.
///
/// Unknown shapes yield an empty list; the lock itself is still reported.
pub fn locks_from_json(payload: &Value) -> Vec<BuildLock> {
    let Some(items) = ["blocking", "locked_by", "lockedBy", "builds"]
        .iter()
        .find_map(|k| payload.get(*k).and_then(Value::as_array))
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let build_id = get_string(item, &["build_id", "buildId", "id"])?;
            let set_id =
                get_string(item, &["set_id", "setId", "set_num", "setNum"]).unwrap_or_default();
            let quantity = get_int(item, &["quantity", "qty", "reserved"]).unwrap_or(0);
            Some(BuildLock {
                build_id,
                set_id,
                quantity,
            })
        })
        .collect()
}

/// Human-readable message from an error body, if any.
pub fn message_from_json(payload: &Value) -> Option<String> {
    get_string(payload, &["message", "error", "detail"])
}

// ==========================================
// Helpers
// ==========================================

fn rows(payload: &Value) -> ProviderResult<&Vec<Value>> {
    if let Some(arr) = payload.as_array() {
        return Ok(arr);
    }
    for key in ROW_CONTAINERS {
        match payload.get(*key) {
            Some(Value::Array(arr)) => return Ok(arr),
            // {"data": {"results": [...]}}
            Some(inner @ Value::Object(_)) => {
                if let Ok(arr) = rows(inner) {
                    return Ok(arr);
                }
            }
            _ => {}
        }
    }
    Err(ProviderError::Unavailable(
        "unexpected payload shape: no row list found".to_string(),
    ))
}

fn inventory_row(row: &Value, idx: usize) -> ProviderResult<InventoryLine> {
    let part_key = part_key(row, idx)?;
    let have = require_int(row, HAVE_ALIASES, "quantity", idx)?;
    Ok(InventoryLine { part_key, have })
}

fn part_key(row: &Value, idx: usize) -> ProviderResult<PartKey> {
    let part_num = get_string(row, PART_NUM_ALIASES).ok_or_else(|| {
        ProviderError::Unavailable(format!("malformed row {}: missing part number", idx))
    })?;
    let color_id = require_int(row, COLOR_ALIASES, "color", idx)?;
    Ok(PartKey::new(part_num, color_id))
}

fn require_int(row: &Value, aliases: &[&str], field: &str, idx: usize) -> ProviderResult<i64> {
    get_int(row, aliases).ok_or_else(|| {
        ProviderError::Unavailable(format!("malformed row {}: missing or non-integer {}", idx, field))
    })
}

/// Dotted path lookup: `color.id` -> row["color"]["id"].
fn get_path<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(row, |v, segment| v.get(segment))
}

fn get_string(row: &Value, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| match get_path(row, alias)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn get_int(row: &Value, aliases: &[&str]) -> Option<i64> {
    aliases.iter().find_map(|alias| match get_path(row, alias)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn get_bool(row: &Value, aliases: &[&str]) -> Option<bool> {
    aliases.iter().find_map(|alias| match get_path(row, alias)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" | "True" | "1" => Some(true),
            "false" | "False" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        _ => None,
    })
}
