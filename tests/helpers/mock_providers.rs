// ==========================================
// Mock providers - for integration tests
// ==========================================

use async_trait::async_trait;
use brick_buildability::domain::{BuildLock, InventoryLine, PartKey, RequirementLine};
use brick_buildability::provider::{
    InventoryProvider, ProviderError, ProviderResult, RequirementsProvider,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ==========================================
// MemoryBom
// ==========================================

/// Parts lists held in memory. A set can be gated so its fetch
/// only resolves once the test opens the gate.
#[derive(Default)]
pub struct MemoryBom {
    sets: Mutex<HashMap<String, Vec<RequirementLine>>>,
    gates: Mutex<HashMap<String, Gate>>,
    failures: Mutex<HashMap<String, ProviderError>>,
}

#[derive(Clone)]
pub struct Gate {
    /// Signalled when a fetch for the set has started
    pub started: Arc<Notify>,
    /// Signal to let the fetch resolve
    pub release: Arc<Notify>,
}

impl MemoryBom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set(self, set_id: &str, lines: Vec<RequirementLine>) -> Self {
        self.sets.lock().unwrap().insert(set_id.to_string(), lines);
        self
    }

    /// Hold every fetch of `set_id` until `gate.release` is notified.
    pub fn gate(&self, set_id: &str) -> Gate {
        let gate = Gate {
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        };
        self.gates
            .lock()
            .unwrap()
            .insert(set_id.to_string(), gate.clone());
        gate
    }

    /// Make fetches of `set_id` fail with `err`.
    pub fn fail(&self, set_id: &str, err: ProviderError) {
        self.failures.lock().unwrap().insert(set_id.to_string(), err);
    }
}

#[async_trait]
impl RequirementsProvider for MemoryBom {
    async fn fetch_requirements(&self, set_id: &str) -> ProviderResult<Vec<RequirementLine>> {
        let gate = self.gates.lock().unwrap().get(set_id).cloned();
        if let Some(gate) = gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }

        let failure = self.failures.lock().unwrap().get(set_id).cloned();
        if let Some(err) = failure {
            return Err(err);
        }
        self.sets
            .lock()
            .unwrap()
            .get(set_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                set_id: set_id.to_string(),
            })
    }
}

// ==========================================
// MemoryInventory
// ==========================================

/// Inventory held in memory.
///
/// - a key with locks rejects every decrement with `Locked`
/// - a key marked unavailable rejects every mutation with `Unavailable`
/// - every mutation is logged in call order
#[derive(Default)]
pub struct MemoryInventory {
    owned: Mutex<BTreeMap<PartKey, i64>>,
    locks: Mutex<HashMap<PartKey, Vec<BuildLock>>>,
    unavailable: Mutex<HashSet<PartKey>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryInventory {
    pub fn new(lines: Vec<InventoryLine>) -> Self {
        let inv = Self::default();
        {
            let mut owned = inv.owned.lock().unwrap();
            for line in lines {
                *owned.entry(line.part_key).or_insert(0) += line.have;
            }
        }
        inv
    }

    pub fn lock_key(&self, key: &PartKey, build_id: &str, set_id: &str, quantity: i64) {
        self.locks
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_default()
            .push(BuildLock {
                build_id: build_id.to_string(),
                set_id: set_id.to_string(),
                quantity,
            });
    }

    pub fn make_unavailable(&self, key: &PartKey) {
        self.unavailable.lock().unwrap().insert(key.clone());
    }

    pub fn make_available(&self, key: &PartKey) {
        self.unavailable.lock().unwrap().remove(key);
    }

    pub fn have(&self, key: &PartKey) -> i64 {
        self.owned.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check_available(&self, key: &PartKey) -> ProviderResult<()> {
        if self.unavailable.lock().unwrap().contains(key) {
            return Err(ProviderError::Unavailable(format!("backend down for {}", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryProvider for MemoryInventory {
    async fn fetch_inventory(&self) -> ProviderResult<Vec<InventoryLine>> {
        Ok(self
            .owned
            .lock()
            .unwrap()
            .iter()
            .map(|(key, have)| InventoryLine {
                part_key: key.clone(),
                have: *have,
            })
            .collect())
    }

    async fn add_inventory(&self, part_key: &PartKey, amount: i64) -> ProviderResult<InventoryLine> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("add {} x{}", part_key, amount));
        self.check_available(part_key)?;

        let mut owned = self.owned.lock().unwrap();
        let have = owned.entry(part_key.clone()).or_insert(0);
        *have += amount;
        Ok(InventoryLine {
            part_key: part_key.clone(),
            have: *have,
        })
    }

    async fn decrement_inventory(
        &self,
        part_key: &PartKey,
        amount: i64,
    ) -> ProviderResult<InventoryLine> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("decrement {} x{}", part_key, amount));
        self.check_available(part_key)?;

        if let Some(blocking) = self.locks.lock().unwrap().get(part_key).cloned() {
            let message = format!(
                "used by completed build(s) of {}",
                blocking
                    .iter()
                    .map(|b| b.set_id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            return Err(ProviderError::Locked {
                part_key: part_key.clone(),
                blocking,
                message,
            });
        }

        let mut owned = self.owned.lock().unwrap();
        let have = owned.entry(part_key.clone()).or_insert(0);
        *have = (*have - amount).max(0);
        Ok(InventoryLine {
            part_key: part_key.clone(),
            have: *have,
        })
    }
}
