// ==========================================
// Brick Buildability - inventory repository
// ==========================================
// Table: inventory_part
// Every add/decrement runs in its own transaction, so each
// call is atomic on its own.
// ==========================================

use crate::domain::lines::InventoryLine;
use crate::domain::types::PartKey;
use crate::repository::build_repo::find_locks_with;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// InventoryRepository
// ==========================================
pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Every owned part with a positive quantity, ordered by key.
    pub fn list_all(&self) -> RepositoryResult<Vec<InventoryLine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT part_num, color_id, quantity
            FROM inventory_part
            WHERE quantity > 0
            ORDER BY part_num, color_id
            "#,
        )?;
        let lines = stmt
            .query_map([], |row| {
                Ok(InventoryLine {
                    part_key: PartKey::new(row.get::<_, String>(0)?, row.get(1)?),
                    have: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    pub fn find_quantity(&self, key: &PartKey) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        quantity_with(&conn, key)
    }

    /// Add `amount` (> 0) and return the resulting line.
    pub fn add(&self, key: &PartKey, amount: i64) -> RepositoryResult<InventoryLine> {
        check_amount(key, amount)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let current = quantity_with(&tx, key)?;
        let next = current.saturating_add(amount);
        upsert_with(&tx, key, next)?;
        tx.commit()?;

        Ok(InventoryLine {
            part_key: key.clone(),
            have: next,
        })
    }

    /// Add several lines in one transaction; zero quantities are skipped.
    ///
    /// # Returns
    /// Number of lines written.
    pub fn add_all(&self, lines: &[InventoryLine]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        for line in lines.iter().filter(|l| l.have != 0) {
            check_amount(&line.part_key, line.have)?;
            let current = quantity_with(&tx, &line.part_key)?;
            upsert_with(&tx, &line.part_key, current.saturating_add(line.have))?;
            written += 1;
        }
        tx.commit()?;
        Ok(written)
    }

    /// Remove `amount` (> 0) and return the resulting line.
    ///
    /// The quantity never goes below zero.
    ///
    /// # Errors
    /// `Locked` when the result would fall below the quantity reserved by
    /// completed builds; nothing is written in that case.
    pub fn decrement(&self, key: &PartKey, amount: i64) -> RepositoryResult<InventoryLine> {
        check_amount(key, amount)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let current = quantity_with(&tx, key)?;
        let next = (current - amount).max(0);

        let locks = find_locks_with(&tx, key)?;
        let reserved: i64 = locks.iter().map(|l| l.quantity).sum();
        if next < reserved {
            tracing::warn!(
                part_key = %key,
                current,
                amount,
                reserved,
                "decrement rejected by completed builds"
            );
            return Err(RepositoryError::Locked {
                part_key: key.clone(),
                blocking: locks,
            });
        }

        upsert_with(&tx, key, next)?;
        tx.commit()?;

        Ok(InventoryLine {
            part_key: key.clone(),
            have: next,
        })
    }

    /// Overwrite the quantity of a key (used by imports and seeding).
    pub fn set_quantity(&self, key: &PartKey, quantity: i64) -> RepositoryResult<InventoryLine> {
        if quantity < 0 || !key.is_well_formed() {
            return Err(RepositoryError::ValidationError(format!(
                "invalid quantity {} for {}",
                quantity, key
            )));
        }
        let conn = self.get_conn()?;
        upsert_with(&conn, key, quantity)?;
        Ok(InventoryLine {
            part_key: key.clone(),
            have: quantity,
        })
    }
}

fn check_amount(key: &PartKey, amount: i64) -> RepositoryResult<()> {
    if amount <= 0 {
        return Err(RepositoryError::ValidationError(format!(
            "amount must be > 0 for {}, got {}",
            key, amount
        )));
    }
    if !key.is_well_formed() {
        return Err(RepositoryError::ValidationError("empty part number".to_string()));
    }
    Ok(())
}

fn quantity_with(conn: &Connection, key: &PartKey) -> RepositoryResult<i64> {
    let qty = conn
        .query_row(
            "SELECT quantity FROM inventory_part WHERE part_num = ?1 AND color_id = ?2",
            params![key.part_num, key.color_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(qty.unwrap_or(0))
}

fn upsert_with(conn: &Connection, key: &PartKey, quantity: i64) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO inventory_part (part_num, color_id, quantity, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(part_num, color_id) DO UPDATE SET quantity = ?3, updated_at = ?4
        "#,
        params![key.part_num, key.color_id, quantity, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}
