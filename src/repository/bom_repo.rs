// ==========================================
// Brick Buildability - bill-of-materials repository
// ==========================================
// Tables: set_catalog, set_part
// Rule: repositories hold no business logic
// ==========================================

use crate::domain::lines::{aggregate_requirements, RequirementLine};
use crate::domain::types::PartKey;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// BomRepository
// ==========================================
pub struct BomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BomRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Replace the parts list of a set (creating the set if needed).
    ///
    /// Rows are aggregated per PartKey; line order follows first appearance.
    pub fn replace_set(
        &self,
        set_id: &str,
        name: Option<&str>,
        lines: &[RequirementLine],
    ) -> RepositoryResult<usize> {
        let set_id = set_id.trim();
        if set_id.is_empty() {
            return Err(RepositoryError::ValidationError("set_id is empty".to_string()));
        }
        if let Some(bad) = lines.iter().find(|l| l.needed < 0 || !l.part_key.is_well_formed()) {
            return Err(RepositoryError::ValidationError(format!(
                "invalid requirement line {} x{}",
                bad.part_key, bad.needed
            )));
        }
        let lines = aggregate_requirements(lines.iter().cloned());

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO set_catalog (set_id, name, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(set_id) DO UPDATE SET name = COALESCE(?2, name), updated_at = ?3
            "#,
            params![set_id, name, Utc::now().to_rfc3339()],
        )?;
        tx.execute("DELETE FROM set_part WHERE set_id = ?1", params![set_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO set_part (set_id, line_no, part_num, color_id, quantity)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (line_no, line) in lines.iter().enumerate() {
                stmt.execute(params![
                    set_id,
                    line_no as i64,
                    line.part_key.part_num,
                    line.part_key.color_id,
                    line.needed
                ])?;
            }
        }
        tx.commit()?;

        Ok(lines.len())
    }

    pub fn set_exists(&self, set_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM set_catalog WHERE set_id = ?1",
                params![set_id.trim()],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    /// Parts list of a set in stored line order.
    ///
    /// # Errors
    /// `NotFound { entity: "set" }` for an unknown set.
    pub fn find_requirements(&self, set_id: &str) -> RepositoryResult<Vec<RequirementLine>> {
        let set_id = set_id.trim();
        if !self.set_exists(set_id)? {
            return Err(RepositoryError::NotFound {
                entity: "set".to_string(),
                id: set_id.to_string(),
            });
        }

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT part_num, color_id, quantity
            FROM set_part
            WHERE set_id = ?1
            ORDER BY line_no
            "#,
        )?;
        let lines = stmt
            .query_map(params![set_id], |row| {
                Ok(RequirementLine {
                    part_key: PartKey::new(row.get::<_, String>(0)?, row.get(1)?),
                    needed: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lines)
    }

    /// All known set ids, sorted.
    pub fn list_sets(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT set_id FROM set_catalog ORDER BY set_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
