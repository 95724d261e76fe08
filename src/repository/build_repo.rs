// ==========================================
// Brick Buildability - build commitment repository
// ==========================================
// Table: build_commitment
// A COMPLETED build reserves the parts it consumed; the
// inventory repository refuses decrements into that
// reserved quantity.
// ==========================================

use crate::domain::lines::RequirementLine;
use crate::domain::types::{BuildLock, PartKey};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const BUILD_STATUS_COMPLETED: &str = "COMPLETED";
pub const BUILD_STATUS_RELEASED: &str = "RELEASED";

// ==========================================
// BuildRepository
// ==========================================
pub struct BuildRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BuildRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Record a completed build of `set_id` consuming `lines`.
    ///
    /// # Returns
    /// The new build id.
    pub fn record_completed_build(
        &self,
        set_id: &str,
        lines: &[RequirementLine],
    ) -> RepositoryResult<String> {
        let build_id = Uuid::new_v4().to_string();
        let completed_at = Utc::now().to_rfc3339();

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO build_commitment
                    (build_id, set_id, part_num, color_id, quantity, status, completed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(build_id, part_num, color_id)
                    DO UPDATE SET quantity = quantity + excluded.quantity
                "#,
            )?;
            for line in lines.iter().filter(|l| l.needed > 0) {
                stmt.execute(params![
                    build_id,
                    set_id,
                    line.part_key.part_num,
                    line.part_key.color_id,
                    line.needed,
                    BUILD_STATUS_COMPLETED,
                    completed_at
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!(build_id = %build_id, set_id, lines = lines.len(), "build recorded");
        Ok(build_id)
    }

    /// Release a build so its parts can be decremented again.
    pub fn release_build(&self, build_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE build_commitment SET status = ?2 WHERE build_id = ?1 AND status = ?3",
            params![build_id, BUILD_STATUS_RELEASED, BUILD_STATUS_COMPLETED],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "build".to_string(),
                id: build_id.to_string(),
            });
        }
        Ok(())
    }

    /// Completed builds reserving `key`.
    pub fn find_locks(&self, key: &PartKey) -> RepositoryResult<Vec<BuildLock>> {
        let conn = self.get_conn()?;
        find_locks_with(&conn, key)
    }
}

/// Completed builds reserving `key`, on an already-held connection.
pub(crate) fn find_locks_with(conn: &Connection, key: &PartKey) -> RepositoryResult<Vec<BuildLock>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT build_id, set_id, quantity
        FROM build_commitment
        WHERE part_num = ?1 AND color_id = ?2 AND status = ?3 AND quantity > 0
        ORDER BY completed_at, build_id
        "#,
    )?;
    let locks = stmt
        .query_map(
            params![key.part_num, key.color_id, BUILD_STATUS_COMPLETED],
            |row| {
                Ok(BuildLock {
                    build_id: row.get(0)?,
                    set_id: row.get(1)?,
                    quantity: row.get(2)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(locks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn repo() -> BuildRepository {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        BuildRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_record_and_release() {
        let repo = repo();
        let key = PartKey::new("3001", 4);
        let build_id = repo
            .record_completed_build(
                "6020-1",
                &[RequirementLine::new("3001", 4, 2), RequirementLine::new("3002", 0, 0)],
            )
            .unwrap();

        let locks = repo.find_locks(&key).unwrap();
        assert_eq!(locks.len(), 1);
        assert_eq!(locks[0].build_id, build_id);
        assert_eq!(locks[0].quantity, 2);
        assert!(repo.find_locks(&PartKey::new("3002", 0)).unwrap().is_empty());

        repo.release_build(&build_id).unwrap();
        assert!(repo.find_locks(&key).unwrap().is_empty());
        assert!(matches!(
            repo.release_build(&build_id),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
