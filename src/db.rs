// ==========================================
// Brick Buildability - SQLite connection setup
// ==========================================
// Goals:
// - every Connection::open goes through the same PRAGMAs
// - one place that creates the local store schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER NOT NULL,
    applied_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS set_catalog (
    set_id      TEXT PRIMARY KEY,
    name        TEXT,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS set_part (
    set_id      TEXT NOT NULL REFERENCES set_catalog(set_id) ON DELETE CASCADE,
    line_no     INTEGER NOT NULL,
    part_num    TEXT NOT NULL,
    color_id    INTEGER NOT NULL,
    quantity    INTEGER NOT NULL CHECK (quantity >= 0),
    PRIMARY KEY (set_id, part_num, color_id)
);

CREATE TABLE IF NOT EXISTS inventory_part (
    part_num    TEXT NOT NULL,
    color_id    INTEGER NOT NULL,
    quantity    INTEGER NOT NULL CHECK (quantity >= 0),
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (part_num, color_id)
);

CREATE TABLE IF NOT EXISTS build_commitment (
    build_id     TEXT NOT NULL,
    set_id       TEXT NOT NULL,
    part_num     TEXT NOT NULL,
    color_id     INTEGER NOT NULL,
    quantity     INTEGER NOT NULL CHECK (quantity >= 0),
    status       TEXT NOT NULL,
    completed_at TEXT,
    PRIMARY KEY (build_id, part_num, color_id)
);

CREATE INDEX IF NOT EXISTS idx_build_commitment_part
    ON build_commitment (part_num, color_id, status);
"#;

/// Apply the shared PRAGMAs
///
/// foreign_keys and busy_timeout are per-connection settings.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a connection with the shared PRAGMAs applied
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create all tables (idempotent) and record the schema version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    if read_schema_version(conn)?.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![CURRENT_SCHEMA_VERSION, chrono::Utc::now().to_rfc3339()],
        )?;
    }
    Ok(())
}

/// Open, configure and initialise a store in one step
pub fn open_store(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Read schema_version (None when the table is missing or empty)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
