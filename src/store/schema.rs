//! Catalog database schema
//!
//! Two tables hold every kind: `entities` for identity and timestamps,
//! `properties` for typed attributes. A property row populates exactly one
//! of its four value columns. The unique index on `(type_id, name)` is what
//! lets upsert-by-name run as a single conflict-aware insert.

use rusqlite::Connection;

pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS entities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            external_id TEXT,
            create_time_since_epoch INTEGER NOT NULL,
            last_update_time_since_epoch INTEGER NOT NULL,
            UNIQUE (type_id, name)
        );

        CREATE INDEX IF NOT EXISTS idx_entities_type ON entities (type_id);
        CREATE INDEX IF NOT EXISTS idx_entities_external_id ON entities (external_id);

        CREATE TABLE IF NOT EXISTS properties (
            entity_id INTEGER NOT NULL REFERENCES entities (id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            is_custom INTEGER NOT NULL DEFAULT 0,
            int_value INTEGER,
            double_value REAL,
            string_value TEXT,
            bool_value INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_properties_entity ON properties (entity_id);
        CREATE INDEX IF NOT EXISTS idx_properties_name_string
            ON properties (name, string_value);
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

pub fn drop_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS properties;
        DROP TABLE IF EXISTS entities;
        DROP TABLE IF EXISTS schema_version;
        "#,
    )
}

/// Stored schema version, if the version table exists at all.
pub fn stored_version(conn: &Connection) -> rusqlite::Result<Option<i32>> {
    let table_exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
        [],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Ok(None);
    }
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get(0)
    })
}
