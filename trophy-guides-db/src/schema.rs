//! SQLite schema creation and migration.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
    #[error("Cannot create database directory {path}: {source}")]
    CreateDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 2;

/// Create all tables and indexes if they don't exist.
///
/// This is idempotent: safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Open or create a guide database at the given path.
///
/// Missing parent directories are created.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SchemaError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        create_schema(&conn)?;
    } else if version != CURRENT_VERSION {
        migrate(&conn, version)?;
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run migrations from `from_version` up to `CURRENT_VERSION`.
fn migrate(conn: &Connection, from_version: i32) -> Result<(), SchemaError> {
    if from_version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: from_version,
        });
    }

    let mut version = from_version;
    while version < CURRENT_VERSION {
        if version == 1 {
            log::info!("Migrating guide database to version 2 (run locks)");
            conn.execute_batch(RUN_LOCKS_SQL)?;
        }
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

const RUN_LOCKS_SQL: &str = r#"
-- One crawl run per source at a time
CREATE TABLE IF NOT EXISTS run_locks (
    source_key TEXT PRIMARY KEY,
    holder TEXT NOT NULL,
    acquired_at TEXT NOT NULL
);
"#;

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Canonical games
CREATE TABLE IF NOT EXISTS catalog_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    slug TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_catalog_slug ON catalog_entries(slug);

-- Platform identifiers (e.g. PSN trophy-set ids); each belongs to one entry
CREATE TABLE IF NOT EXISTS catalog_identifiers (
    identifier TEXT PRIMARY KEY,
    entry_id INTEGER NOT NULL REFERENCES catalog_entries(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_identifiers_entry ON catalog_identifiers(entry_id);

-- Guide URLs discovered on third-party sites; url is the dedup key
CREATE TABLE IF NOT EXISTS guide_references (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    extracted_slug TEXT,
    extracted_title TEXT,
    matched_entry_id INTEGER REFERENCES catalog_entries(id),
    matched_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_references_unmatched
    ON guide_references(source, id) WHERE matched_entry_id IS NULL;
CREATE INDEX IF NOT EXISTS idx_references_entry ON guide_references(matched_entry_id);

-- The guide surfaced to users, at most one per entry and source
CREATE TABLE IF NOT EXISTS active_guides (
    entry_id INTEGER NOT NULL REFERENCES catalog_entries(id) ON DELETE CASCADE,
    source TEXT NOT NULL,
    reference_id INTEGER NOT NULL REFERENCES guide_references(id),
    url TEXT NOT NULL,
    set_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (entry_id, source)
);

-- Last persisted crawl position per source key
CREATE TABLE IF NOT EXISTS crawl_cursors (
    source_key TEXT PRIMARY KEY,
    cursor TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One crawl run per source at a time
CREATE TABLE IF NOT EXISTS run_locks (
    source_key TEXT PRIMARY KEY,
    holder TEXT NOT NULL,
    acquired_at TEXT NOT NULL
);
"#;
