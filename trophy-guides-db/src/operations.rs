//! Write operations for catalog entries, guide references, cursors and run
//! locks.

use chrono::{NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use trophy_guides_catalog::{CatalogEntry, GuideSite};

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
    #[error("Source '{source_key}' is locked by {holder} since {acquired_at}")]
    LockHeld {
        source_key: String,
        holder: String,
        acquired_at: String,
    },
}

/// Timestamp format used for lock times; sorts lexicographically and matches
/// SQLite's `datetime('now')`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Catalog Operations ──────────────────────────────────────────────────────

/// Insert a new catalog entry. Returns the generated id.
pub fn insert_catalog_entry(
    conn: &Connection,
    title: &str,
    slug: &str,
) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO catalog_entries (title, slug) VALUES (?1, ?2)",
        params![title, slug],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert or update a catalog entry with a known id, then attach its
/// identifiers.
pub fn upsert_catalog_entry(conn: &Connection, entry: &CatalogEntry) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO catalog_entries (id, title, slug)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
             title = excluded.title,
             slug = excluded.slug,
             updated_at = datetime('now')",
        params![entry.id, entry.title, entry.slug],
    )?;

    for identifier in &entry.alternate_identifiers {
        add_identifier(conn, entry.id, identifier)?;
    }

    Ok(())
}

/// Attach a platform identifier to an entry.
///
/// Returns `false` if the identifier already belongs to some entry; an
/// identifier is never moved between entries.
pub fn add_identifier(
    conn: &Connection,
    entry_id: i64,
    identifier: &str,
) -> Result<bool, OperationError> {
    let identifier = identifier.trim().to_ascii_uppercase();
    if identifier.is_empty() {
        return Ok(false);
    }
    let changed = conn.execute(
        "INSERT OR IGNORE INTO catalog_identifiers (identifier, entry_id) VALUES (?1, ?2)",
        params![identifier, entry_id],
    )?;
    Ok(changed > 0)
}

/// Find the entry owning a platform identifier.
pub fn find_entry_by_identifier(
    conn: &Connection,
    identifier: &str,
) -> Result<Option<i64>, OperationError> {
    conn.query_row(
        "SELECT entry_id FROM catalog_identifiers WHERE identifier = ?1",
        params![identifier.trim().to_ascii_uppercase()],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

// ── Guide Reference Operations ──────────────────────────────────────────────

/// Insert a guide reference as unmatched.
///
/// Returns the new id, or `None` when the URL is already stored.
pub fn insert_unmatched(
    conn: &Connection,
    source: GuideSite,
    url: &str,
    extracted_slug: Option<&str>,
    extracted_title: Option<&str>,
) -> Result<Option<i64>, OperationError> {
    let changed = conn.execute(
        "INSERT INTO guide_references (source, url, extracted_slug, extracted_title)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(url) DO NOTHING",
        params![source.as_str(), url, extracted_slug, extracted_title],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    Ok(Some(conn.last_insert_rowid()))
}

/// Record a match for a reference.
///
/// Only succeeds while the reference is unmatched; returns `false` if it was
/// already matched (to any entry) so an existing match is never replaced.
pub fn mark_matched(
    conn: &Connection,
    reference_id: i64,
    entry_id: i64,
) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "UPDATE guide_references
         SET matched_entry_id = ?2, matched_at = datetime('now')
         WHERE id = ?1 AND matched_entry_id IS NULL",
        params![reference_id, entry_id],
    )?;
    if changed == 0 {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM guide_references WHERE id = ?1)",
            params![reference_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(OperationError::NotFound {
                entity_type: "guide_reference".to_string(),
                id: reference_id.to_string(),
            });
        }
    }
    Ok(changed > 0)
}

/// Make a reference the active guide for its entry and source, unless one is
/// already set. Returns whether it was written.
pub fn set_active_guide_if_empty(
    conn: &Connection,
    entry_id: i64,
    source: GuideSite,
    reference_id: i64,
    url: &str,
) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO active_guides (entry_id, source, reference_id, url)
         VALUES (?1, ?2, ?3, ?4)",
        params![entry_id, source.as_str(), reference_id, url],
    )?;
    Ok(changed > 0)
}

// ── Cursor Operations ───────────────────────────────────────────────────────

/// Last saved cursor for a source key.
pub fn get_cursor(conn: &Connection, source_key: &str) -> Result<Option<String>, OperationError> {
    conn.query_row(
        "SELECT cursor FROM crawl_cursors WHERE source_key = ?1",
        params![source_key],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

/// Persist a cursor for a source key.
pub fn save_cursor(
    conn: &Connection,
    source_key: &str,
    cursor: &str,
) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO crawl_cursors (source_key, cursor)
         VALUES (?1, ?2)
         ON CONFLICT(source_key) DO UPDATE SET
             cursor = excluded.cursor,
             updated_at = datetime('now')",
        params![source_key, cursor],
    )?;
    Ok(())
}

/// Forget the cursor for a source key so the next run starts over.
pub fn clear_cursor(conn: &Connection, source_key: &str) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "DELETE FROM crawl_cursors WHERE source_key = ?1",
        params![source_key],
    )?;
    Ok(changed > 0)
}

// ── Run Locks ───────────────────────────────────────────────────────────────

/// Take the run lock for a source key.
///
/// Succeeds if nobody holds it, if the current holder's lock is older than
/// `stale_after`, or if `force` is set. The check and the write happen in a
/// single statement.
pub fn acquire_run_lock(
    conn: &Connection,
    source_key: &str,
    holder: &str,
    stale_after: chrono::Duration,
    force: bool,
) -> Result<(), OperationError> {
    let now = Utc::now();
    let stale_before = (now - stale_after).format(TIMESTAMP_FORMAT).to_string();
    let now = now.format(TIMESTAMP_FORMAT).to_string();

    let changed = conn.execute(
        "INSERT INTO run_locks (source_key, holder, acquired_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(source_key) DO UPDATE SET
             holder = excluded.holder,
             acquired_at = excluded.acquired_at
         WHERE ?4 OR run_locks.acquired_at < ?5",
        params![source_key, holder, now, force, stale_before],
    )?;

    if changed > 0 {
        return Ok(());
    }

    let (holder, acquired_at): (String, String) = conn.query_row(
        "SELECT holder, acquired_at FROM run_locks WHERE source_key = ?1",
        params![source_key],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Err(OperationError::LockHeld {
        source_key: source_key.to_string(),
        holder,
        acquired_at,
    })
}

/// Release a run lock, but only if `holder` still owns it.
pub fn release_run_lock(
    conn: &Connection,
    source_key: &str,
    holder: &str,
) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "DELETE FROM run_locks WHERE source_key = ?1 AND holder = ?2",
        params![source_key, holder],
    )?;
    Ok(changed > 0)
}

/// Age of a lock timestamp, if it parses.
pub fn lock_age(acquired_at: &str) -> Option<chrono::Duration> {
    let acquired = NaiveDateTime::parse_from_str(acquired_at, TIMESTAMP_FORMAT).ok()?;
    Some(Utc::now().naive_utc() - acquired)
}
