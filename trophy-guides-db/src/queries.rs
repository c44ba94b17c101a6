//! Read queries for the guide database.
//!
//! Provides the bulk catalog read for index building, reference lookups,
//! keyset-paged unmatched listings and summary statistics.

use std::collections::HashMap;
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use trophy_guides_catalog::{CatalogEntry, GuideReference, GuideSite};

use crate::operations::OperationError;

// ── Catalog ─────────────────────────────────────────────────────────────────

/// Load every catalog entry with its identifiers, ordered by id.
///
/// Only `id`, `title` and `slug` are read; the ordering makes "first entry
/// wins" in the index deterministic.
pub fn load_catalog(conn: &Connection) -> Result<Vec<CatalogEntry>, OperationError> {
    let mut identifiers: HashMap<i64, Vec<String>> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT entry_id, identifier FROM catalog_identifiers ORDER BY entry_id, identifier",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (entry_id, identifier) = row?;
            identifiers.entry(entry_id).or_default().push(identifier);
        }
    }

    let mut stmt = conn.prepare("SELECT id, title, slug FROM catalog_entries ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(CatalogEntry {
            id: row.get(0)?,
            title: row.get(1)?,
            slug: row.get(2)?,
            alternate_identifiers: Vec::new(),
        })
    })?;

    let mut entries = rows.collect::<Result<Vec<_>, _>>()?;
    for entry in &mut entries {
        if let Some(ids) = identifiers.remove(&entry.id) {
            entry.alternate_identifiers = ids;
        }
    }
    Ok(entries)
}

/// Fetch a single catalog entry (without identifiers).
pub fn get_catalog_entry(
    conn: &Connection,
    id: i64,
) -> Result<Option<CatalogEntry>, OperationError> {
    conn.query_row(
        "SELECT id, title, slug FROM catalog_entries WHERE id = ?1",
        params![id],
        |row| {
            Ok(CatalogEntry {
                id: row.get(0)?,
                title: row.get(1)?,
                slug: row.get(2)?,
                alternate_identifiers: Vec::new(),
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

// ── Guide References ────────────────────────────────────────────────────────

const REFERENCE_COLUMNS: &str =
    "id, source, url, extracted_slug, extracted_title, matched_entry_id, matched_at";

/// Find a guide reference by its URL.
pub fn find_reference_by_url(
    conn: &Connection,
    url: &str,
) -> Result<Option<GuideReference>, OperationError> {
    conn.query_row(
        &format!("SELECT {REFERENCE_COLUMNS} FROM guide_references WHERE url = ?1"),
        params![url],
        row_to_reference,
    )
    .optional()
    .map_err(Into::into)
}

/// Unmatched references with `id > after_id`, ascending, at most `limit`.
///
/// Keyset pagination: callers pass the last id they saw. Rows matched
/// between pages simply drop out without shifting later pages.
pub fn unmatched_after(
    conn: &Connection,
    source: Option<GuideSite>,
    after_id: i64,
    limit: usize,
) -> Result<Vec<GuideReference>, OperationError> {
    let limit = limit as i64;
    let rows = match source {
        Some(site) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REFERENCE_COLUMNS} FROM guide_references
                 WHERE matched_entry_id IS NULL AND source = ?1 AND id > ?2
                 ORDER BY id LIMIT ?3"
            ))?;
            stmt.query_map(params![site.as_str(), after_id, limit], row_to_reference)?
                .collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REFERENCE_COLUMNS} FROM guide_references
                 WHERE matched_entry_id IS NULL AND id > ?1
                 ORDER BY id LIMIT ?2"
            ))?;
            stmt.query_map(params![after_id, limit], row_to_reference)?
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(rows)
}

/// URL of the active guide for an entry and source.
pub fn active_guide(
    conn: &Connection,
    entry_id: i64,
    source: GuideSite,
) -> Result<Option<String>, OperationError> {
    conn.query_row(
        "SELECT url FROM active_guides WHERE entry_id = ?1 AND source = ?2",
        params![entry_id, source.as_str()],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Per-source reference counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub source: String,
    pub references: i64,
    pub matched: i64,
    pub active: i64,
}

impl SourceStats {
    pub fn unmatched(&self) -> i64 {
        self.references - self.matched
    }
}

/// A saved crawl cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorRow {
    pub source_key: String,
    pub cursor: String,
    pub updated_at: String,
}

/// A held run lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRow {
    pub source_key: String,
    pub holder: String,
    pub acquired_at: String,
}

/// Summary statistics for the guide database.
#[derive(Debug, Clone, Default)]
pub struct GuideStats {
    pub catalog_entries: i64,
    pub identifiers: i64,
    pub sources: Vec<SourceStats>,
    pub cursors: Vec<CursorRow>,
    pub locks: Vec<LockRow>,
}

impl GuideStats {
    pub fn total_references(&self) -> i64 {
        self.sources.iter().map(|s| s.references).sum()
    }

    pub fn total_matched(&self) -> i64 {
        self.sources.iter().map(|s| s.matched).sum()
    }
}

/// Get summary statistics.
pub fn guide_stats(conn: &Connection) -> Result<GuideStats, OperationError> {
    let count =
        |sql: &str| -> Result<i64, rusqlite::Error> { conn.query_row(sql, [], |row| row.get(0)) };

    let catalog_entries = count("SELECT COUNT(*) FROM catalog_entries")?;
    let identifiers = count("SELECT COUNT(*) FROM catalog_identifiers")?;

    let mut stmt = conn.prepare(
        "SELECT r.source,
                COUNT(*),
                COUNT(r.matched_entry_id),
                (SELECT COUNT(*) FROM active_guides a WHERE a.source = r.source)
         FROM guide_references r
         GROUP BY r.source
         ORDER BY r.source",
    )?;
    let sources = stmt
        .query_map([], |row| {
            Ok(SourceStats {
                source: row.get(0)?,
                references: row.get(1)?,
                matched: row.get(2)?,
                active: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GuideStats {
        catalog_entries,
        identifiers,
        sources,
        cursors: list_cursors(conn)?,
        locks: list_run_locks(conn)?,
    })
}

/// All saved cursors, by source key.
pub fn list_cursors(conn: &Connection) -> Result<Vec<CursorRow>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT source_key, cursor, updated_at FROM crawl_cursors ORDER BY source_key",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(CursorRow {
            source_key: row.get(0)?,
            cursor: row.get(1)?,
            updated_at: row.get(2)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// All held run locks, by source key.
pub fn list_run_locks(conn: &Connection) -> Result<Vec<LockRow>, OperationError> {
    let mut stmt =
        conn.prepare("SELECT source_key, holder, acquired_at FROM run_locks ORDER BY source_key")?;
    let rows = stmt.query_map([], |row| {
        Ok(LockRow {
            source_key: row.get(0)?,
            holder: row.get(1)?,
            acquired_at: row.get(2)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Row Mappers ─────────────────────────────────────────────────────────────

fn row_to_reference(row: &Row) -> rusqlite::Result<GuideReference> {
    let source: String = row.get(1)?;
    let source = GuideSite::from_str(&source)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(GuideReference {
        id: row.get(0)?,
        source,
        url: row.get(2)?,
        extracted_slug: row.get(3)?,
        extracted_title: row.get(4)?,
        matched_entry_id: row.get(5)?,
        matched_at: row.get(6)?,
    })
}
