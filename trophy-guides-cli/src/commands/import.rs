use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use rusqlite::Connection;
use serde::Deserialize;

use trophy_guides_catalog::{CatalogEntry, slugify};
use trophy_guides_db::OperationError;

use crate::CliError;

/// One record of a catalog import file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub alternate_identifiers: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ImportStats {
    /// Records with an id, inserted or updated in place.
    pub upserted: usize,
    /// Records without an id, inserted with a fresh id.
    pub created: usize,
    /// Records with a blank title.
    pub skipped: usize,
}

/// Upsert catalog entries from a JSON file.
pub(crate) fn run_import_catalog(conn: &Connection, file: &Path) -> Result<(), CliError> {
    let contents = std::fs::read_to_string(file)?;
    let records: Vec<CatalogRecord> = serde_json::from_str(&contents)
        .map_err(|e| CliError::input(format!("{}: {}", file.display(), e)))?;

    log::info!("Importing {} catalog records from {}", records.len(), file.display());

    let stats = import_records(conn, &records)
        .map_err(|e| CliError::database(format!("Catalog import failed: {}", e)))?;

    log::info!(
        "{} {} upserted, {} created, {} skipped",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        stats.upserted,
        stats.created,
        stats.skipped,
    );
    Ok(())
}

/// Write `records` in one transaction.
///
/// A missing slug is derived from the title. Identifiers already owned by
/// another entry are left where they are.
pub(crate) fn import_records(
    conn: &Connection,
    records: &[CatalogRecord],
) -> Result<ImportStats, OperationError> {
    let tx = conn.unchecked_transaction()?;
    let mut stats = ImportStats::default();

    for record in records {
        let title = record.title.trim();
        if title.is_empty() {
            stats.skipped += 1;
            continue;
        }
        let slug = record
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| slugify(title));

        match record.id {
            Some(id) => {
                trophy_guides_db::upsert_catalog_entry(
                    &tx,
                    &CatalogEntry {
                        id,
                        title: title.to_string(),
                        slug,
                        alternate_identifiers: record.alternate_identifiers.clone(),
                    },
                )?;
                stats.upserted += 1;
            }
            None => {
                let id = trophy_guides_db::insert_catalog_entry(&tx, title, &slug)?;
                for identifier in &record.alternate_identifiers {
                    trophy_guides_db::add_identifier(&tx, id, identifier)?;
                }
                stats.created += 1;
            }
        }
    }

    tx.commit()?;
    Ok(stats)
}

#[cfg(test)]
#[path = "../tests/import_tests.rs"]
mod tests;
