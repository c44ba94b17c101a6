pub(crate) mod crawl;
pub(crate) mod import;
pub(crate) mod inspect;
pub(crate) mod merge;
pub(crate) mod rematch;
pub(crate) mod stats;

use std::path::Path;

use rusqlite::Connection;

use trophy_guides_match::CatalogIndex;

use crate::CliError;

/// Open (or create) the guide database.
pub(crate) fn open_db(db_path: &Path) -> Result<Connection, CliError> {
    log::debug!("Using database {}", db_path.display());
    trophy_guides_db::open_database(db_path).map_err(|e| {
        CliError::database(format!(
            "Failed to open guide database at {}: {}",
            db_path.display(),
            e
        ))
    })
}

/// Build the in-memory index over the whole catalog.
pub(crate) fn load_index(conn: &Connection) -> Result<CatalogIndex, CliError> {
    let entries = trophy_guides_db::load_catalog(conn)
        .map_err(|e| CliError::database(format!("Failed to load catalog: {}", e)))?;
    let index = CatalogIndex::build(entries);
    if index.is_empty() {
        log::warn!("The catalog is empty; run 'trophy-guides import-catalog' first.");
    } else {
        log::debug!(
            "Indexed {} catalog entries ({} ambiguous keys)",
            index.len(),
            index.ambiguous_key_count()
        );
    }
    Ok(index)
}

/// Truncate a string to a maximum width (in chars), appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max).collect()
    }
}
