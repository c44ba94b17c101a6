use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use rusqlite::Connection;

use crate::CliError;

pub(crate) fn run_stats(conn: &Connection, db_path: &Path) -> Result<(), CliError> {
    let stats = trophy_guides_db::guide_stats(conn)
        .map_err(|e| CliError::database(format!("Failed to query guide stats: {}", e)))?;

    log::info!(
        "{}",
        "Guide Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    crate::log_blank();
    log::info!("  Catalog entries: {:>8}", stats.catalog_entries);
    log::info!("  Identifiers:     {:>8}", stats.identifiers);
    log::info!("  Guides:          {:>8}", stats.total_references());
    log::info!("  Matched:         {:>8}", stats.total_matched());

    if !stats.sources.is_empty() {
        crate::log_blank();
        log::info!(
            "  {:<22} {:>8} {:>8} {:>10} {:>8}",
            "Source", "Guides", "Matched", "Unmatched", "Active"
        );
        for s in &stats.sources {
            log::info!(
                "  {:<22} {:>8} {:>8} {:>10} {:>8}",
                s.source.if_supports_color(Stdout, |t| t.cyan()),
                s.references,
                s.matched,
                s.unmatched(),
                s.active,
            );
        }
    }

    if !stats.cursors.is_empty() {
        crate::log_blank();
        log::info!("{}", "  Cursors".if_supports_color(Stdout, |t| t.bold()));
        for c in &stats.cursors {
            log::info!(
                "  {:<30} {:<12} {}",
                c.source_key,
                c.cursor,
                c.updated_at.if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }

    if !stats.locks.is_empty() {
        crate::log_blank();
        log::info!("{}", "  Run locks".if_supports_color(Stdout, |t| t.bold()));
        for l in &stats.locks {
            let age = trophy_guides_db::lock_age(&l.acquired_at)
                .map(|d| format!("{}m", d.num_minutes()))
                .unwrap_or_else(|| "?".to_string());
            log::info!(
                "  {:<30} {} ({} ago)",
                l.source_key,
                l.holder.if_supports_color(Stdout, |t| t.yellow()),
                age,
            );
        }
    }

    Ok(())
}
