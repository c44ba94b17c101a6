use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use rusqlite::Connection;

use trophy_guides_catalog::GuideSite;
use trophy_guides_crawl::{RematchOptions, SqliteGuideStore, rematch_unmatched};

use crate::CliError;
use crate::settings::Settings;

use super::load_index;

/// Re-run the strict resolver over stored unmatched guides.
pub(crate) fn run_rematch(
    conn: &Connection,
    settings: &Settings,
    site: Option<GuideSite>,
    batch_size: Option<usize>,
    dry_run: bool,
) -> Result<(), CliError> {
    let index = load_index(conn)?;
    let store = SqliteGuideStore::new(conn);
    let options = RematchOptions {
        source: site,
        page_size: batch_size.unwrap_or(settings.crawl.rematch_page_size),
        dry_run,
    };

    match site {
        Some(site) => log::info!("Rematching unmatched {} guides", site.display_name()),
        None => log::info!("Rematching unmatched guides from every source"),
    }

    let stats = rematch_unmatched(&store, &index, &options)?;

    crate::log_blank();
    log::info!(
        "{}",
        "Rematch Summary".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Scanned:          {:>8}", stats.scanned);
    log::info!(
        "  Matched:          {:>8}{}",
        stats.matched.if_supports_color(Stdout, |t| t.green()),
        if dry_run { " (dry run)" } else { "" },
    );
    log::info!("  Newly active:     {:>8}", stats.activated);
    if stats.ambiguous > 0 {
        log::info!(
            "  Ambiguous:        {:>8}",
            stats.ambiguous.if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    log::info!("  Still unmatched:  {:>8}", stats.still_unmatched);
    Ok(())
}
