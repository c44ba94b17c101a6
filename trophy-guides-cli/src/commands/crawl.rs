use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use rusqlite::Connection;

use trophy_guides_crawl::{
    CrawlError, CrawlOptions, CrawlProgress, CrawlSummary, Crawler, CsvListSource, GuideSource,
    Pacer, SitemapSource, SqliteGuideStore,
};

use crate::CliError;
use crate::cli_types::{CrawlAction, CrawlArgs};
use crate::settings::Settings;
use crate::spinner::CrawlSpinner;

use super::load_index;

/// Run a crawl against one source.
pub(crate) fn run_crawl(
    conn: &Connection,
    settings: &Settings,
    action: CrawlAction,
    quiet: bool,
) -> Result<(), CliError> {
    let (mut source, args): (Box<dyn GuideSource>, CrawlArgs) = match action {
        CrawlAction::Sitemap { site, url, args } => {
            let source = SitemapSource::new(site, url).map_err(CrawlError::from)?;
            (Box::new(source), args)
        }
        CrawlAction::Csv { site, file, args } => {
            let source = CsvListSource::open(site, &file)
                .map_err(|e| CliError::input(format!("{}: {}", file.display(), e)))?;
            log::info!("Loaded {} rows from {}", source.len(), file.display());
            (Box::new(source), args)
        }
    };

    if args.dry_run {
        log::info!(
            "{}",
            "Dry run: nothing will be written".if_supports_color(Stdout, |t| t.yellow()),
        );
    }

    let cancel = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(Arc::clone(&cancel));

    let spinner = CrawlSpinner::new(quiet);
    let summary = crawl_source(conn, settings, source.as_mut(), &args, &spinner, cancel)?;
    drop(spinner);

    print_summary(source.key(), &summary);
    Ok(())
}

/// Crawl one source until it is exhausted or `cancel` is set.
///
/// The run lock is released on every exit path that returns.
pub(crate) fn crawl_source(
    conn: &Connection,
    settings: &Settings,
    source: &mut dyn GuideSource,
    args: &CrawlArgs,
    progress: &dyn CrawlProgress,
    cancel: Arc<AtomicBool>,
) -> Result<CrawlSummary, CliError> {
    let index = load_index(conn)?;
    let store = SqliteGuideStore::new(conn);
    let pacer = Pacer::new(request_delay(args, settings));

    let summary = Crawler::new(&store, &index, pacer, crawl_options(args, settings))
        .with_cancel_flag(cancel)
        .run(source, progress)?;
    Ok(summary)
}

/// First Ctrl-C stops the crawl after the current batch; a second one exits
/// at once and leaves the run lock behind.
fn install_interrupt_handler(cancel: Arc<AtomicBool>) {
    let result = ctrlc::set_handler(move || {
        if cancel.swap(true, Ordering::SeqCst) {
            log::warn!("Aborted; the run lock stays until it goes stale or --force-lock");
            std::process::exit(130);
        }
        log::warn!("Interrupted; finishing the current batch (Ctrl-C again to abort)");
    });
    if let Err(e) = result {
        log::warn!("Could not install Ctrl-C handler: {}", e);
    }
}

/// Settings-file options with command-line overrides applied.
pub(crate) fn crawl_options(args: &CrawlArgs, settings: &Settings) -> CrawlOptions {
    let mut options = settings.crawl_options();
    if let Some(n) = args.batch_size {
        options.batch.batch_size = n.max(1);
    }
    if let Some(secs) = args.batch_pause_secs {
        options.batch_pause = Duration::from_secs(secs);
    }
    options.batch.dry_run = args.dry_run;
    options.max_batches = args.max_batches;
    options.force_lock = args.force_lock;
    options.reset_cursor = args.reset_cursor;
    options
}

pub(crate) fn request_delay(args: &CrawlArgs, settings: &Settings) -> Duration {
    args.delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.request_delay())
}

fn print_summary(source_key: &str, s: &CrawlSummary) {
    crate::log_blank();
    log::info!(
        "{}",
        format!("Crawl summary for {}", source_key).if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Batches:    {:>8}", s.batches);
    log::info!("  Found:      {:>8}", s.found);
    log::info!("  New:        {:>8}", s.new);
    log::info!("  Skipped:    {:>8} (already stored)", s.skipped);
    log::info!(
        "  Matched:    {:>8}",
        s.matched.if_supports_color(Stdout, |t| t.green()),
    );
    log::info!("  Unmatched:  {:>8}", s.unmatched);
    if s.ambiguous > 0 {
        log::info!(
            "  Ambiguous:  {:>8}",
            s.ambiguous.if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    if s.errors > 0 {
        log::info!(
            "  Errors:     {:>8} ({} cooldowns)",
            s.errors.if_supports_color(Stdout, |t| t.red()),
            s.cooldowns,
        );
    }

    let state = if s.cancelled {
        "cancelled".if_supports_color(Stdout, |t| t.yellow()).to_string()
    } else if s.exhausted {
        "source exhausted; next run starts over"
            .if_supports_color(Stdout, |t| t.green())
            .to_string()
    } else {
        format!("next run resumes at {}", s.final_cursor)
    };
    log::info!("  Status:     {}", state);
}

#[cfg(test)]
#[path = "../tests/crawl_tests.rs"]
mod tests;
