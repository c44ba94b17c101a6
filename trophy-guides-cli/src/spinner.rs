//! Spinner display for crawl runs.
//!
//! Shows the current batch on a single spinner line and prints per-batch
//! results above it.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use trophy_guides_catalog::Cursor;
use trophy_guides_crawl::{BatchResult, CrawlProgress, CrawlSummary};

/// Crawl progress reporter backed by one indicatif spinner.
pub(crate) struct CrawlSpinner {
    pb: ProgressBar,
}

impl CrawlSpinner {
    /// When `quiet` is true the spinner is hidden.
    pub(crate) fn new(quiet: bool) -> Self {
        let pb = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("  {spinner:.cyan} {msg}")
                    .expect("static pattern")
                    .tick_chars("/-\\|"),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        };
        Self { pb }
    }
}

impl CrawlProgress for CrawlSpinner {
    fn on_batch_start(&self, source_key: &str, batch: usize, cursor: &Cursor) {
        self.pb
            .set_message(format!("{}: batch {} from {}", source_key, batch, cursor));
    }

    fn on_batch(&self, source_key: &str, r: &BatchResult) {
        self.pb.suspend(|| {
            let errors = if r.errors > 0 {
                format!(", {} errors", r.errors)
                    .if_supports_color(Stderr, |t| t.red())
                    .to_string()
            } else {
                String::new()
            };
            log::info!(
                "  {} {} found, {} new, {} matched, {} unmatched{}",
                format!("{}:", source_key).if_supports_color(Stderr, |t| t.cyan()),
                r.found,
                r.new,
                r.matched,
                r.unmatched,
                errors,
            );
        });
    }

    fn on_wait(&self, duration: Duration, cooldown: bool) {
        if cooldown {
            self.pb.suspend(|| {
                log::warn!(
                    "  {} Too many failures; cooling down for {}s",
                    "\u{26A0}".if_supports_color(Stderr, |t| t.yellow()),
                    duration.as_secs(),
                );
            });
            self.pb.set_message("cooling down...");
        } else {
            self.pb
                .set_message(format!("waiting {}s before next batch", duration.as_secs()));
        }
    }

    fn on_complete(&self, _source_key: &str, _summary: &CrawlSummary) {
        self.pb.finish_and_clear();
    }
}

impl Drop for CrawlSpinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}
