//! Crawl progress reporting.

use std::time::Duration;

use trophy_guides_catalog::Cursor;

use crate::batch::BatchResult;
use crate::crawler::CrawlSummary;

/// Trait for receiving crawl progress updates.
pub trait CrawlProgress {
    /// Called before each batch is fetched.
    fn on_batch_start(&self, source_key: &str, batch: usize, cursor: &Cursor);

    /// Called after each batch completes.
    fn on_batch(&self, source_key: &str, result: &BatchResult);

    /// Called when the loop waits between batches.
    fn on_wait(&self, duration: Duration, cooldown: bool);

    /// Called when the run ends.
    fn on_complete(&self, source_key: &str, summary: &CrawlSummary);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl CrawlProgress for SilentProgress {
    fn on_batch_start(&self, _source_key: &str, _batch: usize, _cursor: &Cursor) {}
    fn on_batch(&self, _source_key: &str, _result: &BatchResult) {}
    fn on_wait(&self, _duration: Duration, _cooldown: bool) {}
    fn on_complete(&self, _source_key: &str, _summary: &CrawlSummary) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl CrawlProgress for LogProgress {
    fn on_batch_start(&self, source_key: &str, batch: usize, cursor: &Cursor) {
        log::debug!("{}: batch {} from {}", source_key, batch, cursor);
    }

    fn on_batch(&self, source_key: &str, r: &BatchResult) {
        log::info!(
            "{}: found {}, new {}, skipped {}, matched {}, unmatched {}, errors {}",
            source_key,
            r.found,
            r.new,
            r.skipped,
            r.matched,
            r.unmatched,
            r.errors
        );
    }

    fn on_wait(&self, duration: Duration, cooldown: bool) {
        if cooldown {
            log::warn!("Cooling down for {}s", duration.as_secs());
        } else {
            log::debug!("Pausing {}s before next batch", duration.as_secs());
        }
    }

    fn on_complete(&self, source_key: &str, summary: &CrawlSummary) {
        log::info!(
            "{}: {} batches, {} found, {} new, {} matched",
            source_key,
            summary.batches,
            summary.found,
            summary.new,
            summary.matched
        );
    }
}
