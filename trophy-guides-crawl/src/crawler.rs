//! The crawl/backfill loop.
//!
//! Runs batches against one source until it is exhausted, a batch limit is
//! hit, or the operator cancels. The cursor is persisted after every batch,
//! so a crashed or interrupted run resumes where it stopped; URL uniqueness
//! makes re-running a batch harmless.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use trophy_guides_catalog::Cursor;
use trophy_guides_db::OperationError;
use trophy_guides_match::CatalogIndex;

use crate::batch::{BatchOptions, BatchResult, run_batch};
use crate::breaker::{BreakerConfig, CircuitBreaker};
use crate::error::CrawlError;
use crate::pacer::Pacer;
use crate::progress::CrawlProgress;
use crate::source::GuideSource;
use crate::store::GuideStore;

/// Default pause between batches.
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_secs(30);

/// Default age after which another run may take over a lock.
pub const DEFAULT_LOCK_STALE_HOURS: i64 = 6;

/// Options for a whole crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub batch: BatchOptions,
    pub batch_pause: Duration,
    /// Stop after this many batches.
    pub max_batches: Option<usize>,
    pub breaker: BreakerConfig,
    pub lock_stale_after: chrono::Duration,
    /// Take the run lock even if someone else holds it.
    pub force_lock: bool,
    /// Clear the saved cursor and start from the beginning.
    pub reset_cursor: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            batch: BatchOptions::default(),
            batch_pause: DEFAULT_BATCH_PAUSE,
            max_batches: None,
            breaker: BreakerConfig::default(),
            lock_stale_after: chrono::Duration::hours(DEFAULT_LOCK_STALE_HOURS),
            force_lock: false,
            reset_cursor: false,
        }
    }
}

/// Totals over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub batches: usize,
    pub found: usize,
    pub new: usize,
    pub skipped: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub ambiguous: usize,
    pub errors: usize,
    pub attempts: usize,
    pub cooldowns: usize,
    /// Cursor the next run will start from.
    pub final_cursor: Cursor,
    pub exhausted: bool,
    pub cancelled: bool,
}

impl CrawlSummary {
    fn absorb(&mut self, batch: &BatchResult) {
        self.batches += 1;
        self.found += batch.found;
        self.new += batch.new;
        self.skipped += batch.skipped;
        self.matched += batch.matched;
        self.unmatched += batch.unmatched;
        self.ambiguous += batch.ambiguous;
        self.errors += batch.errors;
        self.attempts += batch.attempts;
    }
}

/// Holds a source's run lock and releases it on drop.
struct RunLockGuard<'a> {
    store: &'a dyn GuideStore,
    source_key: String,
    holder: String,
}

impl<'a> RunLockGuard<'a> {
    fn acquire(
        store: &'a dyn GuideStore,
        source_key: &str,
        holder: &str,
        options: &CrawlOptions,
    ) -> Result<Self, CrawlError> {
        let stale_after = options.lock_stale_after;
        match store.acquire_lock(source_key, holder, stale_after, options.force_lock) {
            Ok(()) => Ok(Self {
                store,
                source_key: source_key.to_string(),
                holder: holder.to_string(),
            }),
            Err(OperationError::LockHeld {
                source_key,
                holder,
                acquired_at,
            }) => Err(CrawlError::Lock {
                source_key,
                holder,
                acquired_at,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for RunLockGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.store.release_lock(&self.source_key, &self.holder) {
            log::warn!("Failed to release run lock for {}: {}", self.source_key, e);
        }
    }
}

/// Drives batches for one source at a time.
pub struct Crawler<'a> {
    store: &'a dyn GuideStore,
    index: &'a CatalogIndex,
    pacer: Pacer,
    options: CrawlOptions,
    cancel: Arc<AtomicBool>,
    holder: String,
}

impl<'a> Crawler<'a> {
    pub fn new(
        store: &'a dyn GuideStore,
        index: &'a CatalogIndex,
        pacer: Pacer,
        options: CrawlOptions,
    ) -> Self {
        Self {
            store,
            index,
            pacer,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
            holder: format!("pid {}", std::process::id()),
        }
    }

    /// Share an externally owned cancel flag (e.g. set by a Ctrl-C handler).
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Name recorded as the run lock holder.
    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = holder.into();
        self
    }

    /// Flag that stops the run between batches once set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Crawl `source` until exhausted, cancelled, or `max_batches` is hit.
    ///
    /// Only store and lock failures end the run early. On a store failure
    /// the cursor of the failing batch has not been saved.
    pub fn run(
        &mut self,
        source: &mut dyn GuideSource,
        progress: &dyn CrawlProgress,
    ) -> Result<CrawlSummary, CrawlError> {
        let key = source.key().to_string();
        let _lock = RunLockGuard::acquire(self.store, &key, &self.holder, &self.options)?;

        let mut cursor = if self.options.reset_cursor {
            if !self.options.batch.dry_run && self.store.clear_cursor(&key)? {
                log::info!("{}: saved cursor cleared", key);
            }
            Cursor::start()
        } else {
            self.store.last_cursor(&key)?.unwrap_or_default()
        };
        log::info!("{}: starting at {}", key, cursor);

        let mut breaker = CircuitBreaker::new(self.options.breaker);
        let mut summary = CrawlSummary::default();

        loop {
            if self.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            progress.on_batch_start(&key, summary.batches + 1, &cursor);
            let batch = run_batch(
                source,
                self.store,
                self.index,
                &cursor,
                &mut self.pacer,
                &self.options.batch,
            )?;
            summary.absorb(&batch);
            progress.on_batch(&key, &batch);

            // An exhausted source wraps around: the next run re-walks the
            // listing and only picks up URLs it has not stored yet.
            let next = batch.next_cursor.clone().unwrap_or_default();
            if !self.options.batch.dry_run {
                self.store.save_cursor(&key, &next)?;
            }
            cursor = next;

            if batch.exhausted {
                summary.exhausted = true;
                break;
            }
            if self.options.max_batches.is_some_and(|max| summary.batches >= max) {
                break;
            }

            let completed = if breaker.record(batch.health()) {
                summary.cooldowns += 1;
                progress.on_wait(breaker.config().cooldown, true);
                breaker.cool_down(&self.pacer, &self.cancel)
            } else {
                progress.on_wait(self.options.batch_pause, false);
                self.pacer.pause(self.options.batch_pause, &self.cancel)
            };
            if !completed {
                summary.cancelled = true;
                break;
            }
        }

        summary.final_cursor = cursor;
        progress.on_complete(&key, &summary);
        Ok(summary)
    }
}
