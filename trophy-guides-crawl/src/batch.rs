//! A single crawl batch: discover, de-duplicate, resolve, persist.

use std::collections::HashSet;

use trophy_guides_catalog::Cursor;
use trophy_guides_match::{CatalogIndex, MatchResolver, Resolution};

use crate::breaker::BatchHealth;
use crate::error::{CrawlError, FetchError};
use crate::pacer::Pacer;
use crate::source::GuideSource;
use crate::store::{GuideStore, UpsertOutcome, upsert_reference};

/// Default number of candidates requested per batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Options for one batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub batch_size: usize,
    /// Resolve but never write.
    pub dry_run: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            dry_run: false,
        }
    }
}

/// Counts for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Cursor the batch started from.
    pub cursor: Cursor,
    /// Cursor to continue from; `None` if the source is exhausted.
    pub next_cursor: Option<Cursor>,
    pub exhausted: bool,
    /// Distinct candidate URLs discovered.
    pub found: usize,
    /// Candidates whose URL was not stored yet.
    pub new: usize,
    /// Candidates whose URL was already stored.
    pub skipped: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Matches whose key was shared by several catalog entries.
    pub ambiguous: usize,
    /// Failed requests, unreadable entries and non-guide URLs.
    pub errors: usize,
    /// External requests made.
    pub attempts: usize,
}

impl BatchResult {
    fn starting_at(cursor: &Cursor) -> Self {
        Self {
            cursor: cursor.clone(),
            ..Default::default()
        }
    }

    pub fn health(&self) -> BatchHealth {
        BatchHealth {
            errors: self.errors,
            attempts: self.attempts,
            found: self.found,
        }
    }
}

/// Run one batch against `source`, starting at `cursor`.
///
/// Transient fetch failures end the batch early with the cursor unchanged
/// and are counted, not returned. A store failure aborts with
/// [`CrawlError::Store`]; nothing about the cursor has been persisted at
/// that point, so the caller can retry from the same position.
pub fn run_batch(
    source: &mut dyn GuideSource,
    store: &dyn GuideStore,
    index: &CatalogIndex,
    cursor: &Cursor,
    pacer: &mut Pacer,
    options: &BatchOptions,
) -> Result<BatchResult, CrawlError> {
    let mut result = BatchResult::starting_at(cursor);
    let requests_before = pacer.requests();

    let discovery = match source.discover(cursor, options.batch_size, pacer) {
        Ok(discovery) => discovery,
        Err(e @ FetchError::InvalidCursor(_)) => return Err(e.into()),
        Err(e) => {
            log::warn!("{}: batch at {} failed: {}", source.key(), cursor, e);
            result.attempts = (pacer.requests() - requests_before).max(1);
            result.errors = 1;
            result.next_cursor = Some(cursor.clone());
            return Ok(result);
        }
    };

    result.attempts = discovery.requests;
    result.errors = discovery.failed_requests + discovery.rejected.len();
    for rejected in &discovery.rejected {
        log::debug!("{}: rejected entry: {}", source.key(), rejected);
    }

    let site = source.site();
    let resolver = MatchResolver::new(index);
    let mut seen = HashSet::new();

    for guide in &discovery.candidates {
        if !seen.insert(guide.url.as_str()) {
            continue;
        }
        result.found += 1;

        match upsert_reference(store, &resolver, site, guide, options.dry_run)? {
            UpsertOutcome::Skipped => result.skipped += 1,
            UpsertOutcome::NotAGuide => {
                result.errors += 1;
                log::debug!("{}: not a guide page: {}", source.key(), guide.url);
            }
            UpsertOutcome::Inserted { resolution, .. } => {
                result.new += 1;
                match resolution {
                    Resolution::Exact(m) => {
                        result.matched += 1;
                        if m.ambiguous {
                            result.ambiguous += 1;
                        }
                        log::debug!(
                            "Matched {} -> '{}' via {}",
                            guide.url,
                            m.entry.title,
                            m.strategy.as_str()
                        );
                    }
                    Resolution::NoMatch => {
                        result.unmatched += 1;
                        log::debug!("No match for {}", guide.url);
                    }
                }
            }
        }
    }

    result.exhausted = discovery.next_cursor.is_none();
    result.next_cursor = discovery.next_cursor;
    Ok(result)
}
