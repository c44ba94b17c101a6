//! Crawl external guide listings and match them to the catalog.
//!
//! This crate owns the batch loop: pluggable [`GuideSource`]s produce raw
//! candidates, [`run_batch`] de-duplicates and resolves them through the
//! [`GuideStore`], and the [`Crawler`] repeats batches with pacing, a
//! circuit breaker, persisted cursors and a per-source run lock. It also
//! hosts the two catalog maintenance passes: [`rematch_unmatched`] and
//! [`create_or_merge`].

pub mod batch;
pub mod breaker;
pub mod crawler;
pub mod create_merge;
pub mod csv_source;
pub mod error;
pub mod pacer;
pub mod progress;
pub mod rematch;
pub mod sitemap;
pub mod source;
pub mod store;

pub use batch::{BatchOptions, BatchResult, DEFAULT_BATCH_SIZE, run_batch};
pub use breaker::{BatchHealth, BreakerConfig, BreakerState, CircuitBreaker};
pub use crawler::{CrawlOptions, CrawlSummary, Crawler};
pub use create_merge::{
    MergeAction, MergeInput, MergeOptions, MergeReport, MergeStats, create_or_merge,
};
pub use csv_source::CsvListSource;
pub use error::{CrawlError, FetchError};
pub use pacer::{Clock, ManualClock, Pacer, SystemClock};
pub use progress::{CrawlProgress, LogProgress, SilentProgress};
pub use rematch::{RematchOptions, RematchStats, rematch_unmatched};
pub use sitemap::{HttpFetcher, SitemapDocument, SitemapFetch, SitemapSource, parse_sitemap};
pub use source::{Discovery, GuideSource};
pub use store::{GuideStore, SqliteGuideStore, UpsertOutcome, upsert_reference};
