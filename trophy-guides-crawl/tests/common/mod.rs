#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;
use trophy_guides_catalog::{CatalogEntry, Cursor, DiscoveredGuide, GuideReference, GuideSite};
use trophy_guides_crawl::{
    FetchError, GuideSource, GuideStore, ManualClock, Pacer, SqliteGuideStore,
};
use trophy_guides_crawl::source::Discovery;
use trophy_guides_db::{OperationError, load_catalog, upsert_catalog_entry};
use trophy_guides_match::CatalogIndex;

pub const SOURCE_KEY: &str = "powerpyx:scripted";

/// PowerPyx guide URL for a slug.
pub fn ppx(slug: &str) -> DiscoveredGuide {
    DiscoveredGuide::new(format!("https://www.powerpyx.com/{slug}-trophy-guide/"))
}

/// Seed a small catalog and build its index.
pub fn seed_catalog(conn: &Connection) -> CatalogIndex {
    let entries = [
        (1, "Returnal", "returnal"),
        (2, "Astro Bot", "astro-bot"),
        (3, "Mass Effect: Andromeda", "mass-effect-andromeda"),
    ];
    for (id, title, slug) in entries {
        upsert_catalog_entry(
            conn,
            &CatalogEntry {
                id,
                title: title.to_string(),
                slug: slug.to_string(),
                alternate_identifiers: vec![],
            },
        )
        .unwrap();
    }
    CatalogIndex::build(load_catalog(conn).unwrap())
}

pub fn manual_pacer() -> (Pacer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    (Pacer::with_clock(Duration::from_secs(2), clock.clone()), clock)
}

/// A source that pages through a fixed list, one request per batch.
pub struct ScriptedSource {
    pub items: Vec<DiscoveredGuide>,
    /// Number of upcoming calls that fail with a transient error.
    pub failures: usize,
    pub calls: usize,
}

impl ScriptedSource {
    pub fn new(items: Vec<DiscoveredGuide>) -> Self {
        Self {
            items,
            failures: 0,
            calls: 0,
        }
    }
}

impl GuideSource for ScriptedSource {
    fn key(&self) -> &str {
        SOURCE_KEY
    }

    fn site(&self) -> GuideSite {
        GuideSite::PowerPyx
    }

    fn discover(
        &mut self,
        cursor: &Cursor,
        batch_size: usize,
        pacer: &mut Pacer,
    ) -> Result<Discovery, FetchError> {
        self.calls += 1;
        pacer.wait_turn();
        if self.failures > 0 {
            self.failures -= 1;
            let url = "https://www.powerpyx.com/sitemap.xml";
            return Err(FetchError::transient(url, "HTTP 429"));
        }

        let start = (cursor.offset()? as usize).min(self.items.len());
        let end = (start + batch_size).min(self.items.len());
        Ok(Discovery {
            candidates: self.items[start..end].to_vec(),
            rejected: vec![],
            next_cursor: (end < self.items.len()).then(|| Cursor::from_offset(end as u64)),
            requests: 1,
            failed_requests: 0,
        })
    }
}

/// Wraps the SQLite store and fails every insert once `fail_inserts` is set.
pub struct FailingStore<'c> {
    pub inner: SqliteGuideStore<'c>,
    pub fail_inserts: bool,
}

impl GuideStore for FailingStore<'_> {
    fn find_by_url(&self, url: &str) -> Result<Option<GuideReference>, OperationError> {
        self.inner.find_by_url(url)
    }

    fn insert_unmatched(
        &self,
        source: GuideSite,
        url: &str,
        extracted_slug: Option<&str>,
        extracted_title: Option<&str>,
    ) -> Result<Option<i64>, OperationError> {
        if self.fail_inserts {
            return Err(OperationError::NotFound {
                entity_type: "database".to_string(),
                id: "unreachable".to_string(),
            });
        }
        self.inner.insert_unmatched(source, url, extracted_slug, extracted_title)
    }

    fn mark_matched(&self, reference_id: i64, entry_id: i64) -> Result<bool, OperationError> {
        self.inner.mark_matched(reference_id, entry_id)
    }

    fn set_active_guide_if_empty(
        &self,
        entry_id: i64,
        source: GuideSite,
        reference_id: i64,
        url: &str,
    ) -> Result<bool, OperationError> {
        self.inner.set_active_guide_if_empty(entry_id, source, reference_id, url)
    }

    fn last_cursor(&self, source_key: &str) -> Result<Option<Cursor>, OperationError> {
        self.inner.last_cursor(source_key)
    }

    fn save_cursor(&self, source_key: &str, cursor: &Cursor) -> Result<(), OperationError> {
        self.inner.save_cursor(source_key, cursor)
    }

    fn clear_cursor(&self, source_key: &str) -> Result<bool, OperationError> {
        self.inner.clear_cursor(source_key)
    }

    fn unmatched_after(
        &self,
        source: Option<GuideSite>,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<GuideReference>, OperationError> {
        self.inner.unmatched_after(source, after_id, limit)
    }

    fn acquire_lock(
        &self,
        source_key: &str,
        holder: &str,
        stale_after: chrono::Duration,
        force: bool,
    ) -> Result<(), OperationError> {
        self.inner.acquire_lock(source_key, holder, stale_after, force)
    }

    fn release_lock(&self, source_key: &str, holder: &str) -> Result<bool, OperationError> {
        self.inner.release_lock(source_key, holder)
    }
}

pub fn reference_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM guide_references", [], |row| row.get(0))
        .unwrap()
}
