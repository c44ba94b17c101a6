//! Persistence seam for the crawl loop and the dedup/upsert rules.

use rusqlite::Connection;
use trophy_guides_catalog::{Cursor, DiscoveredGuide, GuideReference, GuideSite, extract_slug};
use trophy_guides_db::{OperationError, operations, queries};
use trophy_guides_match::{Candidate, MatchResolver, Resolution};

/// What the crawl loop needs from storage.
pub trait GuideStore {
    fn find_by_url(&self, url: &str) -> Result<Option<GuideReference>, OperationError>;

    /// Insert an unmatched reference. `None` if the URL already exists.
    fn insert_unmatched(
        &self,
        source: GuideSite,
        url: &str,
        extracted_slug: Option<&str>,
        extracted_title: Option<&str>,
    ) -> Result<Option<i64>, OperationError>;

    /// Set the match, only if the reference has none yet.
    fn mark_matched(&self, reference_id: i64, entry_id: i64) -> Result<bool, OperationError>;

    fn set_active_guide_if_empty(
        &self,
        entry_id: i64,
        source: GuideSite,
        reference_id: i64,
        url: &str,
    ) -> Result<bool, OperationError>;

    fn last_cursor(&self, source_key: &str) -> Result<Option<Cursor>, OperationError>;

    fn save_cursor(&self, source_key: &str, cursor: &Cursor) -> Result<(), OperationError>;

    /// Drop the saved cursor. `true` if there was one.
    fn clear_cursor(&self, source_key: &str) -> Result<bool, OperationError>;

    fn unmatched_after(
        &self,
        source: Option<GuideSite>,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<GuideReference>, OperationError>;

    fn acquire_lock(
        &self,
        source_key: &str,
        holder: &str,
        stale_after: chrono::Duration,
        force: bool,
    ) -> Result<(), OperationError>;

    fn release_lock(&self, source_key: &str, holder: &str) -> Result<bool, OperationError>;
}

/// [`GuideStore`] backed by the SQLite guide database.
pub struct SqliteGuideStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteGuideStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }
}

impl GuideStore for SqliteGuideStore<'_> {
    fn find_by_url(&self, url: &str) -> Result<Option<GuideReference>, OperationError> {
        queries::find_reference_by_url(self.conn, url)
    }

    fn insert_unmatched(
        &self,
        source: GuideSite,
        url: &str,
        extracted_slug: Option<&str>,
        extracted_title: Option<&str>,
    ) -> Result<Option<i64>, OperationError> {
        operations::insert_unmatched(self.conn, source, url, extracted_slug, extracted_title)
    }

    fn mark_matched(&self, reference_id: i64, entry_id: i64) -> Result<bool, OperationError> {
        operations::mark_matched(self.conn, reference_id, entry_id)
    }

    fn set_active_guide_if_empty(
        &self,
        entry_id: i64,
        source: GuideSite,
        reference_id: i64,
        url: &str,
    ) -> Result<bool, OperationError> {
        operations::set_active_guide_if_empty(self.conn, entry_id, source, reference_id, url)
    }

    fn last_cursor(&self, source_key: &str) -> Result<Option<Cursor>, OperationError> {
        Ok(operations::get_cursor(self.conn, source_key)?.map(Cursor::new))
    }

    fn save_cursor(&self, source_key: &str, cursor: &Cursor) -> Result<(), OperationError> {
        operations::save_cursor(self.conn, source_key, cursor.as_str())
    }

    fn clear_cursor(&self, source_key: &str) -> Result<bool, OperationError> {
        operations::clear_cursor(self.conn, source_key)
    }

    fn unmatched_after(
        &self,
        source: Option<GuideSite>,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<GuideReference>, OperationError> {
        queries::unmatched_after(self.conn, source, after_id, limit)
    }

    fn acquire_lock(
        &self,
        source_key: &str,
        holder: &str,
        stale_after: chrono::Duration,
        force: bool,
    ) -> Result<(), OperationError> {
        operations::acquire_run_lock(self.conn, source_key, holder, stale_after, force)
    }

    fn release_lock(&self, source_key: &str, holder: &str) -> Result<bool, OperationError> {
        operations::release_run_lock(self.conn, source_key, holder)
    }
}

/// Result of pushing one discovered guide through the store.
#[derive(Debug)]
pub enum UpsertOutcome<'a> {
    /// URL already stored; nothing written.
    Skipped,
    /// URL is not a guide page on the source's site; nothing written.
    NotAGuide,
    /// New URL. `reference_id` is `None` on dry runs.
    Inserted {
        reference_id: Option<i64>,
        resolution: Resolution<'a>,
        activated: bool,
    },
}

/// Store a discovered guide and try to match it.
///
/// Keyed by URL: a known URL is a no-op. A URL with no guide slug for
/// `site` is refused. A new URL is inserted unmatched, resolved with the
/// strict resolver, and on a hit marked matched and made the active guide
/// for its source if that slot is still empty.
pub fn upsert_reference<'a>(
    store: &dyn GuideStore,
    resolver: &MatchResolver<'a>,
    site: GuideSite,
    guide: &DiscoveredGuide,
    dry_run: bool,
) -> Result<UpsertOutcome<'a>, OperationError> {
    if store.find_by_url(&guide.url)?.is_some() {
        return Ok(UpsertOutcome::Skipped);
    }

    let Some(slug) = extract_slug(site, &guide.url) else {
        return Ok(UpsertOutcome::NotAGuide);
    };
    let candidate = Candidate::default()
        .with_title(guide.title.clone())
        .with_slug(Some(slug.clone()))
        .with_identifier(guide.identifier.clone());
    let resolution = resolver.resolve(&candidate);

    if dry_run {
        return Ok(UpsertOutcome::Inserted {
            reference_id: None,
            resolution,
            activated: false,
        });
    }

    let Some(reference_id) =
        store.insert_unmatched(site, &guide.url, Some(&slug), guide.title.as_deref())?
    else {
        return Ok(UpsertOutcome::Skipped);
    };

    let mut activated = false;
    if let Some(entry) = resolution.entry() {
        activated = apply_match(store, reference_id, entry.id, site, &guide.url)?.1;
    }

    Ok(UpsertOutcome::Inserted {
        reference_id: Some(reference_id),
        resolution,
        activated,
    })
}

/// Write a match: set it on the reference (first match only), then claim
/// the active-guide slot if it is free.
///
/// Returns `(matched, activated)`.
pub(crate) fn apply_match(
    store: &dyn GuideStore,
    reference_id: i64,
    entry_id: i64,
    site: GuideSite,
    url: &str,
) -> Result<(bool, bool), OperationError> {
    if !store.mark_matched(reference_id, entry_id)? {
        log::debug!("Reference {} already matched; leaving it", reference_id);
        return Ok((false, false));
    }
    let activated = store.set_active_guide_if_empty(entry_id, site, reference_id, url)?;
    Ok((true, activated))
}
