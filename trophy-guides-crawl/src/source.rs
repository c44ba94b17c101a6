//! The guide source capability.
//!
//! A source walks one external listing (a sitemap, a local list, an API)
//! and hands back raw `(title, url)` candidates one batch at a time. The
//! crawl loop owns cursors, pacing policy and persistence; sources only
//! fetch and extract.

use trophy_guides_catalog::{Cursor, DiscoveredGuide, GuideSite};

use crate::error::FetchError;
use crate::pacer::Pacer;

/// One batch worth of discovery.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Candidates, de-duplicated by URL within this call.
    pub candidates: Vec<DiscoveredGuide>,
    /// Entries that could not be read; counted, never fatal.
    pub rejected: Vec<FetchError>,
    /// Where the next batch starts. `None` once the listing is exhausted.
    pub next_cursor: Option<Cursor>,
    /// External requests made for this batch.
    pub requests: usize,
    /// Requests among `requests` that failed without failing the batch.
    pub failed_requests: usize,
}

impl Discovery {
    pub fn is_exhausted(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// A pluggable external listing of guide URLs.
pub trait GuideSource {
    /// Stable key used for cursors and run locks, e.g. `psnprofiles:sitemap`.
    fn key(&self) -> &str;

    /// The site every candidate from this source belongs to.
    fn site(&self) -> GuideSite;

    /// Fetch up to `batch_size` candidates starting at `cursor`.
    ///
    /// Implementations call [`Pacer::wait_turn`] before every external
    /// request. Cursors must advance monotonically.
    fn discover(
        &mut self,
        cursor: &Cursor,
        batch_size: usize,
        pacer: &mut Pacer,
    ) -> Result<Discovery, FetchError>;
}

/// Page through an in-memory list with an offset cursor.
///
/// Shared by sources that load their whole listing up front.
pub(crate) fn page_by_offset(
    items: &[DiscoveredGuide],
    cursor: &Cursor,
    batch_size: usize,
) -> Result<(Vec<DiscoveredGuide>, Option<Cursor>), FetchError> {
    let offset = usize::try_from(cursor.offset()?).unwrap_or(usize::MAX);
    let start = offset.min(items.len());
    let end = start.saturating_add(batch_size.max(1)).min(items.len());

    let page = items[start..end].to_vec();
    let next = (end < items.len()).then(|| Cursor::from_offset(end as u64));
    Ok((page, next))
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
