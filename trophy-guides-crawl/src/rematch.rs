//! Backfill: retry the strict resolver on stored unmatched references.
//!
//! Useful after the catalog grows. Walks unmatched rows in ascending id
//! order with keyset pagination, so rows matched along the way never shift
//! later pages.

use trophy_guides_catalog::{GuideSite, extract_slug};
use trophy_guides_match::{Candidate, CatalogIndex, MatchResolver, Resolution};

use crate::error::CrawlError;
use crate::store::{GuideStore, apply_match};

/// Default page size for the unmatched walk.
pub const DEFAULT_REMATCH_PAGE: usize = 500;

#[derive(Debug, Clone)]
pub struct RematchOptions {
    /// Only this site, or every site.
    pub source: Option<GuideSite>,
    pub page_size: usize,
    /// Report without writing.
    pub dry_run: bool,
}

impl Default for RematchOptions {
    fn default() -> Self {
        Self {
            source: None,
            page_size: DEFAULT_REMATCH_PAGE,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RematchStats {
    pub pages: usize,
    pub scanned: usize,
    pub matched: usize,
    pub ambiguous: usize,
    /// Matches that also became the active guide for their source.
    pub activated: usize,
    pub still_unmatched: usize,
}

/// Re-resolve every unmatched reference against `index`.
pub fn rematch_unmatched(
    store: &dyn GuideStore,
    index: &CatalogIndex,
    options: &RematchOptions,
) -> Result<RematchStats, CrawlError> {
    let resolver = MatchResolver::new(index);
    let page_size = options.page_size.max(1);
    let mut stats = RematchStats::default();
    let mut last_id = 0;

    loop {
        let page = store.unmatched_after(options.source, last_id, page_size)?;
        if page.is_empty() {
            break;
        }
        stats.pages += 1;

        for reference in &page {
            last_id = reference.id;
            stats.scanned += 1;

            let slug = reference
                .extracted_slug
                .clone()
                .or_else(|| extract_slug(reference.source, &reference.url));
            let candidate = Candidate::default()
                .with_title(reference.extracted_title.clone())
                .with_slug(slug);

            match resolver.resolve(&candidate) {
                Resolution::Exact(m) => {
                    if m.ambiguous {
                        stats.ambiguous += 1;
                    }
                    if options.dry_run {
                        stats.matched += 1;
                        continue;
                    }
                    let (matched, activated) = apply_match(
                        store,
                        reference.id,
                        m.entry.id,
                        reference.source,
                        &reference.url,
                    )?;
                    if matched {
                        stats.matched += 1;
                        log::debug!("Rematched {} -> '{}'", reference.url, m.entry.title);
                    }
                    if activated {
                        stats.activated += 1;
                    }
                }
                Resolution::NoMatch => stats.still_unmatched += 1,
            }
        }

        log::info!(
            "Rematch: {} scanned, {} matched so far",
            stats.scanned,
            stats.matched
        );

        if page.len() < page_size {
            break;
        }
    }

    Ok(stats)
}
