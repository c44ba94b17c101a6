//! Strict match resolver for guide references.
//!
//! Strategies are tried in order and the first hit wins:
//!
//! 0. alternate identifier (only when the candidate carries one)
//! 1. exact slug
//! 2. normalized slug
//! 3. normalized title
//! 4. cross fallback: normalized title against catalog slugs, then
//!    normalized slug against catalog titles
//!
//! Every step is key equality. There is deliberately no substring or fuzzy
//! step: `mass-effect` must never resolve to `mass-effect-andromeda`.

use trophy_guides_catalog::normalize_key;

use crate::index::{CatalogIndex, KeyKind, identifier_key, slug_key};
use crate::outcome::{ExactMatch, MatchStrategy, Resolution};

/// What we know about a guide when trying to place it in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub identifier: Option<String>,
}

impl Candidate {
    pub fn from_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Default::default()
        }
    }

    pub fn from_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_slug(mut self, slug: Option<String>) -> Self {
        self.slug = slug;
        self
    }

    pub fn with_identifier(mut self, identifier: Option<String>) -> Self {
        self.identifier = identifier;
        self
    }
}

/// Resolves candidates against a borrowed catalog index.
pub struct MatchResolver<'a> {
    index: &'a CatalogIndex,
}

impl<'a> MatchResolver<'a> {
    pub fn new(index: &'a CatalogIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a CatalogIndex {
        self.index
    }

    /// Resolve a candidate to at most one catalog entry.
    pub fn resolve(&self, candidate: &Candidate) -> Resolution<'a> {
        let identifier = candidate
            .identifier
            .as_deref()
            .map(identifier_key)
            .filter(|k| !k.is_empty());
        let raw_slug = candidate
            .slug
            .as_deref()
            .map(slug_key)
            .filter(|k| !k.is_empty());
        let normalized_slug = candidate
            .slug
            .as_deref()
            .map(normalize_key)
            .filter(|k| !k.is_empty());
        let normalized_title = candidate
            .title
            .as_deref()
            .map(normalize_key)
            .filter(|k| !k.is_empty());

        let attempts = [
            (identifier, KeyKind::Identifier, MatchStrategy::Identifier),
            (raw_slug, KeyKind::Slug, MatchStrategy::ExactSlug),
            (normalized_slug.clone(), KeyKind::NormalizedSlug, MatchStrategy::NormalizedSlug),
            (normalized_title.clone(), KeyKind::NormalizedTitle, MatchStrategy::NormalizedTitle),
            (normalized_title, KeyKind::NormalizedSlug, MatchStrategy::TitleAsSlug),
            (normalized_slug, KeyKind::NormalizedTitle, MatchStrategy::SlugAsTitle),
        ];

        for (key, kind, strategy) in attempts {
            let Some(key) = key else { continue };
            if let Some(entry) = self.index.lookup(kind, &key) {
                let ambiguous = self.index.is_ambiguous(kind, &key);
                if ambiguous {
                    log::debug!(
                        "Key '{}' ({:?}) is shared by several entries; using id {}",
                        key,
                        kind,
                        entry.id
                    );
                }
                return Resolution::Exact(ExactMatch {
                    entry,
                    strategy,
                    ambiguous,
                });
            }
        }

        Resolution::NoMatch
    }
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
