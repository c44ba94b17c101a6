//! Match result types.
//!
//! Strict resolution returns a [`Resolution`], which has no fuzzy variant:
//! the guide-reference matcher cannot produce a partial match even by
//! accident. The opt-in auto-merge path returns the wider [`MatchOutcome`].

use trophy_guides_catalog::CatalogEntry;

/// Which rule produced an exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Alternate identifier (e.g. PSN trophy-set id)
    Identifier,
    /// Raw slug equality
    ExactSlug,
    /// Normalized slug equality
    NormalizedSlug,
    /// Normalized title equality
    NormalizedTitle,
    /// Candidate title matched a catalog slug's normalized key
    TitleAsSlug,
    /// Candidate slug matched a catalog title's normalized key
    SlugAsTitle,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::ExactSlug => "exact-slug",
            Self::NormalizedSlug => "normalized-slug",
            Self::NormalizedTitle => "normalized-title",
            Self::TitleAsSlug => "title-as-slug",
            Self::SlugAsTitle => "slug-as-title",
        }
    }
}

/// An exact-key match against the catalog.
#[derive(Debug, Clone, Copy)]
pub struct ExactMatch<'a> {
    pub entry: &'a CatalogEntry,
    pub strategy: MatchStrategy,
    /// The hit key is shared by several catalog entries; `entry` is the
    /// first one indexed.
    pub ambiguous: bool,
}

/// A similarity-based match, only produced by auto-merge.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatch<'a> {
    pub entry: &'a CatalogEntry,
    pub score: f64,
}

/// Result of strict resolution.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    NoMatch,
    Exact(ExactMatch<'a>),
}

impl<'a> Resolution<'a> {
    pub fn entry(&self) -> Option<&'a CatalogEntry> {
        match self {
            Self::NoMatch => None,
            Self::Exact(m) => Some(m.entry),
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

/// Result of auto-merge.
#[derive(Debug, Clone, Copy)]
pub enum MatchOutcome<'a> {
    NoMatch,
    Exact(ExactMatch<'a>),
    Fuzzy(FuzzyMatch<'a>),
}

impl<'a> MatchOutcome<'a> {
    pub fn entry(&self) -> Option<&'a CatalogEntry> {
        match self {
            Self::NoMatch => None,
            Self::Exact(m) => Some(m.entry),
            Self::Fuzzy(m) => Some(m.entry),
        }
    }

    /// Confidence in `0..=100`; exact matches are 100.
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::NoMatch => None,
            Self::Exact(_) => Some(100.0),
            Self::Fuzzy(m) => Some(m.score),
        }
    }
}

impl<'a> From<Resolution<'a>> for MatchOutcome<'a> {
    fn from(resolution: Resolution<'a>) -> Self {
        match resolution {
            Resolution::NoMatch => Self::NoMatch,
            Resolution::Exact(m) => Self::Exact(m),
        }
    }
}
