//! Data model types for the guide catalog.
//!
//! These types represent the persistent schema: canonical catalog entries,
//! guide references discovered on third-party sites, and crawl cursors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

// ── Catalog ─────────────────────────────────────────────────────────────────

/// A canonical game in the catalog.
///
/// Only the fields needed for matching are carried here; the catalog read
/// path never hydrates anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub title: String,
    pub slug: String,
    /// Platform-specific identifiers, e.g. PSN trophy-set ids (`NPWR12345_00`).
    #[serde(default)]
    pub alternate_identifiers: Vec<String>,
}

// ── Guide Sites ─────────────────────────────────────────────────────────────

/// Third-party site a trophy guide was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideSite {
    PsnProfiles,
    PlayStationTrophies,
    PowerPyx,
}

impl GuideSite {
    pub const ALL: [GuideSite; 3] = [
        GuideSite::PsnProfiles,
        GuideSite::PlayStationTrophies,
        GuideSite::PowerPyx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PsnProfiles => "psnprofiles",
            Self::PlayStationTrophies => "playstationtrophies",
            Self::PowerPyx => "powerpyx",
        }
    }

    /// Human-readable site name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PsnProfiles => "PSNProfiles",
            Self::PlayStationTrophies => "PlayStationTrophies",
            Self::PowerPyx => "PowerPyx",
        }
    }

    /// Guess the site from a guide URL's host.
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.to_ascii_lowercase();
        let host = lower
            .split_once("://")
            .map_or(lower.as_str(), |(_, rest)| rest)
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let host = host.strip_prefix("www.").unwrap_or(host);
        match host {
            "psnprofiles.com" => Some(Self::PsnProfiles),
            "playstationtrophies.org" => Some(Self::PlayStationTrophies),
            "powerpyx.com" => Some(Self::PowerPyx),
            _ => None,
        }
    }
}

impl fmt::Display for GuideSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuideSite {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "psnprofiles" | "psnp" => Ok(Self::PsnProfiles),
            "playstationtrophies" | "pst" => Ok(Self::PlayStationTrophies),
            "powerpyx" | "ppx" => Ok(Self::PowerPyx),
            other => Err(CatalogError::unknown_site(other)),
        }
    }
}

// ── Guide References ────────────────────────────────────────────────────────

/// A guide URL discovered on a third-party site.
///
/// Created unmatched; `matched_entry_id` is set at most once and never
/// cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideReference {
    pub id: i64,
    pub source: GuideSite,
    pub url: String,
    pub extracted_slug: Option<String>,
    pub extracted_title: Option<String>,
    pub matched_entry_id: Option<i64>,
    pub matched_at: Option<String>,
}

impl GuideReference {
    pub fn is_matched(&self) -> bool {
        self.matched_entry_id.is_some()
    }
}

/// A raw `(title, url)` pair as produced by a guide source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredGuide {
    pub url: String,
    pub title: Option<String>,
    /// Platform identifier when the source knows one (e.g. a trophy-set id).
    pub identifier: Option<String>,
}

impl DiscoveredGuide {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            identifier: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = if title.trim().is_empty() {
            None
        } else {
            Some(title)
        };
        self
    }
}

// ── Cursors ─────────────────────────────────────────────────────────────────

/// Opaque crawl position. The empty cursor means "from the start".
///
/// Each source decides what the string holds (an offset, an id, a
/// timestamp); the crawl loop only stores and hands it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn start() -> Self {
        Self(String::new())
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_offset(offset: u64) -> Self {
        Self(offset.to_string())
    }

    pub fn is_start(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the cursor as a numeric offset. The start cursor is 0.
    pub fn offset(&self) -> Result<u64, CatalogError> {
        if self.is_start() {
            return Ok(0);
        }
        self.0
            .parse()
            .map_err(|_| CatalogError::InvalidCursor(self.0.clone()))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_start() {
            f.write_str("<start>")
        } else {
            f.write_str(&self.0)
        }
    }
}
