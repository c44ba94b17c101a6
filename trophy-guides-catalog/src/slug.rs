//! Slug helpers: building catalog slugs from titles and pulling the game
//! slug out of a guide URL.

use std::sync::LazyLock;

use deunicode::deunicode;
use regex::Regex;

use crate::types::GuideSite;

// Path component of an http(s) URL, without query or fragment.
static URL_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[^/?#]+(?P<path>/[^?#]*)?").expect("URL path pattern is valid")
});

// PSNProfiles prefixes guide slugs with a numeric guide id: `12345-`.
static LEADING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-").expect("leading id pattern is valid"));

static VALID_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is valid"));

const PSNP_SUFFIXES: &[&str] = &["-trophy-guide", "-guide"];
const POWERPYX_SUFFIXES: &[&str] = &["-trophy-guide-roadmap", "-trophy-guide", "-guide"];

/// Convert a title into a URL-safe catalog slug.
///
/// ```
/// use trophy_guides_catalog::slugify;
///
/// assert_eq!(slugify("Marvel's Spider-Man: Miles Morales"), "marvels-spider-man-miles-morales");
/// ```
pub fn slugify(title: &str) -> String {
    let folded = deunicode(title);
    let mut result = String::with_capacity(folded.len());
    let mut last_was_separator = false;

    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_separator = false;
        } else if c == '\'' || c == '\u{2019}' {
            continue;
        } else if !last_was_separator && !result.is_empty() {
            result.push('-');
            last_was_separator = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Extract the game slug from a guide URL on the given site.
///
/// Only guide pages qualify: the URL must be on the site's host and follow
/// its guide layout. Trophy lists, news, category and review pages yield
/// `None`.
///
/// ```
/// use trophy_guides_catalog::{GuideSite, extract_slug};
///
/// let url = "https://psnprofiles.com/guide/12345-god-of-war-ragnarok-trophy-guide";
/// let slug = extract_slug(GuideSite::PsnProfiles, url);
/// assert_eq!(slug.as_deref(), Some("god-of-war-ragnarok"));
///
/// let trophies = "https://psnprofiles.com/trophies/12345-god-of-war-ragnarok";
/// assert_eq!(extract_slug(GuideSite::PsnProfiles, trophies), None);
/// ```
pub fn extract_slug(site: GuideSite, url: &str) -> Option<String> {
    let url = url.trim();
    if GuideSite::from_url(url) != Some(site) {
        return None;
    }
    let caps = URL_PATH.captures(url)?;
    let path = caps.name("path")?.as_str().to_ascii_lowercase();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let slug = match site {
        // /guide/<id>-<slug>-trophy-guide
        GuideSite::PsnProfiles => {
            let segment = segment_after(&segments, "guide")?;
            let without_id = LEADING_ID.replace(segment, "");
            strip_any_suffix(&without_id, PSNP_SUFFIXES).to_string()
        }
        // /game/<slug>/guide/
        GuideSite::PlayStationTrophies => {
            let pos = segments.iter().position(|s| *s == "game")?;
            if segments.get(pos + 2) != Some(&"guide") {
                return None;
            }
            segments.get(pos + 1)?.to_string()
        }
        // /<slug>-trophy-guide-roadmap/, a single top-level segment
        GuideSite::PowerPyx => match segments.as_slice() {
            [segment] => strip_required_suffix(segment, POWERPYX_SUFFIXES)?.to_string(),
            _ => return None,
        },
    };

    VALID_SLUG.is_match(&slug).then_some(slug)
}

fn segment_after<'a>(segments: &[&'a str], marker: &str) -> Option<&'a str> {
    let pos = segments.iter().position(|s| *s == marker)?;
    segments.get(pos + 1).copied()
}

fn strip_any_suffix<'a>(s: &'a str, suffixes: &[&str]) -> &'a str {
    strip_required_suffix(s, suffixes).unwrap_or(s)
}

fn strip_required_suffix<'a>(s: &'a str, suffixes: &[&str]) -> Option<&'a str> {
    suffixes
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix).filter(|rest| !rest.is_empty()))
}

#[cfg(test)]
#[path = "tests/slug_tests.rs"]
mod tests;
