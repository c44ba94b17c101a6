//! Title normalizer.
//!
//! Guide titles and slugs arrive from search snippets, sitemap URLs and the
//! PSN trophy API, each with its own noise: HTML entities, trademark glyphs,
//! curly quotes, platform tags and edition labels. [`normalize_key`] reduces
//! all of them to one comparable key:
//!
//! ```text
//! Marvel's Spider-Man™: Remastered   →  marvels spider man remastered
//! the-last-of-us-part-ii-ps4         →  last of us part ii
//! God of War Ragnarök (PS5)          →  god of war ragnarok
//! ```
//!
//! The function is pure and idempotent: `normalize_key(normalize_key(x))`
//! equals `normalize_key(x)` for every input.

use std::borrow::Cow;

use deunicode::deunicode;
use quick_xml::escape::{resolve_html5_entity, unescape_with};

/// Longest entity we try to decode (`&CounterClockwiseContourIntegral;`).
const MAX_ENTITY_LEN: usize = 40;

/// Platform tags, only stripped at the end of the key.
const PLATFORM_SUFFIXES: &[&[&str]] = &[
    &["ps", "vita"],
    &["psvr2"],
    &["psvr"],
    &["ps5"],
    &["ps4"],
    &["ps3"],
    &["vita"],
];

/// Edition labels, only stripped at the end of the key. Longer phrases first.
const EDITION_SUFFIXES: &[&[&str]] = &[
    &["game", "of", "the", "year", "edition"],
    &["digital", "deluxe", "edition"],
    &["standard", "edition"],
    &["digital", "edition"],
    &["deluxe", "edition"],
    &["gold", "edition"],
    &["complete", "edition"],
    &["ultimate", "edition"],
    &["goty", "edition"],
    &["goty"],
];

/// Spelled-out trademark marks, removed before ASCII folding.
const MARK_SPELLINGS: &[&str] = &["(TM)", "(tm)", "(Tm)", "(R)", "(r)"];

/// Normalize a raw title or URL slug into a matching key.
///
/// # Examples
///
/// ```
/// use trophy_guides_catalog::normalize_key;
///
/// assert_eq!(
///     normalize_key("Marvel's Spider-Man™: Remastered"),
///     "marvels spider man remastered"
/// );
/// assert_eq!(normalize_key("the-last-of-us-part-ii-ps4"), "last of us part ii");
/// ```
pub fn normalize_key(raw: &str) -> String {
    let decoded = decode_html_entities(raw);
    let unmarked = strip_marks(&decoded);
    let straight = straighten_quotes(&unmarked);
    let folded = deunicode(&straight).to_lowercase();

    let mut tokens = tokenize(&folded);
    trim_affixes(&mut tokens);
    tokens.join(" ")
}

/// Decode `&name;` and `&#NN;` entities, leaving anything malformed as-is.
fn decode_html_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= MAX_ENTITY_LEN)
            .and_then(|semi| {
                let entity = &tail[..=semi];
                unescape_with(entity, resolve_html5_entity)
                    .ok()
                    .map(|text| (text.into_owned(), semi + 1))
            });

        match decoded {
            Some((text, consumed)) => {
                out.push_str(&text);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn strip_marks(s: &str) -> String {
    let mut out: String = s
        .chars()
        .filter(|c| !matches!(c, '\u{2122}' | '\u{00AE}' | '\u{00A9}' | '\u{2120}'))
        .collect();
    for mark in MARK_SPELLINGS {
        if out.contains(mark) {
            out = out.replace(mark, "");
        }
    }
    out
}

fn straighten_quotes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '`' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            other => other,
        })
        .collect()
}

/// Split into lowercase alphanumeric tokens. Quotes join their neighbours
/// (`marvel's` → `marvels`); every other non-alphanumeric run separates.
fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            current.push(c);
        } else if c == '\'' || c == '"' {
            continue;
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Strip trailing platform/edition tags and leading `the` until nothing
/// changes. Never removes the last remaining token.
fn trim_affixes(tokens: &mut Vec<String>) {
    loop {
        let before = tokens.len();

        strip_suffix(tokens, PLATFORM_SUFFIXES);
        strip_suffix(tokens, EDITION_SUFFIXES);
        while tokens.len() > 1 && tokens[0] == "the" {
            tokens.remove(0);
        }

        if tokens.len() == before {
            break;
        }
    }
}

fn strip_suffix(tokens: &mut Vec<String>, suffixes: &[&[&str]]) -> bool {
    for suffix in suffixes {
        if tokens.len() <= suffix.len() {
            continue;
        }
        let tail = &tokens[tokens.len() - suffix.len()..];
        if tail.iter().zip(suffix.iter()).all(|(t, s)| t == s) {
            tokens.truncate(tokens.len() - suffix.len());
            return true;
        }
    }
    false
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
