//! Similarity scoring between two normalized keys.
//!
//! The base score is the classic `similar_text` percentage: the longest
//! common substring is counted, then the same is done recursively on the
//! pieces to its left and right. On top of that:
//!
//! - a containment bonus when one key contains the other (subtitle and
//!   edition variants such as `"god of war"` vs `"god of war ragnarok"`),
//! - a normalized Levenshtein blend for short keys of similar length, where
//!   a single typo costs `similar_text` too much.
//!
//! Scores are in `0.0..=100.0` and symmetric.

use strsim::normalized_levenshtein;

/// Tunable scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreConfig {
    /// Points added when one key is a substring of the other.
    pub containment_bonus: f64,
    /// Keys longer than this never use the Levenshtein blend.
    pub blend_max_len: usize,
    /// Minimum shorter/longer length ratio for the Levenshtein blend.
    pub blend_min_length_ratio: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            containment_bonus: 15.0,
            blend_max_len: 24,
            blend_min_length_ratio: 0.8,
        }
    }
}

/// Score two keys with the default configuration.
pub fn score(a: &str, b: &str) -> f64 {
    score_with(a, b, &ScoreConfig::default())
}

/// Score two keys, `0.0..=100.0`.
///
/// ```
/// use trophy_guides_catalog::score;
///
/// assert_eq!(score("god of war", "god of war"), 100.0);
/// assert_eq!(score("abc", ""), 0.0);
/// assert_eq!(score("hello", "world"), score("world", "hello"));
/// ```
pub fn score_with(a: &str, b: &str, config: &ScoreConfig) -> f64 {
    // Canonical order: `similar_text` breaks ties by first occurrence, which
    // depends on argument order.
    let (a, b) = if a <= b { (a, b) } else { (b, a) };

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 100.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();

    let mut best = similar_text(&a_chars, &b_chars) as f64 * 2.0 * 100.0 / total as f64;

    if a.contains(b) || b.contains(a) {
        best = (best + config.containment_bonus).min(100.0);
    }

    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars.len(), b_chars.len())
    } else {
        (b_chars.len(), a_chars.len())
    };
    if long <= config.blend_max_len && short as f64 / long as f64 >= config.blend_min_length_ratio {
        best = best.max(normalized_levenshtein(a, b) * 100.0);
    }

    best.clamp(0.0, 100.0)
}

/// Number of matching characters under `similar_text` alignment.
pub fn similar_text(a: &[char], b: &[char]) -> usize {
    let Some((pos_a, pos_b, len)) = longest_common_substring(a, b) else {
        return 0;
    };

    len + similar_text(&a[..pos_a], &b[..pos_b])
        + similar_text(&a[pos_a + len..], &b[pos_b + len..])
}

/// First longest common run as `(start_in_a, start_in_b, length)`.
fn longest_common_substring(a: &[char], b: &[char]) -> Option<(usize, usize, usize)> {
    let mut best: Option<(usize, usize, usize)> = None;

    for i in 0..a.len() {
        for j in 0..b.len() {
            let mut k = 0;
            while i + k < a.len() && j + k < b.len() && a[i + k] == b[j + k] {
                k += 1;
            }
            if k > best.map_or(0, |(_, _, len)| len) {
                best = Some((i, j, k));
            }
        }
    }

    best
}

#[cfg(test)]
#[path = "tests/similarity_tests.rs"]
mod tests;
