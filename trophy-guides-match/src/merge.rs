//! Auto-merge policy for the create-or-merge workflow.
//!
//! Looser than the resolver: after an exact normalized-key check, the whole
//! catalog is scanned and the best similarity score wins if it reaches the
//! threshold. Only the create-or-merge path may use this.

use trophy_guides_catalog::{ScoreConfig, normalize_key, score_with};

use crate::index::{CatalogIndex, KeyKind};
use crate::outcome::{ExactMatch, FuzzyMatch, MatchOutcome, MatchStrategy};

/// Default minimum score for a fuzzy merge.
pub const DEFAULT_MERGE_THRESHOLD: f64 = 90.0;

/// Auto-merge configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergePolicy {
    /// Minimum score (0..=100) to accept a fuzzy merge.
    pub threshold: f64,
    pub score: ScoreConfig,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MERGE_THRESHOLD,
            score: ScoreConfig::default(),
        }
    }
}

/// Find the catalog entry an incoming title should merge into.
pub fn auto_merge<'a>(
    index: &'a CatalogIndex,
    title: &str,
    policy: &MergePolicy,
) -> MatchOutcome<'a> {
    let key = normalize_key(title);
    if key.is_empty() {
        return MatchOutcome::NoMatch;
    }

    for (kind, strategy) in [
        (KeyKind::NormalizedTitle, MatchStrategy::NormalizedTitle),
        (KeyKind::NormalizedSlug, MatchStrategy::TitleAsSlug),
    ] {
        if let Some(entry) = index.lookup(kind, &key) {
            return MatchOutcome::Exact(ExactMatch {
                entry,
                strategy,
                ambiguous: index.is_ambiguous(kind, &key),
            });
        }
    }

    let key_len = key.chars().count();
    let mut best: Option<FuzzyMatch<'a>> = None;

    for (entry, candidate) in index.normalized_titles() {
        if candidate.is_empty() {
            continue;
        }
        let candidate_len = candidate.chars().count();
        if score_ceiling(key_len, candidate_len, &policy.score) < policy.threshold {
            continue;
        }

        let s = score_with(&key, candidate, &policy.score);
        if best.is_none_or(|b| s > b.score) {
            best = Some(FuzzyMatch { entry, score: s });
        }
    }

    match best {
        Some(m) if m.score >= policy.threshold => {
            log::debug!(
                "Auto-merge: '{}' -> '{}' (id {}, score {:.1})",
                title,
                m.entry.title,
                m.entry.id,
                m.score
            );
            MatchOutcome::Fuzzy(m)
        }
        _ => MatchOutcome::NoMatch,
    }
}

/// Upper bound on the score two keys of these lengths can reach.
///
/// `similar_text` can match at most the shorter key, and normalized
/// Levenshtein is bounded by `short / long`, which is never above the
/// `similar_text` bound.
fn score_ceiling(a_len: usize, b_len: usize, config: &ScoreConfig) -> f64 {
    let short = a_len.min(b_len) as f64;
    let total = (a_len + b_len) as f64;
    if total == 0.0 {
        return 0.0;
    }
    (2.0 * short / total * 100.0 + config.containment_bonus).min(100.0)
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
