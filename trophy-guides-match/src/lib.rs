//! Catalog index and match resolution.
//!
//! A [`CatalogIndex`] is built once per run from the catalog and handed to
//! the [`MatchResolver`] (strict, exact-key matching for guide references)
//! or to [`auto_merge`] (fuzzy, opt-in, for the create-or-merge workflow).

pub mod index;
pub mod merge;
pub mod outcome;
pub mod resolver;

pub use index::{CatalogIndex, KeyKind};
pub use merge::{DEFAULT_MERGE_THRESHOLD, MergePolicy, auto_merge};
pub use outcome::{ExactMatch, FuzzyMatch, MatchOutcome, MatchStrategy, Resolution};
pub use resolver::{Candidate, MatchResolver};
