//! Game catalog data model, title normalization, guide URL slugs and
//! similarity scoring.
//!
//! This crate has no database or network dependencies. Everything here is a
//! pure function of its inputs, so the matcher and the crawler can share it
//! and tests can exercise it without fixtures.

pub mod error;
pub mod normalize;
pub mod similarity;
pub mod slug;
pub mod types;

pub use error::CatalogError;
pub use normalize::normalize_key;
pub use similarity::{ScoreConfig, score, score_with};
pub use slug::{extract_slug, slugify};
pub use types::*;
