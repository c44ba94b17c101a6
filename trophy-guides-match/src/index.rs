//! In-memory catalog index for O(1) key lookups.
//!
//! Built once from the full catalog, read-only afterwards. Duplicate keys are
//! resolved by keeping the first entry (the catalog read orders by id); every
//! key that more than one entry produced is remembered as ambiguous so the
//! caller can flag the match instead of trusting it silently.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use trophy_guides_catalog::{CatalogEntry, normalize_key};

/// Which lookup map a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Slug,
    NormalizedSlug,
    NormalizedTitle,
    Identifier,
}

/// An indexed, read-only view of the catalog.
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    /// Normalized title per entry, parallel to `entries`.
    normalized_titles: Vec<String>,
    by_id: HashMap<i64, usize>,
    /// Raw slug (lowercase) → entry index
    by_slug: HashMap<String, usize>,
    by_normalized_slug: HashMap<String, usize>,
    by_normalized_title: HashMap<String, usize>,
    /// Alternate identifier (uppercase) → entry index
    by_identifier: HashMap<String, usize>,
    ambiguous: HashSet<(KeyKind, String)>,
}

/// Normalize an alternate identifier for lookup.
pub(crate) fn identifier_key(identifier: &str) -> String {
    identifier.trim().to_ascii_uppercase()
}

pub(crate) fn slug_key(slug: &str) -> String {
    slug.trim().to_ascii_lowercase()
}

impl CatalogIndex {
    /// Build an index from catalog entries.
    pub fn build(entries: Vec<CatalogEntry>) -> Self {
        let mut index = Self {
            normalized_titles: Vec::with_capacity(entries.len()),
            by_id: HashMap::with_capacity(entries.len()),
            by_slug: HashMap::with_capacity(entries.len()),
            by_normalized_slug: HashMap::with_capacity(entries.len()),
            by_normalized_title: HashMap::with_capacity(entries.len()),
            by_identifier: HashMap::new(),
            ambiguous: HashSet::new(),
            entries: Vec::new(),
        };

        for (i, entry) in entries.iter().enumerate() {
            let normalized_title = normalize_key(&entry.title);

            index.by_id.entry(entry.id).or_insert(i);
            index.insert(KeyKind::Slug, slug_key(&entry.slug), i);
            index.insert(KeyKind::NormalizedSlug, normalize_key(&entry.slug), i);
            index.insert(KeyKind::NormalizedTitle, normalized_title.clone(), i);
            for identifier in &entry.alternate_identifiers {
                index.insert(KeyKind::Identifier, identifier_key(identifier), i);
            }

            index.normalized_titles.push(normalized_title);
        }
        index.entries = entries;

        if !index.ambiguous.is_empty() {
            log::debug!(
                "Catalog index: {} keys shared by more than one entry",
                index.ambiguous.len()
            );
        }

        index
    }

    fn insert(&mut self, kind: KeyKind, key: String, i: usize) {
        if key.is_empty() {
            return;
        }
        let map = match kind {
            KeyKind::Slug => &mut self.by_slug,
            KeyKind::NormalizedSlug => &mut self.by_normalized_slug,
            KeyKind::NormalizedTitle => &mut self.by_normalized_title,
            KeyKind::Identifier => &mut self.by_identifier,
        };
        match map.entry(key) {
            Entry::Occupied(existing) => {
                if *existing.get() != i {
                    self.ambiguous.insert((kind, existing.key().clone()));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(i);
            }
        }
    }

    /// Look up an entry by a key of the given kind.
    ///
    /// `key` must already be in the map's form: lowercase slug, normalized
    /// key, or uppercase identifier.
    pub fn lookup(&self, kind: KeyKind, key: &str) -> Option<&CatalogEntry> {
        let map = match kind {
            KeyKind::Slug => &self.by_slug,
            KeyKind::NormalizedSlug => &self.by_normalized_slug,
            KeyKind::NormalizedTitle => &self.by_normalized_title,
            KeyKind::Identifier => &self.by_identifier,
        };
        map.get(key).map(|&i| &self.entries[i])
    }

    /// Whether more than one catalog entry produced this key.
    pub fn is_ambiguous(&self, kind: KeyKind, key: &str) -> bool {
        self.ambiguous.contains(&(kind, key.to_string()))
    }

    /// Number of keys shared by more than one entry.
    pub fn ambiguous_key_count(&self) -> usize {
        self.ambiguous.len()
    }

    /// Look up an entry by catalog id.
    pub fn get(&self, id: i64) -> Option<&CatalogEntry> {
        self.by_id.get(&id).map(|&i| &self.entries[i])
    }

    /// Iterate entries with their precomputed normalized titles.
    pub fn normalized_titles(&self) -> impl Iterator<Item = (&CatalogEntry, &str)> {
        self.entries
            .iter()
            .zip(self.normalized_titles.iter().map(String::as_str))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Returns the total number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/index_tests.rs"]
mod tests;
