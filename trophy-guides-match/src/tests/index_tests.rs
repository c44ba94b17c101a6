use super::*;

fn entry(id: i64, title: &str, slug: &str) -> CatalogEntry {
    CatalogEntry {
        id,
        title: title.to_string(),
        slug: slug.to_string(),
        alternate_identifiers: Vec::new(),
    }
}

#[test]
fn builds_all_maps() {
    let index = CatalogIndex::build(vec![entry(1, "The Last of Us Part II", "last-of-us-part-ii")]);

    assert_eq!(index.len(), 1);
    assert_eq!(index.lookup(KeyKind::Slug, "last-of-us-part-ii").map(|e| e.id), Some(1));
    assert_eq!(
        index.lookup(KeyKind::NormalizedSlug, "last of us part ii").map(|e| e.id),
        Some(1)
    );
    assert_eq!(
        index.lookup(KeyKind::NormalizedTitle, "last of us part ii").map(|e| e.id),
        Some(1)
    );
    assert!(index.lookup(KeyKind::Slug, "the-last-of-us-part-ii").is_none());
}

#[test]
fn raw_slug_key_is_lowercased() {
    let index = CatalogIndex::build(vec![entry(1, "Bloodborne", "Bloodborne")]);
    assert!(index.lookup(KeyKind::Slug, "bloodborne").is_some());
}

#[test]
fn first_entry_wins_and_key_is_flagged() {
    let index = CatalogIndex::build(vec![
        entry(1, "DOOM", "doom-1993"),
        entry(2, "Doom", "doom-2016"),
        entry(3, "Quake", "quake"),
    ]);

    assert_eq!(index.lookup(KeyKind::NormalizedTitle, "doom").map(|e| e.id), Some(1));
    assert!(index.is_ambiguous(KeyKind::NormalizedTitle, "doom"));
    assert!(!index.is_ambiguous(KeyKind::NormalizedTitle, "quake"));
    assert!(!index.is_ambiguous(KeyKind::Slug, "doom-1993"));
    assert_eq!(index.ambiguous_key_count(), 1);
}

#[test]
fn identifiers_are_uppercased() {
    let mut e = entry(7, "Astro Bot", "astro-bot");
    e.alternate_identifiers = vec!["npwr12345_00".to_string(), " ".to_string()];
    let index = CatalogIndex::build(vec![e]);

    assert_eq!(index.lookup(KeyKind::Identifier, "NPWR12345_00").map(|e| e.id), Some(7));
    assert!(index.lookup(KeyKind::Identifier, "").is_none());
}

#[test]
fn empty_keys_are_not_indexed() {
    let index = CatalogIndex::build(vec![entry(1, "™", ""), entry(2, "®", "")]);

    assert!(index.lookup(KeyKind::Slug, "").is_none());
    assert!(index.lookup(KeyKind::NormalizedTitle, "").is_none());
    assert_eq!(index.ambiguous_key_count(), 0);
}

#[test]
fn get_by_id_and_titles() {
    let index = CatalogIndex::build(vec![
        entry(10, "Ghost of Tsushima", "ghost-of-tsushima"),
        entry(20, "Returnal (PS5)", "returnal"),
    ]);

    assert_eq!(index.get(20).map(|e| e.slug.as_str()), Some("returnal"));
    assert!(index.get(30).is_none());

    let titles: Vec<(i64, &str)> = index.normalized_titles().map(|(e, t)| (e.id, t)).collect();
    assert_eq!(titles, vec![(10, "ghost of tsushima"), (20, "returnal")]);
}

#[test]
fn empty_catalog() {
    let index = CatalogIndex::build(Vec::new());
    assert!(index.is_empty());
    assert!(index.entries().is_empty());
}
