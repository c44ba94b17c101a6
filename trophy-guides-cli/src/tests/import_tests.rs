use trophy_guides_db::{find_entry_by_identifier, get_catalog_entry, load_catalog, open_memory};

use super::*;

fn records(json: &str) -> Vec<CatalogRecord> {
    serde_json::from_str(json).unwrap()
}

#[test]
fn imports_with_and_without_ids() {
    let conn = open_memory().unwrap();
    let stats = import_records(
        &conn,
        &records(
            r#"[
                {"id": 7, "title": "Returnal", "slug": "returnal",
                 "alternate_identifiers": ["NPWR20001_00"]},
                {"title": "Marvel's Spider-Man: Miles Morales",
                 "alternate_identifiers": ["npwr20002_00"]},
                {"title": "   "}
            ]"#,
        ),
    )
    .unwrap();

    assert_eq!(
        stats,
        ImportStats {
            upserted: 1,
            created: 1,
            skipped: 1
        }
    );

    let catalog = load_catalog(&conn).unwrap();
    assert_eq!(catalog.len(), 2);
    let miles = catalog.iter().find(|e| e.id != 7).unwrap();
    assert_eq!(miles.slug, "marvels-spider-man-miles-morales");
    assert_eq!(find_entry_by_identifier(&conn, "NPWR20002_00").unwrap(), Some(miles.id));
    assert_eq!(find_entry_by_identifier(&conn, "NPWR20001_00").unwrap(), Some(7));
}

#[test]
fn reimport_updates_in_place() {
    let conn = open_memory().unwrap();
    let first = records(r#"[{"id": 1, "title": "Astro Bot", "slug": "astro-bot"}]"#);
    import_records(&conn, &first).unwrap();
    import_records(&conn, &records(r#"[{"id": 1, "title": "ASTRO BOT", "slug": ""}]"#)).unwrap();

    let entry = get_catalog_entry(&conn, 1).unwrap().unwrap();
    assert_eq!(entry.title, "ASTRO BOT");
    assert_eq!(entry.slug, "astro-bot");
    assert_eq!(load_catalog(&conn).unwrap().len(), 1);
}

#[test]
fn missing_title_is_a_parse_error() {
    assert!(serde_json::from_str::<Vec<CatalogRecord>>(r#"[{"id": 1}]"#).is_err());
}
