mod common;

use common::*;
use trophy_guides_crawl::{MergeAction, MergeInput, MergeOptions, create_or_merge};
use trophy_guides_db::{find_entry_by_identifier, load_catalog, open_memory};

fn input(title: &str, identifier: Option<&str>) -> MergeInput {
    MergeInput {
        title: title.to_string(),
        identifier: identifier.map(str::to_string),
    }
}

#[test]
fn merges_known_titles_and_creates_the_rest() {
    let conn = open_memory().unwrap();
    let index = seed_catalog(&conn);

    let inputs = vec![
        input("Returnal™ (PS5)", Some("NPWR20001_00")),
        input("ASTRO BOT", Some("NPWR20002_00")),
        input("Ghost of Tsushima", Some("NPWR20003_00")),
        input("Ghost of Tsushima", Some("NPWR20004_00")),
        input("™", None),
    ];
    let report = create_or_merge(&conn, &index, &inputs, &MergeOptions::default()).unwrap();

    assert_eq!(report.stats.exact, 2);
    assert_eq!(report.stats.created, 1);
    assert_eq!(report.stats.repeated, 1);
    assert_eq!(report.stats.skipped, 1);
    assert_eq!(report.stats.identifiers_added, 4);
    assert!(matches!(report.actions[0].1, MergeAction::Merged { entry_id: 1, fuzzy: false, .. }));

    let ghost_id = match report.actions[2].1 {
        MergeAction::Created { entry_id: Some(id) } => id,
        ref other => panic!("expected created entry, got {other:?}"),
    };
    assert_eq!(report.actions[3].1, MergeAction::Repeated { entry_id: Some(ghost_id) });
    assert_eq!(find_entry_by_identifier(&conn, "NPWR20004_00").unwrap(), Some(ghost_id));
    assert_eq!(find_entry_by_identifier(&conn, "npwr20001_00").unwrap(), Some(1));

    let catalog = load_catalog(&conn).unwrap();
    assert_eq!(catalog.len(), 4);
    assert!(catalog.iter().any(|e| e.slug == "ghost-of-tsushima"));
}

#[test]
fn sequel_title_is_created_not_merged() {
    let conn = open_memory().unwrap();
    let index = seed_catalog(&conn);

    let inputs = [input("Mass Effect", None)];
    let report = create_or_merge(&conn, &index, &inputs, &MergeOptions::default()).unwrap();
    assert_eq!(report.stats.created, 1);
    assert_eq!(report.stats.fuzzy, 0);
}

#[test]
fn known_identifier_short_circuits() {
    let conn = open_memory().unwrap();
    let index = seed_catalog(&conn);
    let options = MergeOptions::default();
    create_or_merge(&conn, &index, &[input("Returnal", Some("NPWR1"))], &options).unwrap();

    let inputs = [input("Something Else Entirely", Some("npwr1"))];
    let report = create_or_merge(&conn, &index, &inputs, &options).unwrap();
    assert_eq!(report.actions[0].1, MergeAction::Known { entry_id: 1 });
    assert_eq!(load_catalog(&conn).unwrap().len(), 3);
}

#[test]
fn dry_run_writes_nothing() {
    let conn = open_memory().unwrap();
    let index = seed_catalog(&conn);
    let options = MergeOptions {
        dry_run: true,
        ..MergeOptions::default()
    };

    let report = create_or_merge(
        &conn,
        &index,
        &[input("Ghost of Tsushima", Some("NPWR9")), input("ghost of tsushima", None)],
        &options,
    )
    .unwrap();
    assert_eq!(report.stats.created, 1);
    assert_eq!(report.stats.repeated, 1);
    assert_eq!(report.actions[0].1, MergeAction::Created { entry_id: None });
    assert_eq!(load_catalog(&conn).unwrap().len(), 3);
    assert_eq!(find_entry_by_identifier(&conn, "NPWR9").unwrap(), None);
}
