use super::*;
use std::io::Write;

fn source(data: &str) -> CsvListSource {
    let reader = reader_builder().from_reader(data.as_bytes());
    CsvListSource::from_reader(GuideSite::PowerPyx, reader, "test.csv")
}

fn pacer() -> Pacer {
    Pacer::new(std::time::Duration::ZERO)
}

#[test]
fn reads_rows_in_order() {
    let mut src = source(
        "title,url\n\
         Returnal,https://www.powerpyx.com/returnal-trophy-guide-roadmap/\n\
         ,https://www.powerpyx.com/astro-bot-trophy-guide/\n",
    );
    assert_eq!(src.len(), 2);
    assert_eq!(src.key(), "powerpyx:csv");

    let discovery = src.discover(&Cursor::start(), 10, &mut pacer()).unwrap();
    assert_eq!(discovery.candidates.len(), 2);
    assert_eq!(discovery.candidates[0].title.as_deref(), Some("Returnal"));
    assert_eq!(discovery.candidates[1].title, None);
    assert!(discovery.is_exhausted());
    assert_eq!(discovery.requests, 0);
}

#[test]
fn other_site_rows_are_rejected_in_their_batch() {
    let mut src = source(
        "title,url\n\
         A,https://www.powerpyx.com/a-trophy-guide/\n\
         B,https://psnprofiles.com/guide/1-b-trophy-guide\n\
         C,https://www.powerpyx.com/c-trophy-guide/\n\
         D,not a url\n",
    );
    assert_eq!(src.len(), 2);

    let first = src.discover(&Cursor::start(), 1, &mut pacer()).unwrap();
    assert_eq!(first.candidates.len(), 1);
    assert!(first.rejected.is_empty());
    assert_eq!(first.next_cursor, Some(Cursor::from_offset(1)));

    let second = src.discover(&Cursor::from_offset(1), 1, &mut pacer()).unwrap();
    assert_eq!(second.candidates.len(), 1);
    assert_eq!(second.rejected.len(), 2);
    assert!(second.is_exhausted());
}

#[test]
fn non_guide_pages_are_rejected() {
    let mut src = source(
        "title,url\n\
         Returnal,https://www.powerpyx.com/returnal-review/\n\
         PS5,https://www.powerpyx.com/category/ps5/\n\
         Returnal,https://www.powerpyx.com/returnal-trophy-guide/\n",
    );
    assert_eq!(src.len(), 1);

    let discovery = src.discover(&Cursor::start(), 10, &mut pacer()).unwrap();
    assert_eq!(discovery.candidates.len(), 1);
    assert_eq!(discovery.rejected.len(), 2);
    assert!(discovery.rejected[0].to_string().contains("returnal-review"));
}

#[test]
fn identifier_column_is_optional() {
    let mut src = source(
        "url,identifier\n\
         https://www.powerpyx.com/a-trophy-guide/,NPWR1\n\
         https://www.powerpyx.com/b-trophy-guide/,\n",
    );
    let discovery = src.discover(&Cursor::start(), 10, &mut pacer()).unwrap();
    assert_eq!(discovery.candidates[0].identifier.as_deref(), Some("NPWR1"));
    assert_eq!(discovery.candidates[1].identifier, None);
}

#[test]
fn open_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "title,url").unwrap();
    writeln!(file, "Returnal,https://www.powerpyx.com/returnal-trophy-guide/").unwrap();
    file.flush().unwrap();

    let src = CsvListSource::open(GuideSite::PowerPyx, file.path()).unwrap();
    assert_eq!(src.len(), 1);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(CsvListSource::open(GuideSite::PowerPyx, &dir.path().join("missing.csv")).is_err());
}
