use super::*;

use std::collections::HashMap;
use std::time::Duration;

const ROOT: &str = "https://psnprofiles.com/sitemap.xml";

/// Serves canned sitemap bodies; unknown URLs answer 404.
struct FixtureFetcher(HashMap<String, String>);

impl FixtureFetcher {
    fn new(pages: &[(&str, &str)]) -> Box<Self> {
        let pages = pages
            .iter()
            .map(|(url, body)| (url.to_string(), body.to_string()))
            .collect();
        Box::new(Self(pages))
    }
}

impl SitemapFetch for FixtureFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.0
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::transient(url, "HTTP 404"))
    }
}

fn urlset(urls: &[&str]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("<url><loc>{u}</loc></url>"))
        .collect();
    format!("<urlset>{entries}</urlset>")
}

fn index(children: &[&str]) -> String {
    let entries: String = children
        .iter()
        .map(|u| format!("<sitemap><loc>{u}</loc></sitemap>"))
        .collect();
    format!("<sitemapindex>{entries}</sitemapindex>")
}

fn pacer() -> Pacer {
    Pacer::new(Duration::ZERO)
}

fn urls(discovery: &Discovery) -> Vec<&str> {
    discovery.candidates.iter().map(|g| g.url.as_str()).collect()
}

#[test]
fn parses_urlset() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://www.powerpyx.com/returnal-trophy-guide/</loc><lastmod>2024-01-01</lastmod></url>
  <url>
    <loc>
      https://www.powerpyx.com/astro-bot-trophy-guide/
    </loc>
  </url>
  <url><loc>https://www.powerpyx.com/?a=1&amp;b=2</loc></url>
</urlset>"#;

    let doc = parse_sitemap(xml).unwrap();
    assert_eq!(
        doc,
        SitemapDocument::UrlSet(vec![
            "https://www.powerpyx.com/returnal-trophy-guide/".to_string(),
            "https://www.powerpyx.com/astro-bot-trophy-guide/".to_string(),
            "https://www.powerpyx.com/?a=1&b=2".to_string(),
        ])
    );
}

#[test]
fn parses_sitemap_index() {
    let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://psnprofiles.com/sitemap-guides-1.xml</loc></sitemap>
  <sitemap><loc>https://psnprofiles.com/sitemap-guides-2.xml</loc></sitemap>
</sitemapindex>"#;

    match parse_sitemap(xml).unwrap() {
        SitemapDocument::Index(locs) => assert_eq!(locs.len(), 2),
        other => panic!("expected index, got {other:?}"),
    }
}

#[test]
fn reads_cdata_locations() {
    let url = "https://psnprofiles.com/guide/1-returnal-trophy-guide";
    let xml = format!("<urlset><url><loc><![CDATA[{url}]]></loc></url></urlset>");
    assert_eq!(
        parse_sitemap(&xml).unwrap(),
        SitemapDocument::UrlSet(vec![url.to_string()])
    );
}

#[test]
fn ignores_text_outside_loc() {
    let xml = "<urlset><url><lastmod>2024</lastmod><priority>0.5</priority></url></urlset>";
    assert_eq!(parse_sitemap(xml).unwrap(), SitemapDocument::UrlSet(vec![]));
}

#[test]
fn malformed_xml_is_an_error() {
    assert!(parse_sitemap("<urlset><url><loc>x</url></urlset>").is_err());
}

#[test]
fn source_key_includes_site() {
    let source = SitemapSource::new(GuideSite::PsnProfiles, ROOT).unwrap();
    assert_eq!(source.key(), "psnprofiles:sitemap");
    assert_eq!(source.site(), GuideSite::PsnProfiles);
}

#[test]
fn urlset_keeps_guide_pages_on_the_site() {
    let body = urlset(&[
        "https://psnprofiles.com/guide/1-returnal-trophy-guide",
        "https://psnprofiles.com/trophies/1-returnal",
        "https://psnprofiles.com/about",
        "https://example.com/guide/2-astro-bot-trophy-guide",
        "https://www.powerpyx.com/astro-bot-trophy-guide/",
        "https://psnprofiles.com/guide/2-astro-bot-trophy-guide",
        "https://psnprofiles.com/guide/1-returnal-trophy-guide",
    ]);
    let fetcher = FixtureFetcher::new(&[(ROOT, body.as_str())]);
    let mut source = SitemapSource::with_fetcher(GuideSite::PsnProfiles, ROOT, fetcher);
    let mut pacer = pacer();

    let discovery = source.discover(&Cursor::start(), 10, &mut pacer).unwrap();
    assert_eq!(
        urls(&discovery),
        vec![
            "https://psnprofiles.com/guide/1-returnal-trophy-guide",
            "https://psnprofiles.com/guide/2-astro-bot-trophy-guide",
        ]
    );
    assert_eq!(discovery.requests, 1);
    assert_eq!(discovery.failed_requests, 0);
    assert!(discovery.is_exhausted());
}

#[test]
fn listing_is_loaded_once_and_paged() {
    let body = urlset(&[
        "https://psnprofiles.com/guide/1-returnal-trophy-guide",
        "https://psnprofiles.com/guide/2-astro-bot-trophy-guide",
        "https://psnprofiles.com/guide/3-bloodborne-trophy-guide",
    ]);
    let fetcher = FixtureFetcher::new(&[(ROOT, body.as_str())]);
    let mut source = SitemapSource::with_fetcher(GuideSite::PsnProfiles, ROOT, fetcher);
    let mut pacer = pacer();

    let first = source.discover(&Cursor::start(), 2, &mut pacer).unwrap();
    assert_eq!(first.candidates.len(), 2);
    assert_eq!(first.next_cursor, Some(Cursor::from_offset(2)));

    let second = source.discover(&Cursor::from_offset(2), 2, &mut pacer).unwrap();
    assert_eq!(
        urls(&second),
        vec!["https://psnprofiles.com/guide/3-bloodborne-trophy-guide"]
    );
    assert_eq!(second.requests, 0);
    assert!(second.is_exhausted());
    assert_eq!(pacer.requests(), 1);
}

#[test]
fn index_with_one_failing_child_keeps_the_rest() {
    let root = index(&[
        "https://psnprofiles.com/sitemap-guides-1.xml",
        "https://psnprofiles.com/sitemap-guides-2.xml",
    ]);
    let child = urlset(&["https://psnprofiles.com/guide/1-returnal-trophy-guide"]);
    let fetcher = FixtureFetcher::new(&[
        (ROOT, root.as_str()),
        ("https://psnprofiles.com/sitemap-guides-1.xml", child.as_str()),
    ]);
    let mut source = SitemapSource::with_fetcher(GuideSite::PsnProfiles, ROOT, fetcher);
    let mut pacer = pacer();

    let discovery = source.discover(&Cursor::start(), 10, &mut pacer).unwrap();
    assert_eq!(
        urls(&discovery),
        vec!["https://psnprofiles.com/guide/1-returnal-trophy-guide"]
    );
    assert_eq!(discovery.requests, 3);
    assert_eq!(discovery.failed_requests, 1);
    assert_eq!(pacer.requests(), 3);
}

#[test]
fn index_with_every_child_failing_is_transient() {
    let root = index(&[
        "https://psnprofiles.com/sitemap-guides-1.xml",
        "https://psnprofiles.com/sitemap-guides-2.xml",
    ]);
    let fetcher = FixtureFetcher::new(&[(ROOT, root.as_str())]);
    let mut source = SitemapSource::with_fetcher(GuideSite::PsnProfiles, ROOT, fetcher);

    let err = source.discover(&Cursor::start(), 10, &mut pacer()).unwrap_err();
    assert!(matches!(err, FetchError::Transient { .. }), "{err:?}");
}

#[test]
fn failed_root_is_retried_on_the_next_batch() {
    let mut source = SitemapSource::with_fetcher(
        GuideSite::PsnProfiles,
        ROOT,
        FixtureFetcher::new(&[]),
    );
    let mut pacer = pacer();

    assert!(source.discover(&Cursor::start(), 10, &mut pacer).is_err());
    assert!(source.discover(&Cursor::start(), 10, &mut pacer).is_err());
    assert_eq!(pacer.requests(), 2);
}

#[test]
fn unreadable_root_is_a_parse_error() {
    let fetcher = FixtureFetcher::new(&[(ROOT, "<urlset><url><loc>x</url></urlset>")]);
    let mut source = SitemapSource::with_fetcher(GuideSite::PsnProfiles, ROOT, fetcher);

    let err = source.discover(&Cursor::start(), 10, &mut pacer()).unwrap_err();
    assert!(matches!(err, FetchError::Parse { .. }), "{err:?}");
}
