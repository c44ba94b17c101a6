//! Sitemap-backed guide source.
//!
//! Fetches a site's XML sitemap (expanding sitemap indexes one level), keeps
//! the guide page URLs on the site's own host, and pages through them
//! with an offset cursor. The listing is fetched once per process and
//! reused by later batches.

use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use trophy_guides_catalog::{Cursor, DiscoveredGuide, GuideSite, extract_slug};

use crate::error::FetchError;
use crate::pacer::Pacer;
use crate::source::{Discovery, GuideSource, page_by_offset};

const USER_AGENT: &str = concat!("trophy-guides/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A parsed sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<urlset>`: page URLs.
    UrlSet(Vec<String>),
    /// `<sitemapindex>`: URLs of further sitemaps.
    Index(Vec<String>),
}

/// Extract every `<loc>` from a sitemap or sitemap index.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut is_index = false;
    let mut in_loc = false;
    let mut locs = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"sitemapindex" => is_index = true,
                b"loc" => in_loc = true,
                _ => {}
            },
            Event::Text(ref e) if in_loc => {
                let text = e.unescape()?;
                let text = text.trim();
                if !text.is_empty() {
                    locs.push(text.to_string());
                }
            }
            Event::CData(e) if in_loc => {
                let text = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
                if !text.is_empty() {
                    locs.push(text);
                }
            }
            Event::End(ref e) if e.local_name().as_ref() == b"loc" => in_loc = false,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(if is_index {
        SitemapDocument::Index(locs)
    } else {
        SitemapDocument::UrlSet(locs)
    })
}

/// Fetches one sitemap document body.
pub trait SitemapFetch {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl SitemapFetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::http(url, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::transient(url, format!("HTTP {}", status.as_u16())));
        }
        resp.text().map_err(|e| FetchError::http(url, &e))
    }
}

/// Crawls the guide URLs listed in a sitemap.
pub struct SitemapSource {
    key: String,
    site: GuideSite,
    sitemap_url: String,
    fetcher: Box<dyn SitemapFetch>,
    guides: Option<Vec<DiscoveredGuide>>,
}

impl SitemapSource {
    pub fn new(site: GuideSite, sitemap_url: impl Into<String>) -> Result<Self, FetchError> {
        let sitemap_url = sitemap_url.into();
        let fetcher = HttpFetcher::new().map_err(|e| FetchError::http(&sitemap_url, &e))?;
        Ok(Self::with_fetcher(site, sitemap_url, Box::new(fetcher)))
    }

    /// Source that reads sitemaps through `fetcher` instead of HTTP.
    pub fn with_fetcher(
        site: GuideSite,
        sitemap_url: impl Into<String>,
        fetcher: Box<dyn SitemapFetch>,
    ) -> Self {
        Self {
            key: format!("{}:sitemap", site.as_str()),
            site,
            sitemap_url: sitemap_url.into(),
            fetcher,
            guides: None,
        }
    }

    fn fetch_document(
        &self,
        url: &str,
        pacer: &mut Pacer,
    ) -> Result<SitemapDocument, FetchError> {
        pacer.wait_turn();
        log::debug!("GET {}", url);
        let body = self.fetcher.fetch(url)?;
        parse_sitemap(&body).map_err(|e| FetchError::parse(url, e.to_string()))
    }

    /// Load the full guide listing, expanding an index one level deep.
    fn load(
        &self,
        pacer: &mut Pacer,
        discovery: &mut Discovery,
    ) -> Result<Vec<DiscoveredGuide>, FetchError> {
        discovery.requests += 1;
        let locs = match self.fetch_document(&self.sitemap_url, pacer)? {
            SitemapDocument::UrlSet(locs) => locs,
            SitemapDocument::Index(children) => {
                let mut locs = Vec::new();
                let mut loaded = 0;
                for child in &children {
                    discovery.requests += 1;
                    match self.fetch_document(child, pacer) {
                        Ok(SitemapDocument::UrlSet(child_locs)) => {
                            loaded += 1;
                            locs.extend(child_locs);
                        }
                        Ok(SitemapDocument::Index(_)) => {
                            loaded += 1;
                            log::debug!("Skipping nested sitemap index {}", child);
                        }
                        Err(e) => {
                            log::warn!("{}", e);
                            discovery.failed_requests += 1;
                        }
                    }
                }
                if loaded == 0 && !children.is_empty() {
                    return Err(FetchError::transient(
                        &self.sitemap_url,
                        "no child sitemap could be loaded",
                    ));
                }
                locs
            }
        };

        // extract_slug also rejects URLs on other hosts.
        let mut seen = std::collections::HashSet::new();
        let guides: Vec<DiscoveredGuide> = locs
            .into_iter()
            .filter(|url| extract_slug(self.site, url).is_some())
            .filter(|url| seen.insert(url.clone()))
            .map(DiscoveredGuide::new)
            .collect();

        log::info!(
            "{}: {} guide URLs in {}",
            self.key,
            guides.len(),
            self.sitemap_url
        );
        Ok(guides)
    }
}

impl GuideSource for SitemapSource {
    fn key(&self) -> &str {
        &self.key
    }

    fn site(&self) -> GuideSite {
        self.site
    }

    fn discover(
        &mut self,
        cursor: &Cursor,
        batch_size: usize,
        pacer: &mut Pacer,
    ) -> Result<Discovery, FetchError> {
        let mut discovery = Discovery::default();

        if self.guides.is_none() {
            let guides = self.load(pacer, &mut discovery)?;
            self.guides = Some(guides);
        }
        let guides = self.guides.as_deref().unwrap_or_default();

        let (page, next) = page_by_offset(guides, cursor, batch_size)?;
        discovery.candidates = page;
        discovery.next_cursor = next;
        Ok(discovery)
    }
}

#[cfg(test)]
#[path = "tests/sitemap_tests.rs"]
mod tests;
