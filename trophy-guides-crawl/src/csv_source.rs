//! Local `title,url` list as a guide source.
//!
//! The file is read once when the source is opened; unreadable rows are
//! kept as rejections and reported with the batch they fall in.

use std::path::Path;

use serde::Deserialize;
use trophy_guides_catalog::{Cursor, DiscoveredGuide, GuideSite, extract_slug};

use crate::error::FetchError;
use crate::pacer::Pacer;
use crate::source::{Discovery, GuideSource, page_by_offset};

#[derive(Debug, Deserialize)]
struct ListRow {
    #[serde(default)]
    title: Option<String>,
    url: String,
    #[serde(default)]
    identifier: Option<String>,
}

/// Rows of a CSV guide list, in file order.
pub struct CsvListSource {
    key: String,
    site: GuideSite,
    origin: String,
    guides: Vec<DiscoveredGuide>,
    /// Bad rows, keyed by the number of good rows before them.
    rejected: Vec<(usize, String)>,
}

impl CsvListSource {
    /// Read a CSV with a header row containing `url` and optionally `title`
    /// and `identifier`.
    pub fn open(site: GuideSite, path: &Path) -> Result<Self, csv::Error> {
        let reader = reader_builder().from_path(path)?;
        let origin = path.display().to_string();
        Ok(Self::from_reader(site, reader, &origin))
    }

    fn from_reader<R: std::io::Read>(
        site: GuideSite,
        mut reader: csv::Reader<R>,
        origin: &str,
    ) -> Self {
        let mut guides = Vec::new();
        let mut rejected = Vec::new();

        for (line, row) in reader.deserialize::<ListRow>().enumerate() {
            let position = guides.len();
            match row {
                Ok(row) if is_guide_url(site, &row.url) => {
                    let mut guide = DiscoveredGuide::new(row.url);
                    if let Some(title) = row.title {
                        guide = guide.with_title(title);
                    }
                    guide.identifier = row.identifier.filter(|s| !s.is_empty());
                    guides.push(guide);
                }
                Ok(row) => rejected.push((
                    position,
                    format!("row {}: not a {} guide URL: '{}'", line + 2, site, row.url),
                )),
                Err(e) => rejected.push((position, format!("row {}: {}", line + 2, e))),
            }
        }

        Self {
            key: format!("{}:csv", site.as_str()),
            site,
            origin: origin.to_string(),
            guides,
            rejected,
        }
    }

    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.flexible(true).trim(csv::Trim::All);
    builder
}

fn is_guide_url(site: GuideSite, url: &str) -> bool {
    extract_slug(site, url).is_some()
}

impl GuideSource for CsvListSource {
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
        _pacer: &mut Pacer,
    ) -> Result<Discovery, FetchError> {
        let start = usize::try_from(cursor.offset()?).unwrap_or(usize::MAX);
        let (page, next) = page_by_offset(&self.guides, cursor, batch_size)?;
        let end = start.saturating_add(page.len());

        // A bad row is reported with the batch covering its position; rows
        // after the last good row go with the final batch.
        let rejected = self
            .rejected
            .iter()
            .filter(|(pos, _)| *pos >= start && (*pos < end || next.is_none()))
            .map(|(_, message)| FetchError::parse(&self.origin, message.as_str()))
            .collect();

        Ok(Discovery {
            candidates: page,
            rejected,
            next_cursor: next,
            requests: 0,
            failed_requests: 0,
        })
    }
}

#[cfg(test)]
#[path = "tests/csv_source_tests.rs"]
mod tests;
