//! Error types for crawling and matching runs.

use trophy_guides_catalog::CatalogError;
use trophy_guides_db::OperationError;

/// Failure talking to, or reading from, an external guide source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network or HTTP failure; the loop keeps going and counts it.
    #[error("Request to {url} failed: {message}")]
    Transient { url: String, message: String },

    /// The source answered with something we could not read.
    #[error("Unexpected content from {url}: {message}")]
    Parse { url: String, message: String },

    /// The saved cursor does not make sense for this source.
    #[error(transparent)]
    InvalidCursor(#[from] CatalogError),
}

impl FetchError {
    pub fn transient(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn parse(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Wrap a reqwest error. Every HTTP failure is treated as transient.
    pub fn http(url: &str, err: &reqwest::Error) -> Self {
        Self::transient(url, err.to_string())
    }
}

/// Failure that ends a batch or a run.
///
/// Per-candidate problems never surface here; they are counted in the batch
/// result instead.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("Store error: {0}")]
    Store(#[from] OperationError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Source '{source_key}' is already being crawled by {holder} (since {acquired_at})")]
    Lock {
        source_key: String,
        holder: String,
        acquired_at: String,
    },

    #[error("Source error: {0}")]
    Source(#[from] FetchError),
}
