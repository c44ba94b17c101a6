use thiserror::Error;

use trophy_guides_crawl::CrawlError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Settings file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Input file (catalog JSON, CSV list) is malformed
    #[error("Input error: {0}")]
    Input(String),

    /// Crawl, rematch or merge failed
    #[error("{0}")]
    Crawl(#[from] CrawlError),
}

impl CliError {
    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }
}
