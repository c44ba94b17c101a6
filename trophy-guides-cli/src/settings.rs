//! Settings file and database path resolution.
//!
//! The settings file lives at `~/.config/trophy-guides/settings.toml`:
//!
//! ```toml
//! [database]
//! path = "/srv/trophy-guides/guides.db"
//!
//! [crawl]
//! batch_size = 50
//! request_delay_ms = 2000
//! batch_pause_secs = 30
//!
//! [matching]
//! merge_threshold = 90.0
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use trophy_guides_catalog::ScoreConfig;
use trophy_guides_crawl::breaker::{DEFAULT_COOLDOWN, DEFAULT_ERROR_THRESHOLD};
use trophy_guides_crawl::crawler::{DEFAULT_BATCH_PAUSE, DEFAULT_LOCK_STALE_HOURS};
use trophy_guides_crawl::pacer::DEFAULT_REQUEST_DELAY;
use trophy_guides_crawl::rematch::DEFAULT_REMATCH_PAGE;
use trophy_guides_crawl::{BatchOptions, BreakerConfig, CrawlOptions, DEFAULT_BATCH_SIZE};
use trophy_guides_match::{DEFAULT_MERGE_THRESHOLD, MergePolicy};

use crate::CliError;

/// Environment variable naming the database file.
pub(crate) const DB_ENV_VAR: &str = "TROPHY_GUIDES_DB";

/// Canonical path to the settings file.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("trophy-guides").join("settings.toml")
}

/// Default database location: `~/.local/share/trophy-guides/guides.db`.
pub(crate) fn default_db_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("trophy-guides").join("guides.db")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub database: DatabaseSettings,
    pub crawl: CrawlSettings,
    pub matching: MatchingSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DatabaseSettings {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CrawlSettings {
    pub batch_size: usize,
    pub request_delay_ms: u64,
    pub batch_pause_secs: u64,
    pub error_threshold: usize,
    pub cooldown_secs: u64,
    pub lock_stale_hours: i64,
    pub rematch_page_size: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            request_delay_ms: DEFAULT_REQUEST_DELAY.as_millis() as u64,
            batch_pause_secs: DEFAULT_BATCH_PAUSE.as_secs(),
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            cooldown_secs: DEFAULT_COOLDOWN.as_secs(),
            lock_stale_hours: DEFAULT_LOCK_STALE_HOURS,
            rematch_page_size: DEFAULT_REMATCH_PAGE,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MatchingSettings {
    pub merge_threshold: f64,
    pub containment_bonus: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            containment_bonus: ScoreConfig::default().containment_bonus,
        }
    }
}

impl Settings {
    /// Load settings from `explicit`, or from the default location.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = settings_path();
                if !p.exists() {
                    return Ok(Self::default());
                }
                p
            }
        };

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| CliError::config(format!("Cannot read {}: {}", path.display(), e)))?;
        log::debug!("Loaded settings from {}", path.display());
        Self::parse(&contents).map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Resolve the database path: flag, then environment, then settings
    /// file, then the default location.
    pub(crate) fn database_path(&self, flag: Option<PathBuf>, env: Option<OsString>) -> PathBuf {
        flag.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
            .or_else(|| self.database.path.clone())
            .unwrap_or_else(default_db_path)
    }

    pub(crate) fn score_config(&self) -> ScoreConfig {
        ScoreConfig {
            containment_bonus: self.matching.containment_bonus,
            ..ScoreConfig::default()
        }
    }

    pub(crate) fn merge_policy(&self) -> MergePolicy {
        MergePolicy {
            threshold: self.matching.merge_threshold,
            score: self.score_config(),
        }
    }

    pub(crate) fn request_delay(&self) -> Duration {
        Duration::from_millis(self.crawl.request_delay_ms)
    }

    /// Crawl options with the file's values applied.
    pub(crate) fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            batch: BatchOptions {
                batch_size: self.crawl.batch_size,
                dry_run: false,
            },
            batch_pause: Duration::from_secs(self.crawl.batch_pause_secs),
            breaker: BreakerConfig {
                error_threshold: self.crawl.error_threshold,
                cooldown: Duration::from_secs(self.crawl.cooldown_secs),
            },
            lock_stale_after: chrono::Duration::hours(self.crawl.lock_stale_hours),
            ..CrawlOptions::default()
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
