//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use trophy_guides_catalog::GuideSite;

#[derive(Parser)]
#[command(name = "trophy-guides")]
#[command(
    about = "Crawl trophy guide sites and match guides to the game catalog",
    long_about = None
)]
pub(crate) struct Cli {
    /// Guide database file (overrides TROPHY_GUIDES_DB and settings.toml)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Settings file (default: ~/.config/trophy-guides/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Upsert catalog entries from a JSON array
    ImportCatalog {
        /// JSON file of {id?, title, slug?, alternate_identifiers?} records
        file: PathBuf,
    },

    /// Discover guide URLs from a source and match them to the catalog
    Crawl {
        #[command(subcommand)]
        action: CrawlAction,
    },

    /// Retry matching for stored unmatched guides
    Rematch {
        /// Only this site (psnprofiles, playstationtrophies, powerpyx)
        #[arg(long)]
        site: Option<GuideSite>,

        /// Unmatched rows read per page
        #[arg(long)]
        batch_size: Option<usize>,

        /// Report matches without writing them
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Create-or-merge titles from a title,identifier CSV into the catalog
    Merge {
        /// CSV file with a `title` column and an optional `identifier` column
        file: PathBuf,

        /// Minimum similarity (0-100) for a fuzzy merge
        #[arg(long)]
        threshold: Option<f64>,

        /// Report decisions without writing them
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Show reference counts per source, cursors and held locks
    Stats,

    /// Debug the normalizer, scorer and resolver
    Inspect {
        #[command(subcommand)]
        action: InspectAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum CrawlAction {
    /// Crawl a sitemap (or sitemap index)
    Sitemap {
        /// Site the sitemap belongs to
        #[arg(long)]
        site: GuideSite,

        /// Sitemap URL
        #[arg(long)]
        url: String,

        #[command(flatten)]
        args: CrawlArgs,
    },

    /// Crawl a local CSV list of guide URLs
    Csv {
        /// Site the URLs belong to
        #[arg(long)]
        site: GuideSite,

        /// CSV file with a `url` column and an optional `title` column
        #[arg(long)]
        file: PathBuf,

        #[command(flatten)]
        args: CrawlArgs,
    },
}

/// Loop tuning shared by every crawl source.
#[derive(Args, Clone, Default)]
pub(crate) struct CrawlArgs {
    /// Candidates per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Minimum delay between requests, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Pause between batches, in seconds
    #[arg(long)]
    pub batch_pause_secs: Option<u64>,

    /// Stop after this many batches
    #[arg(long)]
    pub max_batches: Option<usize>,

    /// Match and report without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Take the run lock even if another run holds it
    #[arg(long)]
    pub force_lock: bool,

    /// Ignore the saved cursor and start from the beginning
    #[arg(long)]
    pub reset_cursor: bool,
}

#[derive(Subcommand)]
pub(crate) enum InspectAction {
    /// Print the normalized key for a title or slug
    Normalize { text: String },

    /// Similarity score between two titles
    Score { a: String, b: String },

    /// Extract the game slug from a guide URL
    Slug {
        #[arg(long)]
        site: GuideSite,
        url: String,
    },

    /// Resolve a title or slug against the catalog
    Resolve {
        /// Title or URL slug
        input: String,

        /// Platform identifier to try first
        #[arg(long)]
        identifier: Option<String>,
    },
}

#[cfg(test)]
#[path = "tests/cli_types_tests.rs"]
mod tests;
