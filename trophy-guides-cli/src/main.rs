//! trophy-guides CLI
//!
//! Batch jobs for discovering trophy guide URLs, matching them to the game
//! catalog and maintaining the catalog itself.

mod cli_types;
mod commands;
mod error;
mod settings;
mod spinner;

use std::io::Write;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use cli_types::{Cli, Commands};
pub(crate) use error::CliError;
use settings::{DB_ENV_VAR, Settings};

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        log::error!("{} {}", "\u{2718}".if_supports_color(Stderr, |t| t.red()), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load(cli.config.as_deref())?;
    let db_path = settings.database_path(cli.db, std::env::var_os(DB_ENV_VAR));

    match cli.command {
        Commands::ImportCatalog { file } => {
            let conn = commands::open_db(&db_path)?;
            commands::import::run_import_catalog(&conn, &file)
        }
        Commands::Crawl { action } => {
            let conn = commands::open_db(&db_path)?;
            commands::crawl::run_crawl(&conn, &settings, action, cli.quiet)
        }
        Commands::Rematch {
            site,
            batch_size,
            dry_run,
        } => {
            let conn = commands::open_db(&db_path)?;
            commands::rematch::run_rematch(&conn, &settings, site, batch_size, dry_run)
        }
        Commands::Merge {
            file,
            threshold,
            dry_run,
        } => {
            let conn = commands::open_db(&db_path)?;
            commands::merge::run_merge(&conn, &settings, &file, threshold, dry_run)
        }
        Commands::Stats => {
            if !db_path.exists() {
                log::warn!("No guide database found at {}", db_path.display());
                log::info!("Run 'trophy-guides import-catalog' to create one.");
                return Ok(());
            }
            let conn = commands::open_db(&db_path)?;
            commands::stats::run_stats(&conn, &db_path)
        }
        Commands::Inspect { action } => commands::inspect::run_inspect(action, &settings, &db_path),
    }
}

/// Install the logger.
///
/// Normal output goes through `log::info!` without decoration; `--verbose`
/// adds timestamps, levels and debug messages, `--quiet` keeps warnings and
/// errors only. `RUST_LOG` overrides the level.
fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.filter_module("reqwest", log::LevelFilter::Warn);
    if !verbose {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.parse_env("RUST_LOG");
    builder.init();
}

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}
