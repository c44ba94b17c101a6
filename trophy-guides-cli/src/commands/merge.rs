use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use rusqlite::Connection;

use trophy_guides_crawl::{MergeAction, MergeInput, MergeOptions, create_or_merge};

use crate::CliError;
use crate::settings::Settings;

use super::{load_index, truncate_str};

/// Create-or-merge every row of a title,identifier CSV.
pub(crate) fn run_merge(
    conn: &Connection,
    settings: &Settings,
    file: &Path,
    threshold: Option<f64>,
    dry_run: bool,
) -> Result<(), CliError> {
    let inputs = read_merge_inputs(file)?;
    let index = load_index(conn)?;

    let mut policy = settings.merge_policy();
    if let Some(t) = threshold {
        policy.threshold = t.clamp(0.0, 100.0);
    }
    log::info!(
        "Merging {} titles into {} catalog entries (threshold {:.0})",
        inputs.len(),
        index.len(),
        policy.threshold,
    );

    let report = create_or_merge(conn, &index, &inputs, &MergeOptions { policy, dry_run })?;

    let fuzzy: Vec<_> = report
        .actions
        .iter()
        .filter_map(|(title, action)| match action {
            MergeAction::Merged {
                entry_id,
                score,
                fuzzy: true,
            } => Some((title, *entry_id, *score)),
            _ => None,
        })
        .collect();
    if !fuzzy.is_empty() {
        crate::log_blank();
        log::info!(
            "{}",
            "Fuzzy merges".if_supports_color(Stdout, |t| t.bold()),
        );
        for (title, entry_id, score) in fuzzy {
            let entry_title = index.get(entry_id).map(|e| e.title.as_str()).unwrap_or("?");
            log::info!(
                "  {:<40} -> {:<40} {}",
                truncate_str(title, 40),
                truncate_str(entry_title, 40),
                format!("{:.1}", score).if_supports_color(Stdout, |t| t.yellow()),
            );
        }
    }

    let s = &report.stats;
    crate::log_blank();
    log::info!(
        "{}{}",
        "Merge Summary".if_supports_color(Stdout, |t| t.bold()),
        if dry_run { " (dry run)" } else { "" },
    );
    log::info!("  Known identifier: {:>8}", s.known);
    log::info!("  Exact merges:     {:>8}", s.exact);
    log::info!("  Fuzzy merges:     {:>8}", s.fuzzy);
    log::info!(
        "  Created:          {:>8}",
        s.created.if_supports_color(Stdout, |t| t.green()),
    );
    log::info!("  Repeated titles:  {:>8}", s.repeated);
    log::info!("  Skipped:          {:>8}", s.skipped);
    log::info!("  Identifiers added:{:>8}", s.identifiers_added);
    Ok(())
}

/// Read `title,identifier` rows. The identifier column is optional.
pub(crate) fn read_merge_inputs(file: &Path) -> Result<Vec<MergeInput>, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(file)
        .map_err(|e| CliError::input(format!("{}: {}", file.display(), e)))?;

    reader
        .deserialize()
        .collect::<Result<Vec<MergeInput>, _>>()
        .map_err(|e| CliError::input(format!("{}: {}", file.display(), e)))
}

#[cfg(test)]
#[path = "../tests/merge_tests.rs"]
mod tests;
