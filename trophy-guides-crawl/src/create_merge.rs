//! Create-or-merge: fold incoming titles (e.g. PSN trophy titles) into the
//! catalog.
//!
//! Each title goes through auto-merge. A hit attaches the incoming
//! identifier to the existing entry; a miss creates a new entry. Entries
//! created during the run are remembered by normalized key so a title that
//! appears twice is only created once. The index itself is never mutated.

use std::collections::HashMap;

use rusqlite::Connection;
use trophy_guides_catalog::{normalize_key, slugify};
use trophy_guides_db::operations;
use trophy_guides_match::{CatalogIndex, MatchOutcome, MergePolicy, auto_merge};

use crate::error::CrawlError;

/// One incoming title.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct MergeInput {
    pub title: String,
    #[serde(default)]
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub policy: MergePolicy,
    /// Report without writing.
    pub dry_run: bool,
}

/// What happened to one input.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeAction {
    /// The identifier already belongs to this entry.
    Known { entry_id: i64 },
    /// Merged into an existing entry. `score` is 100 for exact hits.
    Merged { entry_id: i64, score: f64, fuzzy: bool },
    /// Same normalized title as an entry created earlier in this run.
    Repeated { entry_id: Option<i64> },
    /// New catalog entry. `entry_id` is `None` on dry runs.
    Created { entry_id: Option<i64> },
    /// Nothing left after normalization.
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub known: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub repeated: usize,
    pub created: usize,
    pub skipped: usize,
    pub identifiers_added: usize,
}

pub struct MergeReport {
    pub stats: MergeStats,
    pub actions: Vec<(String, MergeAction)>,
}

/// Merge `inputs` into the catalog. Writes run in one transaction (none for
/// dry runs).
pub fn create_or_merge(
    conn: &Connection,
    index: &CatalogIndex,
    inputs: &[MergeInput],
    options: &MergeOptions,
) -> Result<MergeReport, CrawlError> {
    if !options.dry_run {
        conn.execute_batch("BEGIN IMMEDIATE")?;
    }

    match merge_all(conn, index, inputs, options) {
        Ok(report) => {
            if !options.dry_run {
                conn.execute_batch("COMMIT")?;
            }
            Ok(report)
        }
        Err(e) => {
            if !options.dry_run {
                let _ = conn.execute_batch("ROLLBACK");
            }
            Err(e)
        }
    }
}

fn merge_all(
    conn: &Connection,
    index: &CatalogIndex,
    inputs: &[MergeInput],
    options: &MergeOptions,
) -> Result<MergeReport, CrawlError> {
    let mut stats = MergeStats::default();
    let mut actions = Vec::with_capacity(inputs.len());
    let mut created: HashMap<String, Option<i64>> = HashMap::new();

    for input in inputs {
        let action = merge_one(conn, index, input, options, &mut created)?;

        match &action {
            MergeAction::Known { .. } => stats.known += 1,
            MergeAction::Merged { fuzzy: false, .. } => stats.exact += 1,
            MergeAction::Merged { fuzzy: true, .. } => stats.fuzzy += 1,
            MergeAction::Repeated { .. } => stats.repeated += 1,
            MergeAction::Created { .. } => stats.created += 1,
            MergeAction::Skipped => stats.skipped += 1,
        }

        if !options.dry_run {
            let target = match action {
                MergeAction::Merged { entry_id, .. } => Some(entry_id),
                MergeAction::Repeated { entry_id } | MergeAction::Created { entry_id } => entry_id,
                MergeAction::Known { .. } | MergeAction::Skipped => None,
            };
            if let (Some(entry_id), Some(identifier)) = (target, input.identifier.as_deref())
                && operations::add_identifier(conn, entry_id, identifier)?
            {
                stats.identifiers_added += 1;
            }
        }

        actions.push((input.title.clone(), action));
    }

    log::info!(
        "Create-or-merge: {} exact, {} fuzzy, {} created, {} repeated, {} known",
        stats.exact,
        stats.fuzzy,
        stats.created,
        stats.repeated,
        stats.known
    );

    Ok(MergeReport { stats, actions })
}

fn merge_one(
    conn: &Connection,
    index: &CatalogIndex,
    input: &MergeInput,
    options: &MergeOptions,
    created: &mut HashMap<String, Option<i64>>,
) -> Result<MergeAction, CrawlError> {
    let key = normalize_key(&input.title);
    if key.is_empty() {
        return Ok(MergeAction::Skipped);
    }

    if let Some(identifier) = input.identifier.as_deref()
        && let Some(entry_id) = operations::find_entry_by_identifier(conn, identifier)?
    {
        return Ok(MergeAction::Known { entry_id });
    }

    if let Some(&entry_id) = created.get(&key) {
        return Ok(MergeAction::Repeated { entry_id });
    }

    match auto_merge(index, &input.title, &options.policy) {
        MatchOutcome::Exact(m) => Ok(MergeAction::Merged {
            entry_id: m.entry.id,
            score: 100.0,
            fuzzy: false,
        }),
        MatchOutcome::Fuzzy(m) => {
            log::info!(
                "Merging '{}' into '{}' (score {:.1})",
                input.title,
                m.entry.title,
                m.score
            );
            Ok(MergeAction::Merged {
                entry_id: m.entry.id,
                score: m.score,
                fuzzy: true,
            })
        }
        MatchOutcome::NoMatch => {
            let entry_id = if options.dry_run {
                None
            } else {
                let title = input.title.trim();
                Some(operations::insert_catalog_entry(conn, title, &slugify(title))?)
            };
            created.insert(key, entry_id);
            Ok(MergeAction::Created { entry_id })
        }
    }
}
