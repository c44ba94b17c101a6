use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use trophy_guides_catalog::{extract_slug, normalize_key, score_with};
use trophy_guides_match::{Candidate, MatchOutcome, MatchResolver, Resolution, auto_merge};

use crate::CliError;
use crate::cli_types::InspectAction;
use crate::settings::Settings;

use super::{load_index, open_db};

pub(crate) fn run_inspect(
    action: InspectAction,
    settings: &Settings,
    db_path: &Path,
) -> Result<(), CliError> {
    match action {
        InspectAction::Normalize { text } => {
            log::info!("{}", normalize_key(&text));
        }
        InspectAction::Score { a, b } => {
            let (ka, kb) = (normalize_key(&a), normalize_key(&b));
            let score = score_with(&ka, &kb, &settings.score_config());
            log::info!("  {:?}", ka);
            log::info!("  {:?}", kb);
            log::info!(
                "  score {}",
                format!("{:.2}", score).if_supports_color(Stdout, |t| t.bold()),
            );
        }
        InspectAction::Slug { site, url } => match extract_slug(site, &url) {
            Some(slug) => log::info!("{}", slug),
            None => log::warn!("No {} guide slug in {}", site.display_name(), url),
        },
        InspectAction::Resolve { input, identifier } => {
            let conn = open_db(db_path)?;
            let index = load_index(&conn)?;
            inspect_resolve(&index, settings, &input, identifier);
        }
    }
    Ok(())
}

fn inspect_resolve(
    index: &trophy_guides_match::CatalogIndex,
    settings: &Settings,
    input: &str,
    identifier: Option<String>,
) {
    let candidate = Candidate::default()
        .with_title(Some(input.to_string()))
        .with_slug(Some(input.trim().to_string()))
        .with_identifier(identifier);

    match MatchResolver::new(index).resolve(&candidate) {
        Resolution::Exact(m) => {
            log::info!(
                "{} #{} {} via {}{}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                m.entry.id,
                m.entry.title.if_supports_color(Stdout, |t| t.bold()),
                m.strategy.as_str(),
                if m.ambiguous { " (ambiguous key)" } else { "" },
            );
        }
        Resolution::NoMatch => {
            log::info!(
                "{} no strict match for {:?}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                input,
            );
            match auto_merge(index, input, &settings.merge_policy()) {
                MatchOutcome::Fuzzy(m) => log::info!(
                    "  auto-merge would pick #{} {} (score {:.1})",
                    m.entry.id,
                    m.entry.title,
                    m.score,
                ),
                MatchOutcome::Exact(m) => log::info!(
                    "  auto-merge would pick #{} {} (exact)",
                    m.entry.id,
                    m.entry.title,
                ),
                MatchOutcome::NoMatch => {
                    log::info!("  auto-merge finds nothing above the threshold")
                }
            }
        }
    }
}
