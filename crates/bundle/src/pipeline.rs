//! End-to-end build of the bundle.

use crate::writer::{write_bundle, Bundle};
use chrono::Utc;
use statline_core::{Config, ProjectedGameRow, ProgressionRow, Result, SeasonDataset};
use statline_features::{
    actuals_key, aggregate_actuals, aggregate_projections, build_career_data, progression,
    projections_key, score_dataset, trailing_minutes, SeasonPhase,
};
use statline_grading::{
    accuracy_summary, attach_performance_history, daily_games_by_date, historical_grades,
    link_games, performance_history, realized_games,
};
use statline_ingestion::{
    enrich_profiles, load_box_scores, load_projections, IdentityUniverse, PageArchive,
    ScrapedInputs,
};
use std::collections::BTreeSet;
use std::mem;
use tracing::{info, warn};

/// Counts describing one build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub history_rows: usize,
    pub identities: usize,
    pub datasets: usize,
    pub games: usize,
    pub graded_games: usize,
    pub files: usize,
}

fn find<'a>(datasets: &'a [SeasonDataset], key: &str) -> Option<&'a SeasonDataset> {
    datasets.iter().find(|d| d.key == key)
}

/// Latest full season vs the history source, and the two latest full seasons.
fn progressions(
    datasets: &[SeasonDataset],
    history_source: Option<&str>,
) -> (Vec<ProgressionRow>, Vec<ProgressionRow>) {
    let seasons: BTreeSet<i32> = datasets
        .iter()
        .filter_map(|d| d.key.strip_prefix("actuals_")?.split('_').next()?.parse().ok())
        .collect();
    let mut latest = seasons
        .iter()
        .rev()
        .filter_map(|y| find(datasets, &actuals_key(*y, SeasonPhase::Full)));
    let (last, before) = (latest.next(), latest.next());

    let future = match (last, history_source.and_then(|s| find(datasets, &projections_key(s)))) {
        (Some(from), Some(to)) => progression(&from.per_game, &to.per_game, &from.label, &to.label),
        _ => {
            warn!("No season and projection pair for progression");
            Vec::new()
        }
    };
    let historical = match (before, last) {
        (Some(from), Some(to)) => progression(&from.per_game, &to.per_game, &from.label, &to.label),
        _ => Vec::new(),
    };
    (future, historical)
}

/// Run every stage and write the bundle.
///
/// A missing historical or projection table aborts before anything is written.
pub fn run(config: &Config) -> Result<BuildReport> {
    config.validate()?;

    let history = load_box_scores(&config.inputs.box_scores)?;
    let tables = config
        .inputs
        .projections
        .iter()
        .map(load_projections)
        .collect::<Result<Vec<_>>>()?;

    let (universe, _) = IdentityUniverse::build(&history, &tables, &config.matching);

    let mut scraped = ScrapedInputs::load(&config.inputs);
    let pages = PageArchive::new(mem::take(&mut scraped.pages));
    let (mut profiles, _) =
        enrich_profiles(&universe, &scraped, &pages, &config.matching, &config.enrichment)?;

    let projected: Vec<ProjectedGameRow> = tables
        .iter()
        .flat_map(|t| universe.resolve_projections(t))
        .collect();
    let minutes = trailing_minutes(&history, config.aggregation.minutes_window);

    let mut datasets = aggregate_actuals(&history, &profiles, config);
    for table in &tables {
        datasets.push(aggregate_projections(
            &table.source,
            &table.label,
            &projected,
            &minutes,
            &profiles,
            config,
        ));
    }
    for dataset in &mut datasets {
        score_dataset(&mut dataset.per_game);
    }

    let realized = realized_games(&history);
    let records = link_games(&projected, &realized, &minutes, config);
    let grades = historical_grades(&records);
    accuracy_summary(&grades);
    if let Some(source) = config.history_source() {
        let attached =
            attach_performance_history(&mut profiles, performance_history(&records, source));
        info!(source, points = attached, "Attached performance history");
    }
    let games = records.len();
    let graded_games = grades.len();

    let career = build_career_data(&history, &profiles, config.career.window_months);
    let (progression, progression_historical) =
        progressions(&datasets, config.history_source());

    let bundle = Bundle {
        last_updated: Utc::now(),
        daily_games: daily_games_by_date(records),
        historical_grades: grades,
        progression,
        progression_historical,
        career,
        profiles,
        datasets,
    };
    let files = write_bundle(&bundle, &config.output)?;

    Ok(BuildReport {
        history_rows: history.len(),
        identities: universe.len(),
        datasets: bundle.datasets.len(),
        games,
        graded_games,
        files,
    })
}
