//! Season aggregation of per-game rows.
//!
//! Every dataset comes in a `total` variant (sums plus games played) and a
//! `per_game` variant (totals divided by games played, clamped to at least one).

use crate::rolling::RollingMean;
use chrono::{Datelike, NaiveDate};
use statline_core::config::Config;
use statline_core::{
    BoxScoreRow, PersonId, PlayerProfile, ProjectedGameRow, SeasonAggregateRow, SeasonDataset,
    Split, StatLine, NOT_AVAILABLE,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Part of a historical season a dataset covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonPhase {
    /// Every game of the season.
    Full,
    /// Games on or before the trade deadline.
    PreTrade,
    /// Games after the trade deadline.
    PostTrade,
}

impl SeasonPhase {
    /// Key fragment (`full`, `pre_trade`, `post_trade`).
    pub fn key(self) -> &'static str {
        match self {
            SeasonPhase::Full => "full",
            SeasonPhase::PreTrade => "pre_trade",
            SeasonPhase::PostTrade => "post_trade",
        }
    }

    fn label(self, year: i32) -> String {
        match self {
            SeasonPhase::Full => format!("{year} Full Season"),
            SeasonPhase::PreTrade => format!("{year} Pre-Trade Deadline"),
            SeasonPhase::PostTrade => format!("{year} Post-Trade Deadline"),
        }
    }
}

/// Dataset key of a historical season phase (without split suffix).
pub fn actuals_key(year: i32, phase: SeasonPhase) -> String {
    format!("actuals_{year}_{}", phase.key())
}

/// Dataset key of a projection source (without split suffix).
pub fn projections_key(source: &str) -> String {
    format!("projections_{source}")
}

/// Running sums for one player within one dataset.
#[derive(Debug, Default)]
struct PlayerAccumulator {
    line: StatLine,
    games: HashSet<String>,
    /// Date, team and name of the player's latest row.
    latest: Option<(NaiveDate, String, String)>,
}

impl PlayerAccumulator {
    fn add(&mut self, game: String, date: NaiveDate, team: &str, name: &str, line: &StatLine) {
        self.line.add(line);
        self.games.insert(game);
        let newer = self.latest.as_ref().map_or(true, |(d, _, _)| date >= *d);
        if newer {
            self.latest = Some((date, team.trim().to_string(), name.trim().to_string()));
        }
    }

    fn games_played(&self) -> u32 {
        self.games.len() as u32
    }
}

fn is_blank(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v == NOT_AVAILABLE
}

fn finish_rows(
    accumulators: BTreeMap<PersonId, PlayerAccumulator>,
    profiles: &BTreeMap<PersonId, PlayerProfile>,
) -> (Vec<SeasonAggregateRow>, Vec<SeasonAggregateRow>) {
    let mut total = Vec::with_capacity(accumulators.len());
    let mut per_game = Vec::with_capacity(accumulators.len());
    for (person_id, acc) in accumulators {
        let profile = profiles.get(&person_id);
        let (row_team, row_name) = acc
            .latest
            .as_ref()
            .map(|(_, team, name)| (team.as_str(), name.as_str()))
            .unwrap_or(("", ""));

        let team = if is_blank(row_team) {
            profile.map_or(NOT_AVAILABLE, |p| p.team.as_str())
        } else {
            row_team
        };
        let player_name = match profile {
            Some(p) if !is_blank(&p.player_name) => p.player_name.as_str(),
            _ => row_name,
        };
        let position = profile.map_or(NOT_AVAILABLE, |p| p.position.as_str());

        let gp = acc.games_played();
        let divisor = f64::from(gp.max(1));
        let totals = acc.line;

        let base = SeasonAggregateRow {
            person_id,
            player_name: player_name.to_string(),
            team: team.to_string(),
            position: position.to_string(),
            split: Split::Total,
            gp,
            stats: totals,
            fg_pct: totals.fg_pct(),
            ft_pct: totals.ft_pct(),
            z: None,
            custom_z_score: None,
            rank: None,
        };
        per_game.push(SeasonAggregateRow {
            split: Split::PerGame,
            stats: totals.scaled(1.0 / divisor),
            ..base.clone()
        });
        total.push(base);
    }
    (total, per_game)
}

/// Aggregate the historical table into season datasets.
///
/// Each season yields a `full` dataset, plus `pre_trade` and `post_trade` when a
/// trade deadline is configured for it. Playoff games are skipped unless enabled.
pub fn aggregate_actuals(
    rows: &[BoxScoreRow],
    profiles: &BTreeMap<PersonId, PlayerProfile>,
    config: &Config,
) -> Vec<SeasonDataset> {
    let include_playoffs = config.aggregation.include_playoffs;
    let mut by_season: BTreeMap<i32, Vec<(&BoxScoreRow, NaiveDate)>> = BTreeMap::new();
    let mut playoff_rows = 0usize;
    for row in rows {
        if row.is_playoffs() && !include_playoffs {
            playoff_rows += 1;
            continue;
        }
        if let Some(date) = row.date() {
            by_season.entry(date.year()).or_default().push((row, date));
        }
    }
    if playoff_rows > 0 {
        debug!(playoff_rows, "Excluded playoff rows from season aggregates");
    }

    let mut datasets = Vec::new();
    for (year, season_rows) in &by_season {
        let mut phases = vec![(SeasonPhase::Full, None)];
        if let Some(deadline) = config.trade_deadline(*year) {
            phases.push((SeasonPhase::PreTrade, Some((deadline, true))));
            phases.push((SeasonPhase::PostTrade, Some((deadline, false))));
        }

        for (phase, cut) in phases {
            let mut accumulators: BTreeMap<PersonId, PlayerAccumulator> = BTreeMap::new();
            for (row, date) in season_rows {
                let keep = match cut {
                    None => true,
                    Some((deadline, true)) => *date <= deadline,
                    Some((deadline, false)) => *date > deadline,
                };
                if !keep {
                    continue;
                }
                accumulators.entry(row.player_id).or_default().add(
                    row.game_id.trim().to_string(),
                    *date,
                    &row.team,
                    &row.player_name,
                    &row.stat_line(),
                );
            }
            let (total, per_game) = finish_rows(accumulators, profiles);
            let dataset = SeasonDataset {
                key: actuals_key(*year, phase),
                label: phase.label(*year),
                total,
                per_game,
            };
            info!(key = %dataset.key, players = dataset.total.len(), "Aggregated season");
            datasets.push(dataset);
        }
    }
    datasets
}

/// Trailing average minutes per player over their most recent games with minutes.
pub fn trailing_minutes(rows: &[BoxScoreRow], window: usize) -> HashMap<PersonId, f64> {
    let mut games: HashMap<PersonId, Vec<(NaiveDate, &str, f64)>> = HashMap::new();
    for row in rows {
        if let (Some(date), Some(min)) = (row.date(), row.min) {
            games.entry(row.player_id).or_default().push((date, row.game_id.as_str(), min));
        }
    }
    games
        .into_iter()
        .filter_map(|(person_id, mut played)| {
            played.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
            let mut mean = RollingMean::new(window);
            for (_, _, min) in &played {
                mean.push(*min);
            }
            mean.mean().map(|m| (person_id, m))
        })
        .collect()
}

/// Aggregate one source's resolved projection rows.
///
/// Games played counts distinct `(date, team)` pairs. Minutes per game come from
/// `minutes` (trailing history) or `placeholder_minutes`.
pub fn aggregate_projections(
    source: &str,
    label: &str,
    rows: &[ProjectedGameRow],
    minutes: &HashMap<PersonId, f64>,
    profiles: &BTreeMap<PersonId, PlayerProfile>,
    config: &Config,
) -> SeasonDataset {
    let placeholder = config.aggregation.placeholder_minutes;
    let mut accumulators: BTreeMap<PersonId, PlayerAccumulator> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.source == source) {
        accumulators.entry(row.person_id).or_default().add(
            format!("{}|{}", row.date, row.team),
            row.date,
            &row.team,
            &row.player_name,
            &row.line,
        );
    }

    let mut placeholders = 0usize;
    for (person_id, acc) in accumulators.iter_mut() {
        let per_game = match minutes.get(person_id) {
            Some(m) => *m,
            None => {
                placeholders += 1;
                placeholder
            }
        };
        acc.line.min = per_game * f64::from(acc.games_played());
    }
    if placeholders > 0 {
        debug!(source, placeholders, "Projected players without minutes history");
    }

    let (total, per_game) = finish_rows(accumulators, profiles);
    let dataset = SeasonDataset {
        key: projections_key(source),
        label: format!("{label} Projections"),
        total,
        per_game,
    };
    info!(key = %dataset.key, players = dataset.total.len(), "Aggregated projections");
    dataset
}
