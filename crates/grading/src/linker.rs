//! Projected-to-realized game linking.
//!
//! Projected rows are grouped into games per source by [`game_key`]. A game whose
//! key also appears among the realized box scores is graded: team totals, winner,
//! and per-player PTS/REB/AST ratings.

use crate::key::game_key;
use chrono::NaiveDate;
use statline_core::config::{Config, GradingConfig};
use statline_core::{
    team_abbreviation, BoxScoreRow, GameGrade, GameRecord, GameSummary, PersonId, PlayerActual,
    PlayerDeltas, ProjectedGameRow, ProjectedPlayer, Rating, StatDelta, StatErrors,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// `|predicted - actual|` relative to the actual value, or the prediction when the
/// actual is 0, or 1 when both are 0.
pub fn relative_error(predicted: f64, actual: f64) -> f64 {
    let diff = (predicted - actual).abs();
    let scale = if actual != 0.0 {
        actual
    } else if predicted != 0.0 {
        predicted
    } else {
        1.0
    };
    diff / scale.abs()
}

/// Rate a single stat prediction.
pub fn rate(predicted: f64, actual: f64, grading: &GradingConfig) -> Rating {
    let err = relative_error(predicted, actual);
    if err < grading.good_rel_error {
        Rating::Good
    } else if err > grading.bad_rel_error && (predicted - actual).abs() > grading.bad_abs_diff {
        Rating::Bad
    } else {
        Rating::Neutral
    }
}

/// A game that was actually played.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizedGame {
    pub date: NaiveDate,
    /// Points per team, summed over its box-score rows.
    pub team_points: BTreeMap<String, f64>,
    pub players: HashMap<PersonId, PlayerActual>,
}

/// Index box-score rows by game key.
///
/// Rows without a parseable date or opponent are skipped.
pub fn realized_games(rows: &[BoxScoreRow]) -> HashMap<String, RealizedGame> {
    let mut games: HashMap<String, RealizedGame> = HashMap::new();
    let mut skipped = 0usize;
    for row in rows {
        let (Some(date), Some(opponent)) = (row.date(), row.opponent()) else {
            skipped += 1;
            continue;
        };
        let team = team_abbreviation(&row.team);
        let key = game_key(date, &team, &team_abbreviation(&opponent));
        let game = games.entry(key).or_insert_with(|| RealizedGame {
            date,
            team_points: BTreeMap::new(),
            players: HashMap::new(),
        });
        let line = row.stat_line();
        *game.team_points.entry(team).or_insert(0.0) += line.pts;
        game.players.insert(
            row.player_id,
            PlayerActual {
                pts: line.pts,
                reb: line.reb,
                ast: line.ast,
            },
        );
    }
    if skipped > 0 {
        debug!(skipped, "Box-score rows without date or opponent");
    }
    games
}

/// Team with the strictly highest total, if any.
fn winner(totals: &BTreeMap<String, f64>) -> Option<&str> {
    let mut best: Option<(&str, f64)> = None;
    let mut tied = false;
    for (team, &points) in totals {
        match best {
            Some((_, top)) if points < top => {}
            Some((_, top)) if points == top => tied = true,
            _ => {
                best = Some((team.as_str(), points));
                tied = false;
            }
        }
    }
    if tied {
        None
    } else {
        best.map(|(team, _)| team)
    }
}

fn delta(predicted: f64, actual: f64, grading: &GradingConfig) -> StatDelta {
    StatDelta {
        predicted,
        actual,
        delta: actual - predicted,
        rating: rate(predicted, actual, grading),
    }
}

/// Grade one projected game against its realized counterpart.
///
/// Projected players missing from the box score did not play and are left out
/// of the player actuals, deltas and stat errors.
pub fn grade_game(
    projections: &BTreeMap<String, Vec<ProjectedPlayer>>,
    realized: &RealizedGame,
    grading: &GradingConfig,
) -> GameGrade {
    let mut summary = GameSummary::default();
    for (team, players) in projections {
        summary
            .predicted
            .insert(team.clone(), players.iter().map(|p| p.points).sum());
        summary.actual.insert(
            team.clone(),
            realized.team_points.get(team).copied().unwrap_or(0.0),
        );
    }

    let correct_winner = matches!(
        (winner(&summary.predicted), winner(&summary.actual)),
        (Some(p), Some(a)) if p == a
    );

    let score_closeness = if summary.predicted.is_empty() {
        0.0
    } else {
        summary
            .predicted
            .iter()
            .map(|(team, pred)| (pred - summary.actual.get(team).copied().unwrap_or(0.0)).abs())
            .sum::<f64>()
            / summary.predicted.len() as f64
    };

    let mut player_actuals = BTreeMap::new();
    let mut player_deltas = BTreeMap::new();
    let mut errors = StatErrors::default();
    for player in projections.values().flatten() {
        let Some(actual) = realized.players.get(&player.person_id) else {
            continue;
        };
        errors.pts += (player.points - actual.pts).abs();
        errors.reb += (player.reb - actual.reb).abs();
        errors.ast += (player.ast - actual.ast).abs();
        player_actuals.insert(player.person_id, *actual);
        player_deltas.insert(
            player.person_id,
            PlayerDeltas {
                pts: delta(player.points, actual.pts, grading),
                reb: delta(player.reb, actual.reb, grading),
                ast: delta(player.ast, actual.ast, grading),
            },
        );
    }
    if !player_actuals.is_empty() {
        let n = player_actuals.len() as f64;
        errors.pts /= n;
        errors.reb /= n;
        errors.ast /= n;
    }

    GameGrade {
        is_graded: true,
        game_summary: summary,
        correct_winner,
        player_actuals,
        player_deltas,
        score_closeness,
        stat_errors: errors,
    }
}

/// Projected game being assembled.
struct GameDraft {
    date: NaiveDate,
    teams: [String; 2],
    projections: BTreeMap<String, Vec<ProjectedPlayer>>,
}

/// Build one game record per (source, game key) and grade those already played.
///
/// Players without model minutes get their trailing minutes, or the placeholder.
/// Records come back ordered by source then key.
pub fn link_games(
    rows: &[ProjectedGameRow],
    realized: &HashMap<String, RealizedGame>,
    minutes: &HashMap<PersonId, f64>,
    config: &Config,
) -> Vec<GameRecord> {
    let placeholder = config.aggregation.placeholder_minutes;
    let mut drafts: BTreeMap<(String, String), GameDraft> = BTreeMap::new();
    let mut no_opponent = 0usize;

    for row in rows {
        let team = team_abbreviation(&row.team);
        let opponent = team_abbreviation(&row.opponent);
        if opponent.is_empty() {
            no_opponent += 1;
            continue;
        }
        let key = game_key(row.date, &team, &opponent);
        let draft = drafts
            .entry((row.source.clone(), key))
            .or_insert_with(|| {
                let mut teams = [team.clone(), opponent.clone()];
                teams.sort();
                GameDraft {
                    date: row.date,
                    projections: teams.iter().map(|t| (t.clone(), Vec::new())).collect(),
                    teams,
                }
            });
        let predicted_minutes = row
            .predicted_minutes
            .or_else(|| minutes.get(&row.person_id).copied())
            .unwrap_or(placeholder);
        draft.projections.entry(team).or_default().push(ProjectedPlayer {
            person_id: row.person_id,
            player_name: row.player_name.clone(),
            predicted_minutes,
            points: row.line.pts,
            reb: row.line.reb,
            ast: row.line.ast,
        });
    }
    if no_opponent > 0 {
        debug!(no_opponent, "Projected rows without opponent");
    }

    let mut graded = 0usize;
    let records: Vec<GameRecord> = drafts
        .into_iter()
        .map(|((source, key), mut draft)| {
            for players in draft.projections.values_mut() {
                players.sort_by(|a, b| {
                    b.predicted_minutes
                        .total_cmp(&a.predicted_minutes)
                        .then(a.person_id.cmp(&b.person_id))
                });
            }
            let grade = realized
                .get(&key)
                .map(|game| grade_game(&draft.projections, game, &config.grading));
            if grade.is_some() {
                graded += 1;
            }
            GameRecord {
                game_key: key,
                date: draft.date,
                source,
                teams: draft.teams,
                projections: draft.projections,
                grade,
            }
        })
        .collect();

    info!(games = records.len(), graded, "Linked projected games");
    records
}
