//! Views over linked game records.

use statline_core::{GameRecord, GradeEntry, PerformancePoint, PersonId, PlayerProfile};
use std::collections::BTreeMap;
use tracing::info;

/// Game records grouped by date (`YYYY-MM-DD`), sorted by key within a date.
pub fn daily_games_by_date(records: Vec<GameRecord>) -> BTreeMap<String, Vec<GameRecord>> {
    let mut by_date: BTreeMap<String, Vec<GameRecord>> = BTreeMap::new();
    for record in records {
        by_date
            .entry(record.date.format("%Y-%m-%d").to_string())
            .or_default()
            .push(record);
    }
    for games in by_date.values_mut() {
        games.sort_by(|a, b| (&a.game_key, &a.source).cmp(&(&b.game_key, &b.source)));
    }
    by_date
}

/// One entry per graded game per source, sorted by date then key.
pub fn historical_grades(records: &[GameRecord]) -> Vec<GradeEntry> {
    let mut entries: Vec<GradeEntry> = records
        .iter()
        .filter_map(|record| {
            let grade = record.grade.as_ref()?;
            Some(GradeEntry {
                date: record.date,
                source: record.source.clone(),
                game_key: record.game_key.clone(),
                correct_winner: grade.correct_winner,
                score_closeness: grade.score_closeness,
                stat_errors: grade.stat_errors,
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        (a.date, &a.game_key, &a.source).cmp(&(b.date, &b.game_key, &b.source))
    });
    entries
}

/// Prediction accuracy of one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccuracySummary {
    /// Projection source id.
    pub source: String,
    /// Number of graded games.
    pub games_graded: u32,
    /// Graded games where the predicted winner won.
    pub correct_winners: u32,
    /// Correct winners over graded games (0-1).
    pub accuracy: f64,
    /// Mean team-total error.
    pub mean_score_closeness: f64,
}

/// Per-source accuracy over a grade list, logged as it is computed.
pub fn accuracy_summary(grades: &[GradeEntry]) -> Vec<AccuracySummary> {
    let mut by_source: BTreeMap<&str, AccuracySummary> = BTreeMap::new();
    for grade in grades {
        let summary = by_source
            .entry(grade.source.as_str())
            .or_insert_with(|| AccuracySummary {
                source: grade.source.clone(),
                ..Default::default()
            });
        summary.games_graded += 1;
        if grade.correct_winner {
            summary.correct_winners += 1;
        }
        summary.mean_score_closeness += grade.score_closeness;
    }

    by_source
        .into_values()
        .map(|mut summary| {
            let n = f64::from(summary.games_graded.max(1));
            summary.accuracy = f64::from(summary.correct_winners) / n;
            summary.mean_score_closeness /= n;
            info!(
                source = %summary.source,
                games = summary.games_graded,
                correct = summary.correct_winners,
                accuracy = %format!("{:.1}%", summary.accuracy * 100.0),
                closeness = %format!("{:.2}", summary.mean_score_closeness),
                "Prediction accuracy"
            );
            summary
        })
        .collect()
}

/// Predicted vs actual points per player from one source's graded games.
///
/// Every graded player-game gives one point. Points are in date order.
pub fn performance_history(
    records: &[GameRecord],
    source: &str,
) -> BTreeMap<PersonId, Vec<PerformancePoint>> {
    let mut history: BTreeMap<PersonId, Vec<PerformancePoint>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.source == source) {
        let Some(grade) = &record.grade else { continue };
        for player in record.projections.values().flatten() {
            if let Some(actual) = grade.player_actuals.get(&player.person_id) {
                history.entry(player.person_id).or_default().push(PerformancePoint {
                    date: record.date,
                    predicted_pts: player.points,
                    actual_pts: actual.pts,
                });
            }
        }
    }
    for points in history.values_mut() {
        points.sort_by_key(|p| p.date);
    }
    history
}

/// Replace each profile's performance history. Returns the number of points attached.
pub fn attach_performance_history(
    profiles: &mut BTreeMap<PersonId, PlayerProfile>,
    mut history: BTreeMap<PersonId, Vec<PerformancePoint>>,
) -> usize {
    let mut attached = 0;
    for (person_id, profile) in profiles.iter_mut() {
        profile.performance_history = history.remove(person_id).unwrap_or_default();
        attached += profile.performance_history.len();
    }
    attached
}
