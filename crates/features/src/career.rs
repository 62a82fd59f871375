//! Monthly career curves per player and per cohort.

use crate::rolling::centered_mean;
use chrono::{Datelike, NaiveDate};
use statline_core::{
    BoxScoreRow, CareerData, CareerPoint, CareerStats, DraftCategory, PersonId, PlayerProfile,
    NOT_AVAILABLE,
};
use std::collections::BTreeMap;
use tracing::info;

const SMOOTHED_FIELDS: usize = 8;

/// Age in fractional years at a game date.
pub fn age_at(date: NaiveDate, birth_year: i32) -> f64 {
    f64::from(date.year() - birth_year) + f64::from(date.ordinal()) / 365.25
}

/// Apply a centered rolling mean to the smoothed stats of a monthly series.
///
/// Age and `x_games` are left as they are.
pub fn smooth(points: &mut [CareerPoint], window: usize) {
    for field in 0..SMOOTHED_FIELDS {
        let values: Vec<f64> = points.iter_mut().map(|p| *p.stats.fields_mut()[field]).collect();
        for (point, value) in points.iter_mut().zip(centered_mean(&values, window)) {
            *point.stats.fields_mut()[field] = value;
        }
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.into_iter().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Unsmoothed monthly points of one player, in month order.
fn monthly_points(games: &mut [&BoxScoreRow], birth_year: Option<i32>) -> Vec<CareerPoint> {
    games.sort_by(|a, b| (a.date(), &a.game_id).cmp(&(b.date(), &b.game_id)));

    let mut months: BTreeMap<String, Vec<(CareerStats, Option<f64>, f64)>> = BTreeMap::new();
    for (played, row) in games.iter().enumerate() {
        let Some(date) = row.date() else { continue };
        let age = birth_year.map(|y| age_at(date, y));
        months
            .entry(date.format("%Y-%m").to_string())
            .or_default()
            .push((CareerStats::from_line(&row.stat_line()), age, (played + 1) as f64));
    }

    months
        .into_iter()
        .map(|(month, games)| CareerPoint {
            month,
            age: mean(games.iter().filter_map(|g| g.1)),
            x_games: games.iter().map(|g| g.2).fold(0.0, f64::max),
            stats: CareerStats::mean(games.iter().map(|g| &g.0)),
        })
        .collect()
}

fn cohort_curve(members: &[&Vec<CareerPoint>], window: usize) -> Vec<CareerPoint> {
    let mut by_month: BTreeMap<&str, Vec<&CareerPoint>> = BTreeMap::new();
    for series in members {
        for point in series.iter() {
            by_month.entry(point.month.as_str()).or_default().push(point);
        }
    }
    let mut curve: Vec<CareerPoint> = by_month
        .into_iter()
        .map(|(month, points)| CareerPoint {
            month: month.to_string(),
            age: mean(points.iter().filter_map(|p| p.age)),
            x_games: mean(points.iter().map(|p| p.x_games)).unwrap_or(0.0),
            stats: CareerStats::mean(points.iter().map(|p| &p.stats)),
        })
        .collect();
    smooth(&mut curve, window);
    curve
}

/// Build player and cohort career curves.
pub fn build_career_data(
    rows: &[BoxScoreRow],
    profiles: &BTreeMap<PersonId, PlayerProfile>,
    window: usize,
) -> CareerData {
    let mut games: BTreeMap<PersonId, Vec<&BoxScoreRow>> = BTreeMap::new();
    for row in rows {
        games.entry(row.player_id).or_default().push(row);
    }

    let raw: BTreeMap<PersonId, Vec<CareerPoint>> = games
        .into_iter()
        .map(|(id, mut player_games)| {
            let birth_year = profiles.get(&id).and_then(|p| p.birth_year);
            (id, monthly_points(&mut player_games, birth_year))
        })
        .collect();

    let mut by_position: BTreeMap<String, Vec<&Vec<CareerPoint>>> = BTreeMap::new();
    let mut by_draft: BTreeMap<String, Vec<&Vec<CareerPoint>>> = BTreeMap::new();
    for (id, series) in &raw {
        let Some(profile) = profiles.get(id) else { continue };
        let position = profile.position.trim();
        if !position.is_empty() && position != NOT_AVAILABLE {
            by_position.entry(position.to_string()).or_default().push(series);
        }
        if profile.draft_category != DraftCategory::Unknown {
            by_draft
                .entry(profile.draft_category.label().to_string())
                .or_default()
                .push(series);
        }
    }

    let by_position: BTreeMap<String, Vec<CareerPoint>> = by_position
        .into_iter()
        .map(|(key, members)| (key, cohort_curve(&members, window)))
        .collect();
    let by_draft_category: BTreeMap<String, Vec<CareerPoint>> = by_draft
        .into_iter()
        .map(|(key, members)| (key, cohort_curve(&members, window)))
        .collect();

    let players: BTreeMap<PersonId, Vec<CareerPoint>> = raw
        .into_iter()
        .map(|(id, mut series)| {
            smooth(&mut series, window);
            (id, series)
        })
        .collect();

    info!(
        players = players.len(),
        positions = by_position.len(),
        draft_categories = by_draft_category.len(),
        "Built career curves"
    );
    CareerData {
        players,
        by_position,
        by_draft_category,
    }
}
