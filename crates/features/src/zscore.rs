//! Standardized scores across a per-game season dataset.
//!
//! Counting categories are z-scored directly (turnovers sign-flipped). Shooting
//! efficiency is first turned into a volume-weighted impact relative to the league
//! rate, then z-scored the same way.

use ordered_float::OrderedFloat;
use statline_core::{SeasonAggregateRow, StatCategory, StatLine, ZScores};
use statrs::statistics::Statistics;
use std::cmp::Reverse;

/// Mean and population standard deviation of one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub std: f64,
}

/// Pool statistics with the standard deviation floored to 1 when it is zero.
pub fn pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats { mean: 0.0, std: 1.0 };
    }
    let mean = values.mean();
    let std = values.population_std_dev();
    let std = if std.is_finite() && std > 0.0 { std } else { 1.0 };
    PoolStats { mean, std }
}

/// Z-score of a value against pool statistics.
pub fn zscore(value: f64, stats: &PoolStats) -> f64 {
    (value - stats.mean) / stats.std
}

/// League shooting rates over a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeagueRates {
    /// Total makes over total attempts, field goals.
    pub fg_pct: f64,
    /// Total makes over total attempts, free throws.
    pub ft_pct: f64,
    /// Mean field-goal attempts per row.
    pub fga_mean: f64,
    /// Mean free-throw attempts per row.
    pub fta_mean: f64,
}

impl LeagueRates {
    /// Rates over a set of stat lines.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a StatLine>) -> Self {
        let mut total = StatLine::default();
        let mut n = 0usize;
        for line in lines {
            total.add(line);
            n += 1;
        }
        let n = n.max(1) as f64;
        Self {
            fg_pct: total.fg_pct(),
            ft_pct: total.ft_pct(),
            fga_mean: total.fga / n,
            fta_mean: total.fta / n,
        }
    }
}

/// Volume-weighted shooting impact: `(pct - league_pct) * (attempts / league_mean_attempts)`.
///
/// Zero player or league attempts give 0.
pub fn shooting_impact(made: f64, attempts: f64, league_pct: f64, league_mean_attempts: f64) -> f64 {
    if attempts <= 0.0 || league_mean_attempts <= 0.0 {
        return 0.0;
    }
    (made / attempts - league_pct) * (attempts / league_mean_attempts)
}

fn raw_value(category: StatCategory, line: &StatLine, league: &LeagueRates) -> f64 {
    match category {
        StatCategory::FgImpact => shooting_impact(line.fgm, line.fga, league.fg_pct, league.fga_mean),
        StatCategory::FtImpact => shooting_impact(line.ftm, line.fta, league.ft_pct, league.fta_mean),
        other => other.counting_value(line).unwrap_or(0.0),
    }
}

/// Score a per-game dataset in place.
///
/// Every row gets all category z-scores, `custom_z_score` as their sum and a 1-based
/// rank. Rows are reordered by rank.
pub fn score_dataset(rows: &mut [SeasonAggregateRow]) {
    if rows.is_empty() {
        return;
    }
    let league = LeagueRates::from_lines(rows.iter().map(|r| &r.stats));

    let mut scores = vec![ZScores::default(); rows.len()];
    for category in StatCategory::ALL {
        let values: Vec<f64> = rows.iter().map(|r| raw_value(category, &r.stats, &league)).collect();
        let stats = pool_stats(&values);
        for (score, value) in scores.iter_mut().zip(&values) {
            let z = zscore(*value, &stats);
            score.set(category, if category.lower_is_better() { -z } else { z });
        }
    }

    for (row, score) in rows.iter_mut().zip(scores) {
        row.custom_z_score = Some(score.sum_of(&StatCategory::ALL));
        row.z = Some(score);
    }
    rank_rows(rows);
}

fn rank_rows(rows: &mut [SeasonAggregateRow]) {
    rows.sort_by_key(|r| (Reverse(OrderedFloat(r.custom_z_score.unwrap_or(0.0))), r.person_id));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = Some(i as u32 + 1);
    }
}

/// Composite over a subset of categories. Stored z-scores are not recomputed.
pub fn punted_score(row: &SeasonAggregateRow, active: &[StatCategory]) -> f64 {
    row.z.map_or(0.0, |z| z.sum_of(active))
}

/// Categories left after punting.
pub fn active_categories(punted: &[StatCategory]) -> Vec<StatCategory> {
    StatCategory::ALL
        .into_iter()
        .filter(|c| !punted.contains(c))
        .collect()
}

/// Rows ordered by their composite over `active`, with the score.
pub fn rank_by<'a>(
    rows: &'a [SeasonAggregateRow],
    active: &[StatCategory],
) -> Vec<(&'a SeasonAggregateRow, f64)> {
    let mut ranked: Vec<(&SeasonAggregateRow, f64)> =
        rows.iter().map(|r| (r, punted_score(r, active))).collect();
    ranked.sort_by_key(|(r, score)| (Reverse(OrderedFloat(*score)), r.person_id));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use statline_core::Split;

    fn row(id: i64, line: StatLine) -> SeasonAggregateRow {
        SeasonAggregateRow {
            person_id: id,
            player_name: format!("Player {id}"),
            team: "SEA".to_string(),
            position: "G".to_string(),
            split: Split::PerGame,
            gp: 10,
            stats: line,
            fg_pct: line.fg_pct(),
            ft_pct: line.ft_pct(),
            z: None,
            custom_z_score: None,
            rank: None,
        }
    }

    fn sample() -> Vec<SeasonAggregateRow> {
        vec![
            row(1, StatLine { pts: 20.0, reb: 5.0, ast: 3.0, tov: 3.0, fgm: 8.0, fga: 16.0, ftm: 3.0, fta: 4.0, ..Default::default() }),
            row(2, StatLine { pts: 10.0, reb: 8.0, ast: 1.0, tov: 1.0, fgm: 4.0, fga: 6.0, ftm: 1.0, fta: 2.0, ..Default::default() }),
            row(3, StatLine { pts: 15.0, reb: 2.0, ast: 6.0, tov: 2.0, fgm: 5.0, fga: 12.0, ..Default::default() }),
            row(4, StatLine { pts: 5.0, reb: 1.0, ast: 1.0, ..Default::default() }),
        ]
    }

    #[test]
    fn test_pool_stats_floor() {
        let stats = pool_stats(&[4.0, 4.0, 4.0]);
        assert_abs_diff_eq!(stats.mean, 4.0);
        assert_abs_diff_eq!(stats.std, 1.0);
        assert_abs_diff_eq!(zscore(4.0, &stats), 0.0);
    }

    #[test]
    fn test_turnovers_are_sign_flipped() {
        let mut rows = vec![
            row(1, StatLine { tov: 3.0, ..Default::default() }),
            row(2, StatLine { tov: 1.0, ..Default::default() }),
        ];
        score_dataset(&mut rows);
        let high = rows.iter().find(|r| r.person_id == 1).unwrap();
        assert_abs_diff_eq!(high.z.unwrap().z_TOV, -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_z_means_are_zero() {
        let mut rows = sample();
        score_dataset(&mut rows);
        for category in StatCategory::ALL {
            let mean = rows.iter().map(|r| r.z.unwrap().get(category)).sum::<f64>() / rows.len() as f64;
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_composite_equals_category_sum() {
        let mut rows = sample();
        score_dataset(&mut rows);
        for r in &rows {
            let z = r.z.unwrap();
            assert_abs_diff_eq!(r.custom_z_score.unwrap(), z.sum_of(&StatCategory::ALL), epsilon = 1e-10);
            assert_abs_diff_eq!(punted_score(r, &[StatCategory::Reb]), z.z_REB, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_rank_order() {
        let mut rows = sample();
        score_dataset(&mut rows);
        for pair in rows.windows(2) {
            assert!(pair[0].custom_z_score >= pair[1].custom_z_score);
        }
        assert_eq!(rows[0].rank, Some(1));
        assert_eq!(rows.last().unwrap().rank, Some(4));
    }

    #[test]
    fn test_shooting_impact() {
        assert_abs_diff_eq!(shooting_impact(6.0, 10.0, 0.5, 5.0), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(shooting_impact(0.0, 0.0, 0.5, 5.0), 0.0);
        assert_abs_diff_eq!(shooting_impact(3.0, 4.0, 0.5, 0.0), 0.0);
    }

    #[test]
    fn test_punting_reorders() {
        let mut rows = sample();
        score_dataset(&mut rows);
        let active = active_categories(&[StatCategory::Pts]);
        assert_eq!(active.len(), 8);
        let ranked = rank_by(&rows, &[StatCategory::Reb]);
        assert_eq!(ranked[0].0.person_id, 2);
    }
}
