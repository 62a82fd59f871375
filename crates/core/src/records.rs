//! Records that make up the published bundle.

use crate::types::{PersonId, Split, StatCategory, StatLine, NOT_AVAILABLE};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Draft bucket derived from free-text draft info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DraftCategory {
    #[serde(rename = "No. 1 Pick")]
    NumberOnePick,
    #[serde(rename = "Top 5 Pick")]
    TopFivePick,
    #[serde(rename = "1st Round (6+)")]
    FirstRound,
    #[serde(rename = "2nd Round")]
    SecondRound,
    #[serde(rename = "3rd+ Round")]
    LaterRound,
    #[serde(rename = "Undrafted")]
    Undrafted,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl DraftCategory {
    /// Bucket label as published.
    pub fn label(self) -> &'static str {
        match self {
            DraftCategory::NumberOnePick => "No. 1 Pick",
            DraftCategory::TopFivePick => "Top 5 Pick",
            DraftCategory::FirstRound => "1st Round (6+)",
            DraftCategory::SecondRound => "2nd Round",
            DraftCategory::LaterRound => "3rd+ Round",
            DraftCategory::Undrafted => "Undrafted",
            DraftCategory::Unknown => "Unknown",
        }
    }

    /// Bucket for a round and overall pick number.
    pub fn from_round_pick(round: u32, pick: Option<u32>) -> DraftCategory {
        match (round, pick) {
            (1, Some(1)) => DraftCategory::NumberOnePick,
            (1, Some(2..=5)) => DraftCategory::TopFivePick,
            (1, _) => DraftCategory::FirstRound,
            (2, _) => DraftCategory::SecondRound,
            (r, _) if r >= 3 => DraftCategory::LaterRound,
            _ => DraftCategory::Unknown,
        }
    }
}

impl fmt::Display for DraftCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One graded game in a player's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub predicted_pts: f64,
    pub actual_pts: f64,
}

/// Latest injury report attached to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryStatus {
    pub status: String,
    pub date: String,
    pub details: String,
}

/// Biography and roster attributes of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub player_name: String,
    pub team: String,
    pub position: String,
    pub height: String,
    pub weight: String,
    pub draft_info: String,
    pub draft_category: DraftCategory,
    pub birth_year: Option<i32>,
    pub wiki_url: Option<String>,
    pub injury: Option<InjuryStatus>,
    pub performance_history: Vec<PerformancePoint>,
}

impl PlayerProfile {
    /// Profile with every field at its default.
    pub fn with_defaults(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            team: NOT_AVAILABLE.to_string(),
            position: NOT_AVAILABLE.to_string(),
            height: NOT_AVAILABLE.to_string(),
            weight: NOT_AVAILABLE.to_string(),
            draft_info: NOT_AVAILABLE.to_string(),
            draft_category: DraftCategory::Unknown,
            birth_year: None,
            wiki_url: None,
            injury: None,
            performance_history: Vec::new(),
        }
    }
}

/// Standardized scores per category.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZScores {
    pub z_PTS: f64,
    pub z_REB: f64,
    pub z_AST: f64,
    pub z_STL: f64,
    pub z_BLK: f64,
    #[serde(rename = "z_3PM")]
    pub z_3PM: f64,
    pub z_TOV: f64,
    pub z_FG_impact: f64,
    pub z_FT_impact: f64,
}

impl ZScores {
    /// Score for one category.
    pub fn get(&self, category: StatCategory) -> f64 {
        match category {
            StatCategory::Pts => self.z_PTS,
            StatCategory::Reb => self.z_REB,
            StatCategory::Ast => self.z_AST,
            StatCategory::Stl => self.z_STL,
            StatCategory::Blk => self.z_BLK,
            StatCategory::ThreePm => self.z_3PM,
            StatCategory::Tov => self.z_TOV,
            StatCategory::FgImpact => self.z_FG_impact,
            StatCategory::FtImpact => self.z_FT_impact,
        }
    }

    /// Set the score for one category.
    pub fn set(&mut self, category: StatCategory, value: f64) {
        let slot = match category {
            StatCategory::Pts => &mut self.z_PTS,
            StatCategory::Reb => &mut self.z_REB,
            StatCategory::Ast => &mut self.z_AST,
            StatCategory::Stl => &mut self.z_STL,
            StatCategory::Blk => &mut self.z_BLK,
            StatCategory::ThreePm => &mut self.z_3PM,
            StatCategory::Tov => &mut self.z_TOV,
            StatCategory::FgImpact => &mut self.z_FG_impact,
            StatCategory::FtImpact => &mut self.z_FT_impact,
        };
        *slot = value;
    }

    /// Unweighted sum over the given categories.
    pub fn sum_of(&self, categories: &[StatCategory]) -> f64 {
        categories.iter().map(|&c| self.get(c)).sum()
    }
}

/// One player's line in a season dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonAggregateRow {
    #[serde(rename = "personId")]
    pub person_id: PersonId,
    #[serde(rename = "playerName")]
    pub player_name: String,
    pub team: String,
    pub position: String,
    pub split: Split,
    #[serde(rename = "GP")]
    pub gp: u32,
    #[serde(flatten)]
    pub stats: StatLine,
    #[serde(rename = "FG%")]
    pub fg_pct: f64,
    #[serde(rename = "FT%")]
    pub ft_pct: f64,
    #[serde(flatten)]
    pub z: Option<ZScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_z_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// Season dataset with its `total` and `per_game` variants.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonDataset {
    /// Dataset key without split suffix (e.g. `actuals_2024_full`).
    pub key: String,
    /// Human label (e.g. "2024 Full Season").
    pub label: String,
    pub total: Vec<SeasonAggregateRow>,
    pub per_game: Vec<SeasonAggregateRow>,
}

/// A projected player inside a game record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPlayer {
    #[serde(rename = "personId")]
    pub person_id: PersonId,
    #[serde(rename = "playerName")]
    pub player_name: String,
    #[serde(rename = "Predicted_Minutes")]
    pub predicted_minutes: f64,
    pub points: f64,
    pub reb: f64,
    pub ast: f64,
}

/// Realized PTS/REB/AST of a graded player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerActual {
    #[serde(rename = "PTS")]
    pub pts: f64,
    #[serde(rename = "REB")]
    pub reb: f64,
    #[serde(rename = "AST")]
    pub ast: f64,
}

/// Quality of a single stat prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Good,
    Neutral,
    Bad,
}

/// Predicted vs realized value of one stat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatDelta {
    pub predicted: f64,
    pub actual: f64,
    pub delta: f64,
    pub rating: Rating,
}

/// Per-stat deltas of a graded player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerDeltas {
    #[serde(rename = "PTS")]
    pub pts: StatDelta,
    #[serde(rename = "REB")]
    pub reb: StatDelta,
    #[serde(rename = "AST")]
    pub ast: StatDelta,
}

/// Mean absolute error per graded stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatErrors {
    #[serde(rename = "PTS")]
    pub pts: f64,
    #[serde(rename = "REB")]
    pub reb: f64,
    #[serde(rename = "AST")]
    pub ast: f64,
}

/// Predicted and realized team point totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub predicted: BTreeMap<String, f64>,
    pub actual: BTreeMap<String, f64>,
}

/// Grade of a projected game that has a realized counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameGrade {
    pub is_graded: bool,
    pub game_summary: GameSummary,
    pub correct_winner: bool,
    pub player_actuals: BTreeMap<PersonId, PlayerActual>,
    pub player_deltas: BTreeMap<PersonId, PlayerDeltas>,
    pub score_closeness: f64,
    pub stat_errors: StatErrors,
}

/// A projected game, graded when the realized game is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub game_key: String,
    pub date: NaiveDate,
    pub source: String,
    /// The two teams in key order.
    pub teams: [String; 2],
    pub projections: BTreeMap<String, Vec<ProjectedPlayer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<GameGrade>,
}

/// One entry of the flat grade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeEntry {
    pub date: NaiveDate,
    pub source: String,
    pub game_key: String,
    pub correct_winner: bool,
    pub score_closeness: f64,
    pub stat_errors: StatErrors,
}

/// Averaged stats of a career point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerStats {
    #[serde(rename = "PTS")]
    pub pts: f64,
    #[serde(rename = "REB")]
    pub reb: f64,
    #[serde(rename = "AST")]
    pub ast: f64,
    #[serde(rename = "STL")]
    pub stl: f64,
    #[serde(rename = "BLK")]
    pub blk: f64,
    #[serde(rename = "3PM")]
    pub fg3m: f64,
    #[serde(rename = "TOV")]
    pub tov: f64,
    #[serde(rename = "MIN")]
    pub min: f64,
}

impl CareerStats {
    /// Career stats carried over from a box-score line.
    pub fn from_line(line: &StatLine) -> Self {
        Self {
            pts: line.pts,
            reb: line.reb,
            ast: line.ast,
            stl: line.stl,
            blk: line.blk,
            fg3m: line.fg3m,
            tov: line.tov,
            min: line.min,
        }
    }

    /// Mutable references to every field, in `PTS, REB, AST, STL, BLK, 3PM, TOV, MIN` order.
    pub fn fields_mut(&mut self) -> [&mut f64; 8] {
        [
            &mut self.pts,
            &mut self.reb,
            &mut self.ast,
            &mut self.stl,
            &mut self.blk,
            &mut self.fg3m,
            &mut self.tov,
            &mut self.min,
        ]
    }

    /// Field-wise mean of the given stats; zeroes when empty.
    pub fn mean<'a>(items: impl IntoIterator<Item = &'a CareerStats>) -> CareerStats {
        let mut sum = CareerStats::default();
        let mut n = 0usize;
        for s in items {
            sum.pts += s.pts;
            sum.reb += s.reb;
            sum.ast += s.ast;
            sum.stl += s.stl;
            sum.blk += s.blk;
            sum.fg3m += s.fg3m;
            sum.tov += s.tov;
            sum.min += s.min;
            n += 1;
        }
        if n == 0 {
            return sum;
        }
        let n = n as f64;
        CareerStats {
            pts: sum.pts / n,
            reb: sum.reb / n,
            ast: sum.ast / n,
            stl: sum.stl / n,
            blk: sum.blk / n,
            fg3m: sum.fg3m / n,
            tov: sum.tov / n,
            min: sum.min / n,
        }
    }
}

/// Monthly point on a career curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerPoint {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub age: Option<f64>,
    pub x_games: f64,
    #[serde(flatten)]
    pub stats: CareerStats,
}

/// Player and cohort career curves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerData {
    pub players: BTreeMap<PersonId, Vec<CareerPoint>>,
    pub by_position: BTreeMap<String, Vec<CareerPoint>>,
    pub by_draft_category: BTreeMap<String, Vec<CareerPoint>>,
}

/// Year-over-year change in composite score.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRow {
    #[serde(rename = "personId")]
    pub person_id: PersonId,
    #[serde(rename = "playerName")]
    pub player_name: String,
    pub team: String,
    pub from: String,
    pub to: String,
    pub z_Total_from: f64,
    pub z_Total_to: f64,
    pub z_Change: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_draft_category_buckets() {
        assert_eq!(DraftCategory::from_round_pick(1, Some(1)), DraftCategory::NumberOnePick);
        assert_eq!(DraftCategory::from_round_pick(1, Some(3)), DraftCategory::TopFivePick);
        assert_eq!(DraftCategory::from_round_pick(1, Some(12)), DraftCategory::FirstRound);
        assert_eq!(DraftCategory::from_round_pick(2, Some(15)), DraftCategory::SecondRound);
        assert_eq!(DraftCategory::from_round_pick(3, None), DraftCategory::LaterRound);
        assert_eq!(DraftCategory::from_round_pick(0, None), DraftCategory::Unknown);
    }

    #[test]
    fn test_profile_defaults_keep_every_key() {
        let profile = PlayerProfile::with_defaults("Test Player");
        let json = serde_json::to_value(&profile).unwrap();
        for key in ["team", "position", "height", "weight", "draftInfo", "birthYear", "wikiUrl"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["draftCategory"], "Unknown");
        assert_eq!(json["team"], NOT_AVAILABLE);
        assert!(json["birthYear"].is_null());
    }

    #[test]
    fn test_zscores_sum_of_subset() {
        let mut z = ZScores::default();
        z.set(StatCategory::Pts, 1.5);
        z.set(StatCategory::Tov, -0.5);
        assert_abs_diff_eq!(z.sum_of(&StatCategory::ALL), 1.0);
        assert_abs_diff_eq!(z.sum_of(&[StatCategory::Pts]), 1.5);
    }

    #[test]
    fn test_season_row_json_keys() {
        let row = SeasonAggregateRow {
            person_id: 7,
            player_name: "Test Player".to_string(),
            team: "SEA".to_string(),
            position: "G".to_string(),
            split: Split::PerGame,
            gp: 2,
            stats: StatLine { fg3m: 1.5, ..Default::default() },
            fg_pct: 0.0,
            ft_pct: 0.0,
            z: Some(ZScores { z_3PM: 0.25, ..Default::default() }),
            custom_z_score: Some(0.25),
            rank: Some(1),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["personId"], 7);
        assert_eq!(json["3PM"], 1.5);
        assert_eq!(json["z_3PM"], 0.25);
        assert_eq!(json["split"], "per_game");

        let back: SeasonAggregateRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_total_row_has_no_scores() {
        let row = SeasonAggregateRow {
            person_id: 7,
            player_name: "Test Player".to_string(),
            team: "SEA".to_string(),
            position: "G".to_string(),
            split: Split::Total,
            gp: 2,
            stats: StatLine::default(),
            fg_pct: 0.0,
            ft_pct: 0.0,
            z: None,
            custom_z_score: None,
            rank: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("z_PTS").is_none());
        assert!(json.get("custom_z_score").is_none());
    }

    #[test]
    fn test_career_stats_mean() {
        let a = CareerStats { pts: 10.0, ..Default::default() };
        let b = CareerStats { pts: 20.0, reb: 4.0, ..Default::default() };
        let mean = CareerStats::mean([&a, &b]);
        assert_abs_diff_eq!(mean.pts, 15.0);
        assert_abs_diff_eq!(mean.reb, 2.0);
        assert_eq!(CareerStats::mean(std::iter::empty()), CareerStats::default());
    }
}
