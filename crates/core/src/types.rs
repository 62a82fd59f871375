//! Core data types for the statline pipeline.
//!
//! Raw input rows, the shared box-score stat line and the scoring categories.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable player key.
pub type PersonId = i64;

/// Sentinel for a text field no source could supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// Team assigned to players only found in the all-players listing.
pub const FREE_AGENT: &str = "FA";

/// Parse a game date such as `2024-08-25` or `2024-08-25T00:00:00`.
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Counting stats for one game, or summed/averaged over many.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
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
    #[serde(rename = "FGM")]
    pub fgm: f64,
    #[serde(rename = "FGA")]
    pub fga: f64,
    #[serde(rename = "FTM")]
    pub ftm: f64,
    #[serde(rename = "FTA")]
    pub fta: f64,
    #[serde(rename = "MIN")]
    pub min: f64,
}

impl StatLine {
    /// Add another line into this one.
    pub fn add(&mut self, other: &StatLine) {
        self.pts += other.pts;
        self.reb += other.reb;
        self.ast += other.ast;
        self.stl += other.stl;
        self.blk += other.blk;
        self.fg3m += other.fg3m;
        self.tov += other.tov;
        self.fgm += other.fgm;
        self.fga += other.fga;
        self.ftm += other.ftm;
        self.fta += other.fta;
        self.min += other.min;
    }

    /// Every field multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> StatLine {
        StatLine {
            pts: self.pts * factor,
            reb: self.reb * factor,
            ast: self.ast * factor,
            stl: self.stl * factor,
            blk: self.blk * factor,
            fg3m: self.fg3m * factor,
            tov: self.tov * factor,
            fgm: self.fgm * factor,
            fga: self.fga * factor,
            ftm: self.ftm * factor,
            fta: self.fta * factor,
            min: self.min * factor,
        }
    }

    /// Field-goal percentage (0 with no attempts).
    pub fn fg_pct(&self) -> f64 {
        if self.fga > 0.0 {
            self.fgm / self.fga
        } else {
            0.0
        }
    }

    /// Free-throw percentage (0 with no attempts).
    pub fn ft_pct(&self) -> f64 {
        if self.fta > 0.0 {
            self.ftm / self.fta
        } else {
            0.0
        }
    }
}

/// A scoring category of the standardized-score engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatCategory {
    Pts,
    Reb,
    Ast,
    Stl,
    Blk,
    ThreePm,
    Tov,
    FgImpact,
    FtImpact,
}

impl StatCategory {
    /// All categories in display order.
    pub const ALL: [StatCategory; 9] = [
        StatCategory::Pts,
        StatCategory::Reb,
        StatCategory::Ast,
        StatCategory::Stl,
        StatCategory::Blk,
        StatCategory::ThreePm,
        StatCategory::Tov,
        StatCategory::FgImpact,
        StatCategory::FtImpact,
    ];

    /// Column key used in the bundle (`PTS`, `3PM`, `FG_impact`, ...).
    pub fn key(self) -> &'static str {
        match self {
            StatCategory::Pts => "PTS",
            StatCategory::Reb => "REB",
            StatCategory::Ast => "AST",
            StatCategory::Stl => "STL",
            StatCategory::Blk => "BLK",
            StatCategory::ThreePm => "3PM",
            StatCategory::Tov => "TOV",
            StatCategory::FgImpact => "FG_impact",
            StatCategory::FtImpact => "FT_impact",
        }
    }

    /// Parse a column key, case-insensitive.
    pub fn from_key(key: &str) -> Option<StatCategory> {
        let wanted = key.trim();
        StatCategory::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(wanted))
    }

    /// Turnovers count against a player.
    pub fn lower_is_better(self) -> bool {
        matches!(self, StatCategory::Tov)
    }

    /// Raw value of a counting category. `None` for impact categories.
    pub fn counting_value(self, line: &StatLine) -> Option<f64> {
        match self {
            StatCategory::Pts => Some(line.pts),
            StatCategory::Reb => Some(line.reb),
            StatCategory::Ast => Some(line.ast),
            StatCategory::Stl => Some(line.stl),
            StatCategory::Blk => Some(line.blk),
            StatCategory::ThreePm => Some(line.fg3m),
            StatCategory::Tov => Some(line.tov),
            StatCategory::FgImpact | StatCategory::FtImpact => None,
        }
    }
}

/// Season aggregate variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    /// Sums over all games.
    Total,
    /// Totals divided by games played.
    PerGame,
}

impl Split {
    /// Suffix appended to a dataset key.
    pub fn suffix(self) -> &'static str {
        match self {
            Split::Total => "total",
            Split::PerGame => "per_game",
        }
    }
}

/// One historical player-game, as stored in the box-score table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxScoreRow {
    #[serde(rename = "PLAYER_ID")]
    pub player_id: PersonId,
    #[serde(rename = "PLAYER_NAME")]
    pub player_name: String,
    #[serde(rename = "TEAM_ABBREVIATION")]
    pub team: String,
    #[serde(rename = "GAME_ID")]
    pub game_id: String,
    #[serde(rename = "GAME_DATE")]
    pub game_date: String,
    #[serde(rename = "MATCHUP", default)]
    pub matchup: String,
    #[serde(rename = "SEASON_TYPE", default)]
    pub season_type: Option<String>,
    #[serde(rename = "MIN", default)]
    pub min: Option<f64>,
    #[serde(rename = "FGM", default)]
    pub fgm: Option<f64>,
    #[serde(rename = "FGA", default)]
    pub fga: Option<f64>,
    #[serde(rename = "FG3M", default)]
    pub fg3m: Option<f64>,
    #[serde(rename = "FTM", default)]
    pub ftm: Option<f64>,
    #[serde(rename = "FTA", default)]
    pub fta: Option<f64>,
    #[serde(rename = "REB", default)]
    pub reb: Option<f64>,
    #[serde(rename = "AST", default)]
    pub ast: Option<f64>,
    #[serde(rename = "STL", default)]
    pub stl: Option<f64>,
    #[serde(rename = "BLK", default)]
    pub blk: Option<f64>,
    #[serde(rename = "TOV", default)]
    pub tov: Option<f64>,
    #[serde(rename = "PTS", default)]
    pub pts: Option<f64>,
}

impl BoxScoreRow {
    /// Parsed game date.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_game_date(&self.game_date)
    }

    /// Whether this row belongs to the playoffs.
    pub fn is_playoffs(&self) -> bool {
        self.season_type
            .as_deref()
            .map(|t| t.trim().eq_ignore_ascii_case("playoffs"))
            .unwrap_or(false)
    }

    /// Opponent abbreviation parsed from `MATCHUP` (`"LAS @ SEA"`, `"LAS vs. SEA"`).
    pub fn opponent(&self) -> Option<String> {
        self.matchup
            .split_whitespace()
            .filter(|tok| !matches!(*tok, "@" | "vs." | "vs"))
            .find(|tok| !tok.eq_ignore_ascii_case(&self.team))
            .map(str::to_string)
    }

    /// Box-score stats with missing cells read as zero.
    pub fn stat_line(&self) -> StatLine {
        StatLine {
            pts: self.pts.unwrap_or(0.0),
            reb: self.reb.unwrap_or(0.0),
            ast: self.ast.unwrap_or(0.0),
            stl: self.stl.unwrap_or(0.0),
            blk: self.blk.unwrap_or(0.0),
            fg3m: self.fg3m.unwrap_or(0.0),
            tov: self.tov.unwrap_or(0.0),
            fgm: self.fgm.unwrap_or(0.0),
            fga: self.fga.unwrap_or(0.0),
            ftm: self.ftm.unwrap_or(0.0),
            fta: self.fta.unwrap_or(0.0),
            min: self.min.unwrap_or(0.0),
        }
    }
}

/// One model projection for a player-game, as stored in a projections table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    #[serde(default)]
    pub person_id: Option<PersonId>,
    pub player_name: String,
    pub team: String,
    pub opponent: String,
    pub game_date: String,
    #[serde(default)]
    pub predicted_minutes: Option<f64>,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub reb: f64,
    #[serde(default)]
    pub ast: f64,
    #[serde(default)]
    pub stl: f64,
    #[serde(default)]
    pub blk: f64,
    #[serde(default)]
    pub fg3m: f64,
    #[serde(default)]
    pub tov: f64,
    #[serde(default)]
    pub fgm: f64,
    #[serde(default)]
    pub fga: f64,
    #[serde(default)]
    pub ftm: f64,
    #[serde(default)]
    pub fta: f64,
}

impl ProjectionRow {
    /// Projected stats; minutes are filled in later from history.
    pub fn stat_line(&self) -> StatLine {
        StatLine {
            pts: self.points,
            reb: self.reb,
            ast: self.ast,
            stl: self.stl,
            blk: self.blk,
            fg3m: self.fg3m,
            tov: self.tov,
            fgm: self.fgm,
            fga: self.fga,
            ftm: self.ftm,
            fta: self.fta,
            min: self.predicted_minutes.unwrap_or(0.0),
        }
    }
}

/// A projection row after identity resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedGameRow {
    /// Projection source id.
    pub source: String,
    pub person_id: PersonId,
    pub player_name: String,
    pub team: String,
    pub opponent: String,
    pub date: NaiveDate,
    /// Minutes supplied by the model, if any.
    pub predicted_minutes: Option<f64>,
    pub line: StatLine,
}

/// A tagged projection table before resolution.
#[derive(Debug, Clone)]
pub struct ProjectionTable {
    /// Source id (e.g. "model_a").
    pub source: String,
    /// Human label (e.g. "Model A").
    pub label: String,
    pub rows: Vec<ProjectionRow>,
}

const TEAM_NAMES: &[(&str, &str)] = &[
    ("atlanta dream", "ATL"),
    ("chicago sky", "CHI"),
    ("connecticut sun", "CON"),
    ("dallas wings", "DAL"),
    ("indiana fever", "IND"),
    ("las vegas aces", "LVA"),
    ("los angeles sparks", "LAS"),
    ("minnesota lynx", "MIN"),
    ("new york liberty", "NYL"),
    ("phoenix mercury", "PHO"),
    ("seattle storm", "SEA"),
    ("washington mystics", "WAS"),
    ("golden state valkyries", "GSV"),
    ("atlanta", "ATL"),
    ("chicago", "CHI"),
    ("connecticut", "CON"),
    ("dallas", "DAL"),
    ("indiana", "IND"),
    ("las vegas", "LVA"),
    ("los angeles", "LAS"),
    ("minnesota", "MIN"),
    ("new york", "NYL"),
    ("phoenix", "PHO"),
    ("seattle", "SEA"),
    ("washington", "WAS"),
    ("golden state", "GSV"),
];

/// Map a full team or city name to its abbreviation. Unknown names pass through trimmed.
pub fn team_abbreviation(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    TEAM_NAMES
        .iter()
        .find(|(full, _)| *full == lowered)
        .map(|(_, abbr)| (*abbr).to_string())
        .unwrap_or_else(|| name.trim().to_string())
}
