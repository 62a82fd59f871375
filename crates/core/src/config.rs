//! Configuration structures for the statline pipeline.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Main configuration for a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input tables and scraped records.
    pub inputs: InputsConfig,
    /// Fuzzy name matching thresholds.
    pub matching: MatchingConfig,
    /// Profile enrichment configuration.
    pub enrichment: EnrichmentConfig,
    /// Season aggregation configuration.
    pub aggregation: AggregationConfig,
    /// Game grading configuration.
    pub grading: GradingConfig,
    /// Career curve configuration.
    pub career: CareerConfig,
    /// Output bundle configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Parse a TOML document. Missing sections and fields take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    ///
    /// Relative input and output paths are resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("matching.general_threshold", self.matching.general_threshold),
            ("matching.bulk_threshold", self.matching.bulk_threshold),
            ("matching.roster_threshold", self.matching.roster_threshold),
        ] {
            if value > 100 {
                return Err(Error::config(format!("{name} must be within 0-100, got {value}")));
            }
        }

        if self.inputs.projections.is_empty() {
            return Err(Error::config("inputs.projections must name at least one source"));
        }
        let mut seen = HashSet::new();
        for source in &self.inputs.projections {
            if source.id.trim().is_empty() {
                return Err(Error::config("projection source id must not be empty"));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(Error::config(format!("duplicate projection source id: {}", source.id)));
            }
        }
        if let Some(history) = &self.grading.history_source {
            if !seen.contains(history.as_str()) {
                return Err(Error::config(format!(
                    "grading.history_source names unknown source: {history}"
                )));
            }
        }

        if self.aggregation.minutes_window == 0 {
            return Err(Error::config("aggregation.minutes_window must be at least 1"));
        }
        if self.career.window_months == 0 {
            return Err(Error::config("career.window_months must be at least 1"));
        }
        if self.grading.good_rel_error > self.grading.bad_rel_error {
            return Err(Error::config(
                "grading.good_rel_error must not exceed grading.bad_rel_error",
            ));
        }
        Ok(())
    }

    /// Source whose projections feed performance history and progression.
    pub fn history_source(&self) -> Option<&str> {
        self.grading
            .history_source
            .as_deref()
            .or_else(|| self.inputs.projections.first().map(|s| s.id.as_str()))
    }

    /// Trade deadline configured for a season.
    pub fn trade_deadline(&self, season: i32) -> Option<NaiveDate> {
        self.aggregation.trade_deadlines.get(&season.to_string()).copied()
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.inputs.box_scores);
        for source in &mut self.inputs.projections {
            join(&mut source.path);
        }
        for p in [
            &mut self.inputs.roster,
            &mut self.inputs.all_players,
            &mut self.inputs.biography_pages,
            &mut self.inputs.injuries,
        ]
        .into_iter()
        .flatten()
        {
            join(p);
        }
        join(&mut self.output.dir);
    }
}

/// A projection table and the source id it is tagged with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSourceConfig {
    /// Source id (e.g. "model_a").
    pub id: String,
    /// Human label; defaults to the id.
    #[serde(default)]
    pub label: Option<String>,
    /// CSV path.
    pub path: PathBuf,
}

impl ProjectionSourceConfig {
    /// Label shown in the manifest.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Input locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    /// Historical per-game CSV.
    pub box_scores: PathBuf,
    /// Projection CSVs.
    pub projections: Vec<ProjectionSourceConfig>,
    /// Current-roster scrape (JSON list).
    pub roster: Option<PathBuf>,
    /// All-players scrape (JSON list).
    pub all_players: Option<PathBuf>,
    /// Biography page archive (JSON object, URL to page).
    pub biography_pages: Option<PathBuf>,
    /// Injury reports (JSON list).
    pub injuries: Option<PathBuf>,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            box_scores: PathBuf::from("data/boxscores.csv"),
            projections: Vec::new(),
            roster: None,
            all_players: None,
            biography_pages: None,
            injuries: None,
        }
    }
}

/// Token-set similarity thresholds, 0-100.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// General lookups (projection names, injuries).
    pub general_threshold: u32,
    /// Low-confidence bulk scrapes (all-players list).
    pub bulk_threshold: u32,
    /// Structured roster pages.
    pub roster_threshold: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            general_threshold: 90,
            bulk_threshold: 95,
            roster_threshold: 88,
        }
    }
}

/// Profile enrichment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Page workers (0 = rayon default).
    pub workers: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self { workers: 0 }
    }
}

/// Season aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Trade deadline per season year; seasons listed here also get pre/post splits.
    pub trade_deadlines: BTreeMap<String, NaiveDate>,
    /// Count playoff games in historical aggregates.
    pub include_playoffs: bool,
    /// Trailing games averaged for projected minutes.
    pub minutes_window: usize,
    /// Minutes per game for projected players with no history.
    pub placeholder_minutes: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            trade_deadlines: BTreeMap::new(),
            include_playoffs: false,
            minutes_window: 5,
            placeholder_minutes: 20.0,
        }
    }
}

/// Game grading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Source for performance history and progression (default: first projection source).
    pub history_source: Option<String>,
    /// Relative error below which a prediction is good.
    pub good_rel_error: f64,
    /// Relative error above which a prediction may be bad.
    pub bad_rel_error: f64,
    /// Absolute difference a bad prediction must also exceed.
    pub bad_abs_diff: f64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            history_source: None,
            good_rel_error: 0.20,
            bad_rel_error: 0.60,
            bad_abs_diff: 3.0,
        }
    }
}

/// Career curve configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerConfig {
    /// Centered rolling window, in months.
    pub window_months: usize,
}

impl Default for CareerConfig {
    fn default() -> Self {
        Self { window_months: 3 }
    }
}

/// Output bundle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Bundle directory.
    pub dir: PathBuf,
    /// Root document file name.
    pub root_file: String,
    /// Pretty-print JSON.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public"),
            root_file: "predictions.json".to_string(),
            pretty: false,
        }
    }
}
