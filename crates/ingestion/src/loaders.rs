//! Table and scrape loaders.
//!
//! The historical and projection tables are required: a missing or unreadable file
//! is a `SourceUnavailable` error. Scraped records are optional and degrade to empty
//! with a warning.

use crate::scraped::{BiographyPage, InjuryReport, RosterEntry};
use serde::de::DeserializeOwned;
use statline_core::config::ProjectionSourceConfig;
use statline_core::{BoxScoreRow, Error, ProjectionRow, ProjectionTable, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read box-score rows from CSV. Rows with an unparseable `GAME_DATE` are skipped.
pub fn read_box_scores<R: Read>(rdr: R) -> Result<Vec<BoxScoreRow>> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize::<BoxScoreRow>() {
        let row = result?;
        if row.date().is_none() {
            skipped += 1;
            continue;
        }
        rows.push(row);
    }
    if skipped > 0 {
        warn!(skipped, "Skipped box-score rows with unparseable GAME_DATE");
    }
    Ok(rows)
}

/// Read projection rows from CSV.
pub fn read_projections<R: Read>(rdr: R) -> Result<Vec<ProjectionRow>> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<ProjectionRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Load the historical box-score table.
pub fn load_box_scores(path: &Path) -> Result<Vec<BoxScoreRow>> {
    let file = open_required(path)?;
    let rows = read_box_scores(file)?;
    info!(path = %path.display(), rows = rows.len(), "Loaded box scores");
    Ok(rows)
}

/// Load one projection table and tag it with its source.
pub fn load_projections(source: &ProjectionSourceConfig) -> Result<ProjectionTable> {
    let file = open_required(&source.path)?;
    let rows = read_projections(file)?;
    info!(source = %source.id, rows = rows.len(), "Loaded projections");
    Ok(ProjectionTable {
        source: source.id.clone(),
        label: source.display_label().to_string(),
        rows,
    })
}

fn open_required(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::source_unavailable(path.display().to_string(), e))
}

/// Load an optional JSON input, degrading to the default value on any failure.
pub fn load_json_or_default<T>(path: Option<&Path>, what: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        debug!(input = what, "Optional input not configured");
        return T::default();
    };
    match read_json(path) {
        Ok(value) => value,
        Err(err) => {
            warn!(input = what, path = %path.display(), error = %err, "Optional input unavailable, using empty");
            T::default()
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = open_required(path)?;
    let value = serde_json::from_reader(std::io::BufReader::new(file))?;
    Ok(value)
}

/// All optional scraped inputs of a run.
#[derive(Debug, Clone, Default)]
pub struct ScrapedInputs {
    pub roster: Vec<RosterEntry>,
    pub all_players: Vec<RosterEntry>,
    /// Biography pages keyed by URL.
    pub pages: HashMap<String, BiographyPage>,
    pub injuries: Vec<InjuryReport>,
}

impl ScrapedInputs {
    /// Load every configured scrape, each degrading to empty independently.
    pub fn load(inputs: &statline_core::config::InputsConfig) -> Self {
        let scraped = Self {
            roster: load_json_or_default(inputs.roster.as_deref(), "roster"),
            all_players: load_json_or_default(inputs.all_players.as_deref(), "all_players"),
            pages: load_json_or_default(inputs.biography_pages.as_deref(), "biography_pages"),
            injuries: load_json_or_default(inputs.injuries.as_deref(), "injuries"),
        };
        info!(
            roster = scraped.roster.len(),
            all_players = scraped.all_players.len(),
            pages = scraped.pages.len(),
            injuries = scraped.injuries.len(),
            "Loaded scraped inputs"
        );
        scraped
    }
}
