//! Bundle writer.
//!
//! The `data/` directory is written into a staging directory beside it and the
//! root document into a temporary file beside it. Once every file is on disk,
//! `data/` is swapped into place and the root document is renamed over the old
//! one last. Other files in the output directory are left alone. A failed write
//! leaves the previous bundle untouched.

use crate::manifest::{build_manifest, dataset_file_key, ManifestEntry};
use crate::sanitize::to_sanitized_value;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use statline_core::config::OutputConfig;
use statline_core::{
    CareerData, Error, GameRecord, GradeEntry, PersonId, PlayerProfile, ProgressionRow, Result,
    SeasonDataset, Split,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything the dashboard reads.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub last_updated: DateTime<Utc>,
    pub datasets: Vec<SeasonDataset>,
    pub profiles: BTreeMap<PersonId, PlayerProfile>,
    pub daily_games: BTreeMap<String, Vec<GameRecord>>,
    pub historical_grades: Vec<GradeEntry>,
    pub progression: Vec<ProgressionRow>,
    pub progression_historical: Vec<ProgressionRow>,
    pub career: CareerData,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RootDocument<'a> {
    last_updated: String,
    season_long_data_manifest: BTreeMap<String, ManifestEntry>,
    player_profiles: &'a BTreeMap<PersonId, PlayerProfile>,
    daily_games_by_date: &'a BTreeMap<String, Vec<GameRecord>>,
    historical_grades: &'a [GradeEntry],
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let value = to_sanitized_value(value)?;
    let text = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    fs::write(path, text)?;
    debug!(path = %path.display(), "Wrote file");
    Ok(())
}

fn sibling(path: &Path, suffix: &str) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| Error::config(format!("output path has no name: {}", path.display())))?;
    Ok(path.with_file_name(format!(".{}.{suffix}", name.to_string_lossy())))
}

fn write_data(bundle: &Bundle, data_dir: &Path, pretty: bool) -> Result<usize> {
    fs::create_dir_all(data_dir)?;
    let mut files = 0usize;

    for dataset in &bundle.datasets {
        for (split, rows) in [(Split::Total, &dataset.total), (Split::PerGame, &dataset.per_game)] {
            let name = format!("{}.json", dataset_file_key(&dataset.key, split));
            write_json(&data_dir.join(name), rows, pretty)?;
            files += 1;
        }
    }
    write_json(&data_dir.join("progression.json"), &bundle.progression, pretty)?;
    write_json(
        &data_dir.join("progression_historical.json"),
        &bundle.progression_historical,
        pretty,
    )?;
    write_json(&data_dir.join("career_data.json"), &bundle.career, pretty)?;
    Ok(files + 3)
}

fn write_root(bundle: &Bundle, path: &Path, pretty: bool) -> Result<()> {
    let document = RootDocument {
        last_updated: bundle.last_updated.to_rfc3339_opts(SecondsFormat::Secs, true),
        season_long_data_manifest: build_manifest(&bundle.datasets),
        player_profiles: &bundle.profiles,
        daily_games_by_date: &bundle.daily_games,
        historical_grades: &bundle.historical_grades,
    };
    write_json(path, &document, pretty)
}

fn discard(path: &Path) {
    let removed = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    if let Err(e) = removed {
        warn!(path = %path.display(), error = %e, "Could not remove staged output");
    }
}

/// Move a staged directory over `target`, restoring the old one if the move fails.
fn swap_dir(staged: &Path, target: &Path, previous: &Path) -> Result<()> {
    if previous.exists() {
        fs::remove_dir_all(previous)?;
    }
    let had_previous = target.exists();
    if had_previous {
        fs::rename(target, previous)?;
    }
    if let Err(e) = fs::rename(staged, target) {
        if had_previous {
            fs::rename(previous, target)?;
        }
        return Err(e.into());
    }
    if had_previous {
        fs::remove_dir_all(previous)?;
    }
    Ok(())
}

/// Write the bundle under `output.dir`, replacing the previous `data/` and root file.
///
/// Returns the number of files written.
pub fn write_bundle(bundle: &Bundle, output: &OutputConfig) -> Result<usize> {
    fs::create_dir_all(&output.dir)?;
    let data_dir = output.dir.join("data");
    let root_file = output.dir.join(&output.root_file);
    let staged_data = sibling(&data_dir, "staging")?;
    let staged_root = sibling(&root_file, "staging")?;
    let previous_data = sibling(&data_dir, "previous")?;

    for stale in [&staged_data, &staged_root] {
        if stale.exists() {
            discard(stale);
        }
    }
    let written = write_data(bundle, &staged_data, output.pretty)
        .and_then(|files| write_root(bundle, &staged_root, output.pretty).map(|()| files + 1));
    let files = match written {
        Ok(files) => files,
        Err(e) => {
            for staged in [&staged_data, &staged_root] {
                if staged.exists() {
                    discard(staged);
                }
            }
            return Err(e);
        }
    };

    if let Err(e) = swap_dir(&staged_data, &data_dir, &previous_data) {
        discard(&staged_root);
        return Err(e);
    }
    fs::rename(&staged_root, &root_file)?;

    info!(dir = %output.dir.display(), files, "Wrote bundle");
    Ok(files)
}
