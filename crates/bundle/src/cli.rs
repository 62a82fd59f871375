//! Command line interface.

use crate::pipeline;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use statline_core::{Config, SeasonAggregateRow, StatCategory};
use statline_features::{active_categories, rank_by};
use statline_ingestion::merge_stats_files;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Build and inspect the statline dashboard bundle
#[derive(Parser)]
#[command(name = "statline")]
#[command(about = "Build the statline dashboard data bundle")]
pub struct Cli {
    /// Log filter, overrides RUST_LOG (e.g. "debug", "statline_ingestion=trace")
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write the bundle
    Build {
        /// Pipeline configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
        /// Output directory, overrides output.dir
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fold a freshly scraped box-score table into the historical one
    MergeStats {
        /// Existing historical table
        #[arg(long)]
        base: PathBuf,
        /// Newly scraped rows
        #[arg(long)]
        new: PathBuf,
        /// Merged table, defaults to rewriting the base table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rank a per-game dataset file over a subset of categories
    Rank {
        /// Per-game dataset file from the bundle's data directory
        #[arg(long)]
        dataset: PathBuf,
        /// Categories to leave out of the composite (e.g. "TOV,FT_impact")
        #[arg(long, value_delimiter = ',')]
        punt: Vec<String>,
        /// Number of rows to print
        #[arg(long, default_value = "20")]
        top: usize,
    },
}

/// Run a parsed command.
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build { config, output } => build(&config, output),
        Commands::MergeStats { base, new, output } => {
            let output = output.unwrap_or_else(|| base.clone());
            let stats = merge_stats_files(&base, &new, &output)
                .with_context(|| format!("merging {} into {}", new.display(), base.display()))?;
            println!(
                "{} rows ({} added) -> {}",
                stats.merged_rows,
                stats.added(),
                output.display()
            );
            Ok(())
        }
        Commands::Rank { dataset, punt, top } => {
            let punted = parse_categories(&punt)?;
            let rows = read_dataset(&dataset)?;
            print!("{}", format_ranking(&rows, &punted, top)?);
            Ok(())
        }
    }
}

fn build(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let mut config = Config::load(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    if let Some(dir) = output {
        config.output.dir = dir;
    }
    let report = pipeline::run(&config).context("building bundle")?;
    info!(
        history_rows = report.history_rows,
        identities = report.identities,
        datasets = report.datasets,
        games = report.games,
        graded = report.graded_games,
        files = report.files,
        "Build complete"
    );
    Ok(())
}

/// Parse category keys, rejecting unknown ones.
pub fn parse_categories(keys: &[String]) -> Result<Vec<StatCategory>> {
    keys.iter()
        .filter(|k| !k.trim().is_empty())
        .map(|k| match StatCategory::from_key(k) {
            Some(category) => Ok(category),
            None => bail!("unknown category {k:?}"),
        })
        .collect()
}

fn read_dataset(path: &Path) -> Result<Vec<SeasonAggregateRow>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Ranking table over the categories left after punting.
pub fn format_ranking(
    rows: &[SeasonAggregateRow],
    punted: &[StatCategory],
    top: usize,
) -> Result<String> {
    if rows.iter().any(|r| r.z.is_none()) {
        bail!("dataset has no z-scores; use a per_game file");
    }
    let active = active_categories(punted);
    let mut out = String::new();
    writeln!(out, "{:>4}  {:<28} {:<5} {:>8}", "#", "Player", "Team", "Z")?;
    for (i, (row, score)) in rank_by(rows, &active).into_iter().take(top).enumerate() {
        writeln!(
            out,
            "{:>4}  {:<28} {:<5} {:>8.2}",
            i + 1,
            row.player_name,
            row.team,
            score
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use statline_core::{Split, StatLine, ZScores};

    fn scored(id: i64, name: &str, z: ZScores) -> SeasonAggregateRow {
        SeasonAggregateRow {
            person_id: id,
            player_name: name.to_string(),
            team: "SEA".to_string(),
            position: "G".to_string(),
            split: Split::PerGame,
            gp: 10,
            stats: StatLine::default(),
            fg_pct: 0.0,
            ft_pct: 0.0,
            z: Some(z),
            custom_z_score: None,
            rank: None,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
        let cli = Cli::try_parse_from([
            "statline", "rank", "--dataset", "x.json", "--punt", "TOV,ft_impact", "--top", "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Rank { punt, top, .. } => {
                assert_eq!(punt, vec!["TOV", "ft_impact"]);
                assert_eq!(top, 5);
            }
            _ => panic!("expected rank"),
        }
    }

    #[test]
    fn test_parse_categories() {
        let parsed = parse_categories(&["3pm".to_string(), "FT_impact".to_string()]).unwrap();
        assert_eq!(parsed, vec![StatCategory::ThreePm, StatCategory::FtImpact]);
        assert!(parse_categories(&["DUNKS".to_string()]).is_err());
    }

    #[test]
    fn test_punting_changes_order() {
        let scorer = ZScores { z_PTS: 3.0, z_TOV: -2.0, ..Default::default() };
        let steady = ZScores { z_PTS: 1.5, ..Default::default() };
        let rows = vec![scored(1, "Scorer", scorer), scored(2, "Steady", steady)];

        let full = format_ranking(&rows, &[], 10).unwrap();
        let punted = format_ranking(&rows, &[StatCategory::Tov], 1).unwrap();
        let first_row = |table: &str| table.lines().nth(1).unwrap_or_default().to_string();
        assert!(first_row(&full).contains("Steady"));
        assert!(first_row(&punted).contains("Scorer"));
        assert_eq!(punted.lines().count(), 2);
    }

    #[test]
    fn test_unscored_dataset_is_rejected() {
        let mut row = scored(1, "A", ZScores::default());
        row.z = None;
        assert!(format_ranking(&[row], &[], 5).is_err());
    }
}
