//! Folding a freshly scraped box-score table into the historical one.

use csv::StringRecord;
use statline_core::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::info;

const KEY_COLUMNS: [&str; 2] = ["PLAYER_ID", "GAME_ID"];

/// Counts reported by a stats-table merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Rows in the existing table.
    pub base_rows: usize,
    /// Rows in the new table.
    pub new_rows: usize,
    /// Rows after de-duplication.
    pub merged_rows: usize,
}

impl MergeStats {
    /// Net rows added to the existing table.
    pub fn added(&self) -> usize {
        self.merged_rows.saturating_sub(self.base_rows)
    }
}

/// A CSV table kept as raw records so unknown columns survive the merge.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    /// Read a whole CSV table.
    pub fn read<R: Read>(rdr: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(rdr);
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?);
        }
        Ok(Self { headers, rows })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_keys(&self, what: &str) -> Result<[usize; 2]> {
        match (self.column(KEY_COLUMNS[0]), self.column(KEY_COLUMNS[1])) {
            (Some(pid), Some(gid)) => Ok([pid, gid]),
            _ => Err(Error::data(format!(
                "{what} table is missing PLAYER_ID or GAME_ID columns"
            ))),
        }
    }
}

/// Concatenate `base` and `new` and drop duplicate `(PLAYER_ID, GAME_ID)` rows,
/// keeping the last occurrence. Columns are the union, base order first.
pub fn merge_tables(base: &RawTable, new: &RawTable) -> Result<(RawTable, MergeStats)> {
    base.require_keys("existing")?;
    new.require_keys("new")?;

    let mut headers = base.headers.clone();
    for h in &new.headers {
        if !headers.contains(h) {
            headers.push(h.clone());
        }
    }

    let realign = |table: &RawTable, record: &StringRecord| -> StringRecord {
        headers
            .iter()
            .map(|h| table.column(h).and_then(|i| record.get(i)).unwrap_or(""))
            .collect()
    };

    let combined: Vec<StringRecord> = base
        .rows
        .iter()
        .map(|r| realign(base, r))
        .chain(new.rows.iter().map(|r| realign(new, r)))
        .collect();

    let pid = headers.iter().position(|h| h == KEY_COLUMNS[0]).unwrap_or(0);
    let gid = headers.iter().position(|h| h == KEY_COLUMNS[1]).unwrap_or(0);
    let key_of = |r: &StringRecord| {
        (
            r.get(pid).unwrap_or("").trim().to_string(),
            r.get(gid).unwrap_or("").trim().to_string(),
        )
    };

    let mut last_seen: HashMap<(String, String), usize> = HashMap::new();
    for (i, record) in combined.iter().enumerate() {
        last_seen.insert(key_of(record), i);
    }
    let rows: Vec<StringRecord> = combined
        .iter()
        .enumerate()
        .filter(|&(i, r)| last_seen.get(&key_of(r)) == Some(&i))
        .map(|(_, r)| r.clone())
        .collect();

    let stats = MergeStats {
        base_rows: base.rows.len(),
        new_rows: new.rows.len(),
        merged_rows: rows.len(),
    };
    Ok((RawTable { headers, rows }, stats))
}

/// Merge the CSV at `new_path` into the one at `base_path` and write the result
/// to `output` (temp file then rename). Nothing is written when validation fails.
pub fn merge_stats_files(base_path: &Path, new_path: &Path, output: &Path) -> Result<MergeStats> {
    let base = read_table(base_path)?;
    let new = read_table(new_path)?;
    let (merged, stats) = merge_tables(&base, &new)?;

    write_table_atomic(&merged, output)?;
    info!(
        base_rows = stats.base_rows,
        new_rows = stats.new_rows,
        merged_rows = stats.merged_rows,
        added = stats.added(),
        output = %output.display(),
        "Merged stats tables"
    );
    Ok(stats)
}

fn read_table(path: &Path) -> Result<RawTable> {
    let file = fs::File::open(path)
        .map_err(|e| Error::source_unavailable(path.display().to_string(), e))?;
    RawTable::read(file)
}

fn write_table_atomic(table: &RawTable, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)?;
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> RawTable {
        RawTable::read(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_merge_keeps_last_duplicate() {
        let base = table("PLAYER_ID,GAME_ID,PTS\n1,100,10\n2,100,7\n");
        let new = table("PLAYER_ID,GAME_ID,PTS,SEASON_TYPE\n1,100,12,Regular Season\n1,101,9,Playoffs\n");

        let (merged, stats) = merge_tables(&base, &new).unwrap();
        assert_eq!(merged.headers, vec!["PLAYER_ID", "GAME_ID", "PTS", "SEASON_TYPE"]);
        assert_eq!(stats.merged_rows, 3);
        assert_eq!(stats.added(), 1);

        let rows: Vec<Vec<&str>> = merged.rows.iter().map(|r| r.iter().collect()).collect();
        assert_eq!(rows[0], vec!["2", "100", "7", ""]);
        assert_eq!(rows[1], vec!["1", "100", "12", "Regular Season"]);
        assert_eq!(rows[2], vec!["1", "101", "9", "Playoffs"]);
    }

    #[test]
    fn test_merge_rejects_missing_key_columns() {
        let base = table("PLAYER_ID,GAME_ID,PTS\n1,100,10\n");
        let new = table("PLAYER_NAME,PTS\nAlpha,12\n");
        assert!(matches!(merge_tables(&base, &new), Err(Error::Data(_))));
    }

    #[test]
    fn test_merge_files_leaves_output_untouched_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.csv");
        let bad = dir.path().join("bad.csv");
        fs::write(&base, "PLAYER_ID,GAME_ID,PTS\n1,100,10\n").unwrap();
        fs::write(&bad, "PLAYER_ID,PTS\n1,12\n").unwrap();

        assert!(merge_stats_files(&base, &bad, &base).is_err());
        assert_eq!(fs::read_to_string(&base).unwrap(), "PLAYER_ID,GAME_ID,PTS\n1,100,10\n");
    }

    #[test]
    fn test_merge_files_rewrites_table() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.csv");
        let new = dir.path().join("new.csv");
        fs::write(&base, "PLAYER_ID,GAME_ID,PTS\n1,100,10\n").unwrap();
        fs::write(&new, "PLAYER_ID,GAME_ID,PTS\n1,100,11\n2,100,4\n").unwrap();

        let stats = merge_stats_files(&base, &new, &base).unwrap();
        assert_eq!(stats.merged_rows, 2);
        assert_eq!(
            fs::read_to_string(&base).unwrap(),
            "PLAYER_ID,GAME_ID,PTS\n1,100,11\n2,100,4\n"
        );
        assert!(!dir.path().join("base.csv.tmp").exists());
    }
}
