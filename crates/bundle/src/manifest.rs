//! Season dataset manifest.

use serde::{Deserialize, Serialize};
use statline_core::{SeasonDataset, Split};
use std::collections::BTreeMap;

/// Manifest entry of one side file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub label: String,
    pub split: Split,
}

/// Key of one dataset variant, also its file stem under `data/`.
pub fn dataset_file_key(key: &str, split: Split) -> String {
    format!("{key}_{}", split.suffix())
}

/// Manifest of every dataset variant, keyed by file key.
pub fn build_manifest(datasets: &[SeasonDataset]) -> BTreeMap<String, ManifestEntry> {
    datasets
        .iter()
        .flat_map(|d| {
            [Split::Total, Split::PerGame].map(|split| {
                (
                    dataset_file_key(&d.key, split),
                    ManifestEntry {
                        label: d.label.clone(),
                        split,
                    },
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_has_both_splits() {
        let datasets = vec![SeasonDataset {
            key: "actuals_2024_full".to_string(),
            label: "2024 Full Season".to_string(),
            total: Vec::new(),
            per_game: Vec::new(),
        }];
        let manifest = build_manifest(&datasets);
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest["actuals_2024_full_per_game"].split, Split::PerGame);
        assert_eq!(manifest["actuals_2024_full_total"].label, "2024 Full Season");

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["actuals_2024_full_total"]["split"], "total");
    }
}
