//! Year-over-year change in composite score.

use ordered_float::OrderedFloat;
use statline_core::{ProgressionRow, SeasonAggregateRow};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Compare two scored per-game datasets.
///
/// Only players present in both are listed. Name and team come from the later
/// dataset. Rows are sorted by `z_Change` descending.
pub fn progression(
    from_rows: &[SeasonAggregateRow],
    to_rows: &[SeasonAggregateRow],
    from_label: &str,
    to_label: &str,
) -> Vec<ProgressionRow> {
    let earlier: HashMap<_, f64> = from_rows
        .iter()
        .map(|r| (r.person_id, r.custom_z_score.unwrap_or(0.0)))
        .collect();

    let mut rows: Vec<ProgressionRow> = to_rows
        .iter()
        .filter_map(|later| {
            let from = *earlier.get(&later.person_id)?;
            let to = later.custom_z_score.unwrap_or(0.0);
            Some(ProgressionRow {
                person_id: later.person_id,
                player_name: later.player_name.clone(),
                team: later.team.clone(),
                from: from_label.to_string(),
                to: to_label.to_string(),
                z_Total_from: from,
                z_Total_to: to,
                z_Change: to - from,
            })
        })
        .collect();

    rows.sort_by_key(|r| (Reverse(OrderedFloat(r.z_Change)), r.person_id));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use statline_core::{Split, StatLine};

    fn scored(id: i64, team: &str, z: f64) -> SeasonAggregateRow {
        SeasonAggregateRow {
            person_id: id,
            player_name: format!("Player {id}"),
            team: team.to_string(),
            position: "F".to_string(),
            split: Split::PerGame,
            gp: 30,
            stats: StatLine::default(),
            fg_pct: 0.0,
            ft_pct: 0.0,
            z: None,
            custom_z_score: Some(z),
            rank: None,
        }
    }

    #[test]
    fn test_only_shared_players_sorted_by_change() {
        let from = vec![scored(1, "SEA", 2.0), scored(2, "LVA", -1.0), scored(3, "NYL", 0.5)];
        let to = vec![scored(1, "SEA", 1.0), scored(2, "CHI", 3.0), scored(4, "IND", 5.0)];

        let rows = progression(&from, &to, "2023 Full Season", "2024 Full Season");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].person_id, 2);
        assert_eq!(rows[0].team, "CHI");
        assert_abs_diff_eq!(rows[0].z_Change, 4.0);
        assert_eq!(rows[1].person_id, 1);
        assert_abs_diff_eq!(rows[1].z_Change, -1.0);
        assert_eq!(rows[1].from, "2023 Full Season");
    }

    #[test]
    fn test_no_overlap_is_empty() {
        let rows = progression(&[scored(1, "SEA", 1.0)], &[scored(2, "SEA", 1.0)], "a", "b");
        assert!(rows.is_empty());
    }
}
