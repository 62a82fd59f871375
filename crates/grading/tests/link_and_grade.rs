use chrono::NaiveDate;
use statline_core::{BoxScoreRow, Config, ProjectedGameRow, Rating, StatLine};
use statline_grading::{
    daily_games_by_date, historical_grades, link_games, performance_history, realized_games,
};
use std::collections::HashMap;

fn box_row(id: i64, team: &str, matchup: &str, date: &str, pts: f64) -> BoxScoreRow {
    BoxScoreRow {
        player_id: id,
        player_name: format!("Player {id}"),
        team: team.to_string(),
        game_id: format!("{date}-{matchup}"),
        game_date: date.to_string(),
        matchup: matchup.to_string(),
        season_type: Some("Regular Season".to_string()),
        min: Some(30.0),
        fgm: None,
        fga: None,
        fg3m: None,
        ftm: None,
        fta: None,
        reb: Some(6.0),
        ast: Some(3.0),
        stl: None,
        blk: None,
        tov: None,
        pts: Some(pts),
    }
}

fn projected(source: &str, id: i64, team: &str, opponent: &str, date: &str, pts: f64) -> ProjectedGameRow {
    ProjectedGameRow {
        source: source.to_string(),
        person_id: id,
        player_name: format!("Player {id}"),
        team: team.to_string(),
        opponent: opponent.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        predicted_minutes: Some(32.0),
        line: StatLine {
            pts,
            reb: 6.0,
            ast: 3.0,
            ..Default::default()
        },
    }
}

#[test]
fn test_projection_sources_graded_against_box_scores() {
    let history = vec![
        box_row(1, "LVA", "LVA @ SEA", "2025-06-01", 24.0),
        box_row(2, "SEA", "SEA vs. LVA", "2025-06-01", 18.0),
    ];
    let rows = vec![
        // Full team names in the projection table resolve to abbreviations.
        projected("model_a", 1, "Las Vegas Aces", "Seattle Storm", "2025-06-01", 23.0),
        projected("model_a", 2, "Seattle Storm", "Las Vegas Aces", "2025-06-01", 5.0),
        projected("model_b", 1, "LVA", "SEA", "2025-06-01", 12.0),
        projected("model_b", 2, "SEA", "LVA", "2025-06-01", 20.0),
        projected("model_a", 1, "LVA", "CHI", "2025-06-09", 20.0),
    ];

    let realized = realized_games(&history);
    let records = link_games(&rows, &realized, &HashMap::new(), &Config::default());
    assert_eq!(records.len(), 3);

    let grades = historical_grades(&records);
    assert_eq!(grades.len(), 2);
    let by_source: HashMap<&str, bool> =
        grades.iter().map(|g| (g.source.as_str(), g.correct_winner)).collect();
    assert!(by_source["model_a"]);
    assert!(!by_source["model_b"]);

    let model_a = records
        .iter()
        .find(|r| r.source == "model_a" && r.grade.is_some())
        .unwrap();
    let deltas = &model_a.grade.as_ref().unwrap().player_deltas;
    assert_eq!(deltas[&1].pts.rating, Rating::Good);
    assert_eq!(deltas[&2].pts.rating, Rating::Bad);

    let history = performance_history(&records, "model_a");
    assert_eq!(history[&1].len(), 1);

    let daily = daily_games_by_date(records);
    assert_eq!(daily["2025-06-01"].len(), 2);
    assert!(daily["2025-06-09"][0].grade.is_none());
}
