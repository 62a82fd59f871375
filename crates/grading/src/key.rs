//! Game keys.

use chrono::NaiveDate;

/// Key of a game between two teams on a date. Team order does not matter.
pub fn game_key(date: NaiveDate, team_a: &str, team_b: &str) -> String {
    let (a, b) = (team_a.trim(), team_b.trim());
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{}_{low}_{high}", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_symmetric() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(game_key(date, "SEA", "LAS"), "2025-06-01_LAS_SEA");
        assert_eq!(game_key(date, "LAS", "SEA"), game_key(date, "SEA", "LAS"));
        assert_eq!(game_key(date, " LAS", "SEA "), "2025-06-01_LAS_SEA");
    }
}
