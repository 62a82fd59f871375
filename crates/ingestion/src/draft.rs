//! Draft-category parsing from free-text draft info.

use once_cell::sync::Lazy;
use regex::Regex;
use statline_core::DraftCategory;

// "2022 / R1 / P3"
static SLASH_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bR\s*(\d+)\s*/\s*P\s*(\d+)\b").expect("slash draft pattern is valid")
});

// "2019: 2nd round, 15th overall pick"
static ROUND_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)(?:st|nd|rd|th)\s+round(?:[^0-9]+(\d+)(?:st|nd|rd|th)\s+(?:overall|pick))?")
        .expect("round draft pattern is valid")
});

/// Bucket a draft-info string. Unparseable text is `Unknown`.
pub fn parse_draft_category(info: &str) -> DraftCategory {
    let text = info.trim();
    if text.to_ascii_lowercase().contains("undrafted") {
        return DraftCategory::Undrafted;
    }

    if let Some(caps) = SLASH_FORM.captures(text) {
        let round = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let pick = caps.get(2).and_then(|m| m.as_str().parse().ok());
        if let Some(round) = round {
            return DraftCategory::from_round_pick(round, pick);
        }
    }

    if let Some(caps) = ROUND_FORM.captures(text) {
        let round = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let pick = caps.get(2).and_then(|m| m.as_str().parse().ok());
        if let Some(round) = round {
            return DraftCategory::from_round_pick(round, pick);
        }
    }

    DraftCategory::Unknown
}
