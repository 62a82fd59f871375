//! Canonical player identities built from the historical and projection tables.
//!
//! Names are compared in normalized form: lowercase, diacritics stripped,
//! punctuation treated as a separator and whitespace collapsed. A name resolves by
//! exact alias first, then by token-set similarity against canonical names.
//! Projection names are matched against the historical names only; once the
//! universe is built, every canonical name is searchable.

use chrono::NaiveDate;
use statline_core::config::MatchingConfig;
use statline_core::{
    parse_game_date, team_abbreviation, BoxScoreRow, PersonId, ProjectedGameRow, ProjectionTable,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a player name for comparison.
pub fn normalize_name(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for ch in input.nfd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

fn edit_ratio(a: &str, b: &str) -> u32 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u32
}

/// Token-set similarity of two names, 0-100.
///
/// The sorted shared tokens and each side's sorted remainder are compared pairwise;
/// the best score wins. Names that normalize to nothing score 0.
pub fn token_set_ratio(a: &str, b: &str) -> u32 {
    let a_norm = normalize_name(a);
    let b_norm = normalize_name(b);
    if a_norm.is_empty() || b_norm.is_empty() {
        return 0;
    }
    let a_tokens: BTreeSet<&str> = a_norm.split(' ').collect();
    let b_tokens: BTreeSet<&str> = b_norm.split(' ').collect();

    let shared = a_tokens.intersection(&b_tokens).copied().collect::<Vec<_>>().join(" ");
    let join_rest = |rest: Vec<&str>| {
        let rest = rest.join(" ");
        format!("{shared} {rest}").trim().to_string()
    };
    let a_full = join_rest(a_tokens.difference(&b_tokens).copied().collect());
    let b_full = join_rest(b_tokens.difference(&a_tokens).copied().collect());

    edit_ratio(&shared, &a_full)
        .max(edit_ratio(&shared, &b_full))
        .max(edit_ratio(&a_full, &b_full))
}

/// Which lookup a name comes from; selects the similarity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchContext {
    /// Projection names, injury reports.
    General,
    /// Low-confidence bulk scrapes.
    Bulk,
    /// Structured roster pages.
    Roster,
}

impl MatchContext {
    /// Threshold for this context.
    pub fn threshold(self, matching: &MatchingConfig) -> u32 {
        match self {
            MatchContext::General => matching.general_threshold,
            MatchContext::Bulk => matching.bulk_threshold,
            MatchContext::Roster => matching.roster_threshold,
        }
    }
}

/// How a name was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    /// Fuzzy match with its score.
    Fuzzy(u32),
}

/// A resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub person_id: PersonId,
    pub kind: MatchKind,
}

/// Counts reported by identity resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Identities from the historical table.
    pub historical_ids: usize,
    /// Projection rows carrying an already-known id.
    pub known_ids: usize,
    /// Projection names resolved by exact alias.
    pub exact: usize,
    /// Projection names resolved by fuzzy match.
    pub fuzzy: usize,
    /// Projection names that became new identities.
    pub new_identities: usize,
    /// Aliases claimed by a second id and kept by the first.
    pub alias_collisions: usize,
}

/// One canonical identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub person_id: PersonId,
    pub player_name: String,
    /// Normalized aliases held by this id.
    pub aliases: BTreeSet<String>,
}

/// Immutable id/name snapshot for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct IdentityUniverse {
    names: BTreeMap<PersonId, String>,
    aliases: HashMap<String, PersonId>,
    /// Normalized canonical names, by id.
    index: Vec<(PersonId, String)>,
}

impl IdentityUniverse {
    /// Build the universe from the historical table and every projection table.
    pub fn build(
        history: &[BoxScoreRow],
        projections: &[ProjectionTable],
        matching: &MatchingConfig,
    ) -> (Self, ResolutionStats) {
        let mut builder = UniverseBuilder::default();
        builder.add_history(history);
        builder.freeze_index();
        builder.add_projections(projections, MatchContext::General.threshold(matching));
        builder.freeze_index();
        let stats = builder.stats.clone();
        info!(
            historical_ids = stats.historical_ids,
            known_ids = stats.known_ids,
            exact = stats.exact,
            fuzzy = stats.fuzzy,
            new_identities = stats.new_identities,
            alias_collisions = stats.alias_collisions,
            "Resolved player identities"
        );
        (builder.universe, stats)
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the universe is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Canonical name of an id.
    pub fn canonical_name(&self, person_id: PersonId) -> Option<&str> {
        self.names.get(&person_id).map(String::as_str)
    }

    /// Whether the id is known.
    pub fn contains(&self, person_id: PersonId) -> bool {
        self.names.contains_key(&person_id)
    }

    /// Id holding a normalized alias.
    pub fn alias_owner(&self, name: &str) -> Option<PersonId> {
        self.aliases.get(&normalize_name(name)).copied()
    }

    /// Iterate `(personId, canonicalName)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (PersonId, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Identities with their aliases, in id order.
    pub fn identities(&self) -> Vec<PlayerIdentity> {
        let mut aliases: BTreeMap<PersonId, BTreeSet<String>> = BTreeMap::new();
        for (alias, id) in &self.aliases {
            aliases.entry(*id).or_default().insert(alias.clone());
        }
        self.names
            .iter()
            .map(|(id, name)| PlayerIdentity {
                person_id: *id,
                player_name: name.clone(),
                aliases: aliases.remove(id).unwrap_or_default(),
            })
            .collect()
    }

    /// Resolve a name: exact alias, then the best fuzzy match at or above `threshold`.
    pub fn resolve(&self, name: &str, threshold: u32) -> Option<Resolution> {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return None;
        }
        if let Some(&person_id) = self.aliases.get(&normalized) {
            return Some(Resolution { person_id, kind: MatchKind::Exact });
        }
        self.fuzzy(&normalized, threshold)
    }

    fn fuzzy(&self, normalized: &str, threshold: u32) -> Option<Resolution> {
        let mut best: Option<(u32, PersonId)> = None;
        for (id, candidate) in &self.index {
            let score = token_set_ratio(normalized, candidate);
            if score < threshold {
                continue;
            }
            // Ties go to the lower id.
            let better = match best {
                None => true,
                Some((best_score, best_id)) => score > best_score || (score == best_score && *id < best_id),
            };
            if better {
                best = Some((score, *id));
            }
        }
        best.map(|(score, person_id)| Resolution { person_id, kind: MatchKind::Fuzzy(score) })
    }

    /// Attach resolved ids to a projection table. Rows with an unparseable date are dropped.
    pub fn resolve_projections(&self, table: &ProjectionTable) -> Vec<ProjectedGameRow> {
        let mut rows = Vec::with_capacity(table.rows.len());
        let mut unresolved = 0usize;
        let mut bad_dates = 0usize;
        for row in &table.rows {
            let Some(date) = parse_game_date(&row.game_date) else {
                bad_dates += 1;
                continue;
            };
            let person_id = row
                .person_id
                .filter(|id| self.contains(*id))
                .or_else(|| self.alias_owner(&row.player_name));
            let Some(person_id) = person_id else {
                unresolved += 1;
                continue;
            };
            rows.push(ProjectedGameRow {
                source: table.source.clone(),
                person_id,
                player_name: row.player_name.trim().to_string(),
                team: team_abbreviation(&row.team),
                opponent: team_abbreviation(&row.opponent),
                date,
                predicted_minutes: row.predicted_minutes,
                line: row.stat_line(),
            });
        }
        if unresolved > 0 || bad_dates > 0 {
            warn!(source = %table.source, unresolved, bad_dates, "Dropped projection rows");
        }
        rows
    }
}

#[derive(Default)]
struct UniverseBuilder {
    universe: IdentityUniverse,
    stats: ResolutionStats,
    collisions: HashSet<(String, PersonId)>,
}

impl UniverseBuilder {
    fn claim_alias(&mut self, name: &str, person_id: PersonId) {
        let alias = normalize_name(name);
        if alias.is_empty() {
            return;
        }
        match self.universe.aliases.get(&alias) {
            Some(&owner) if owner != person_id => {
                if self.collisions.insert((alias.clone(), person_id)) {
                    self.stats.alias_collisions += 1;
                    warn!(alias = %alias, owner, person_id, "Alias already held by another id");
                }
            }
            Some(_) => {}
            None => {
                self.universe.aliases.insert(alias, person_id);
            }
        }
    }

    fn add_history(&mut self, history: &[BoxScoreRow]) {
        // Canonical name is the one used in the player's latest game.
        let mut latest: BTreeMap<PersonId, (NaiveDate, &str)> = BTreeMap::new();
        for row in history {
            let Some(date) = row.date() else { continue };
            let entry = latest.entry(row.player_id).or_insert((date, row.player_name.as_str()));
            if date >= entry.0 {
                *entry = (date, row.player_name.as_str());
            }
        }
        for (id, (_, name)) in &latest {
            self.universe.names.insert(*id, name.trim().to_string());
            self.claim_alias(name, *id);
        }
        for row in history {
            self.claim_alias(&row.player_name, row.player_id);
        }
        self.stats.historical_ids = self.universe.names.len();
    }

    fn freeze_index(&mut self) {
        self.universe.index = self
            .universe
            .names
            .iter()
            .map(|(id, name)| (*id, normalize_name(name)))
            .filter(|(_, n)| !n.is_empty())
            .collect();
    }

    fn add_projections(&mut self, projections: &[ProjectionTable], threshold: u32) {
        // Normalized name -> (display name, own id) for names that stay unmatched.
        let mut unmatched: BTreeMap<String, (String, Option<PersonId>)> = BTreeMap::new();
        let mut resolved_names: HashMap<String, PersonId> = HashMap::new();

        for table in projections {
            for row in &table.rows {
                if let Some(id) = row.person_id.filter(|id| self.universe.contains(*id)) {
                    self.stats.known_ids += 1;
                    self.claim_alias(&row.player_name, id);
                    continue;
                }
                let normalized = normalize_name(&row.player_name);
                if normalized.is_empty() || resolved_names.contains_key(&normalized) {
                    continue;
                }
                if let Some(entry) = unmatched.get_mut(&normalized) {
                    if entry.1.is_none() {
                        entry.1 = row.person_id;
                    }
                    continue;
                }
                match self.universe.resolve(&row.player_name, threshold) {
                    Some(res) => {
                        match res.kind {
                            MatchKind::Exact => self.stats.exact += 1,
                            MatchKind::Fuzzy(score) => {
                                self.stats.fuzzy += 1;
                                debug!(
                                    name = %row.player_name,
                                    person_id = res.person_id,
                                    score,
                                    "Fuzzy-matched projection name"
                                );
                            }
                        }
                        resolved_names.insert(normalized, res.person_id);
                        self.claim_alias(&row.player_name, res.person_id);
                    }
                    None => {
                        unmatched.insert(normalized, (row.player_name.trim().to_string(), row.person_id));
                    }
                }
            }
        }

        let mut next_id = self.universe.names.keys().next_back().copied().unwrap_or(0).max(
            unmatched.values().filter_map(|(_, id)| *id).max().unwrap_or(0),
        ) + 1;
        for (normalized, (shown, own_id)) in unmatched {
            let id = match own_id {
                Some(id) => id,
                None => {
                    let id = next_id;
                    next_id += 1;
                    id
                }
            };
            if !self.universe.names.contains_key(&id) {
                debug!(name = %shown, person_id = id, "New identity from projections");
                self.universe.names.insert(id, shown);
                self.stats.new_identities += 1;
            }
            self.claim_alias(&normalized, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statline_core::ProjectionRow;

    fn box_row(id: PersonId, name: &str, date: &str) -> BoxScoreRow {
        BoxScoreRow {
            player_id: id,
            player_name: name.to_string(),
            team: "SEA".to_string(),
            game_id: format!("g-{date}"),
            game_date: date.to_string(),
            matchup: "SEA vs. LAS".to_string(),
            season_type: None,
            min: Some(30.0),
            fgm: None,
            fga: None,
            fg3m: None,
            ftm: None,
            fta: None,
            reb: None,
            ast: None,
            stl: None,
            blk: None,
            tov: None,
            pts: Some(10.0),
        }
    }

    fn proj_row(id: Option<PersonId>, name: &str) -> ProjectionRow {
        ProjectionRow {
            person_id: id,
            player_name: name.to_string(),
            team: "SEA".to_string(),
            opponent: "LAS".to_string(),
            game_date: "2025-06-01".to_string(),
            predicted_minutes: None,
            points: 12.0,
            reb: 4.0,
            ast: 2.0,
            stl: 0.0,
            blk: 0.0,
            fg3m: 0.0,
            tov: 0.0,
            fgm: 0.0,
            fga: 0.0,
            ftm: 0.0,
            fta: 0.0,
        }
    }

    fn table(rows: Vec<ProjectionRow>) -> ProjectionTable {
        ProjectionTable {
            source: "model_a".to_string(),
            label: "Model A".to_string(),
            rows,
        }
    }

    fn matching(general: u32) -> MatchingConfig {
        MatchingConfig {
            general_threshold: general,
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Núñez,  María "), "nunez maria");
        assert_eq!(normalize_name("A. Smith"), "a smith");
        assert_eq!(normalize_name("Ja'Naya O-Neil"), "ja naya o neil");
        assert_eq!(normalize_name("..."), "");
    }

    #[test]
    fn test_token_set_ratio() {
        assert_eq!(token_set_ratio("Amanda Smith", "Smith, Amanda"), 100);
        assert_eq!(token_set_ratio("A. Smith", "Amanda Smith"), 71);
        assert_eq!(token_set_ratio("Jane Doe", ""), 0);
    }

    #[test]
    fn test_fuzzy_merge_depends_on_threshold() {
        let history = vec![box_row(10, "Amanda Smith", "2024-06-01")];
        let projections = vec![table(vec![proj_row(None, "A. Smith")])];

        let (merged, stats) = IdentityUniverse::build(&history, &projections, &matching(70));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.alias_owner("A. Smith"), Some(10));
        assert_eq!(stats.fuzzy, 1);

        let (split, stats) = IdentityUniverse::build(&history, &projections, &matching(90));
        assert_eq!(split.len(), 2);
        assert_eq!(split.alias_owner("A. Smith"), Some(11));
        assert_eq!(stats.new_identities, 1);
    }

    #[test]
    fn test_known_id_contributes_alias() {
        let history = vec![box_row(10, "Amanda Smith", "2024-06-01")];
        let projections = vec![table(vec![proj_row(Some(10), "Mandy Smith")])];

        let (universe, stats) = IdentityUniverse::build(&history, &projections, &matching(90));
        assert_eq!(stats.known_ids, 1);
        assert_eq!(universe.alias_owner("mandy smith"), Some(10));
        assert_eq!(universe.canonical_name(10), Some("Amanda Smith"));
    }

    #[test]
    fn test_new_ids_prefer_own_then_synthesize_in_name_order() {
        let history = vec![box_row(10, "Amanda Smith", "2024-06-01")];
        let projections = vec![table(vec![
            proj_row(None, "Zoe Rookie"),
            proj_row(None, "Bea Rookie"),
            proj_row(Some(500), "Cara Rookie"),
        ])];

        let (universe, stats) = IdentityUniverse::build(&history, &projections, &matching(90));
        assert_eq!(stats.new_identities, 3);
        assert_eq!(universe.alias_owner("Cara Rookie"), Some(500));
        assert_eq!(universe.alias_owner("Bea Rookie"), Some(501));
        assert_eq!(universe.alias_owner("Zoe Rookie"), Some(502));
    }

    #[test]
    fn test_alias_collision_keeps_first_owner() {
        let history = vec![
            box_row(1, "Jordan Lee", "2024-06-01"),
            box_row(2, "Jordan Lee", "2024-06-02"),
        ];
        let (universe, stats) = IdentityUniverse::build(&history, &[], &matching(90));
        assert_eq!(universe.len(), 2);
        assert_eq!(universe.alias_owner("Jordan Lee"), Some(1));
        assert_eq!(stats.alias_collisions, 1);
    }

    #[test]
    fn test_canonical_name_is_latest() {
        let history = vec![
            box_row(3, "Kay Old", "2023-06-01"),
            box_row(3, "Kay New", "2024-06-01"),
        ];
        let (universe, _) = IdentityUniverse::build(&history, &[], &matching(90));
        assert_eq!(universe.canonical_name(3), Some("Kay New"));
        assert_eq!(universe.alias_owner("Kay Old"), Some(3));
        let identities = universe.identities();
        assert_eq!(identities[0].aliases.len(), 2);
    }

    #[test]
    fn test_resolve_projections_attaches_ids() {
        let history = vec![box_row(10, "Amanda Smith", "2024-06-01")];
        let mut bad = proj_row(None, "Amanda Smith");
        bad.game_date = "soon".to_string();
        let t = table(vec![proj_row(None, "Amanda Smith"), bad]);
        let (universe, _) = IdentityUniverse::build(&history, std::slice::from_ref(&t), &matching(90));

        let rows = universe.resolve_projections(&t);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].person_id, 10);
        assert_eq!(rows[0].source, "model_a");
    }

    #[test]
    fn test_projection_only_identity_is_fuzzy_searchable() {
        let history = vec![box_row(10, "Amanda Smith", "2024-06-01")];
        let projections = vec![table(vec![proj_row(None, "Nia Rookie")])];
        let (universe, stats) = IdentityUniverse::build(&history, &projections, &matching(90));
        assert_eq!(stats.new_identities, 1);

        let rookie = universe.resolve("Rookie, Nia", 88).unwrap();
        assert_eq!(rookie.person_id, 11);
        assert_eq!(rookie.kind, MatchKind::Fuzzy(100));
        let veteran = universe.resolve("Smith, Amanda", 88).unwrap();
        assert_eq!(veteran.person_id, 10);
    }

    #[test]
    fn test_projected_teams_are_abbreviated() {
        let history = vec![box_row(10, "Amanda Smith", "2024-06-01")];
        let mut row = proj_row(None, "Amanda Smith");
        row.team = "Las Vegas Aces".to_string();
        row.opponent = " Seattle Storm ".to_string();
        let t = table(vec![row, proj_row(None, "Amanda Smith")]);
        let (universe, _) = IdentityUniverse::build(&history, std::slice::from_ref(&t), &matching(90));

        let rows = universe.resolve_projections(&t);
        assert_eq!(rows[0].team, "LVA");
        assert_eq!(rows[0].opponent, "SEA");
        assert_eq!(rows[1].team, "SEA");
    }
}
