//! Profile enrichment from roster scrapes and biography pages.
//!
//! Each field is filled from an ordered candidate list: current roster first, the
//! all-players listing next, the biography page last. Anything still missing takes
//! its default, so every profile carries every key.

use crate::draft::parse_draft_category;
use crate::identity::{IdentityUniverse, MatchContext};
use crate::loaders::ScrapedInputs;
use crate::scraped::{BiographyPage, InjuryReport, RosterEntry};
use rayon::prelude::*;
use statline_core::config::{EnrichmentConfig, MatchingConfig};
use statline_core::{
    team_abbreviation, Error, InjuryStatus, PersonId, PlayerProfile, Result, FREE_AGENT,
    NOT_AVAILABLE,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// First candidate that is present and not blank or `N/A`.
pub fn first_present<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty() && *v != NOT_AVAILABLE)
}

/// Retrieves biography pages by URL.
///
/// Live implementations must bound each request with a deadline.
pub trait PageSource: Sync {
    /// Fetch and extract one page.
    fn fetch(&self, url: &str) -> Result<BiographyPage>;
}

/// Pre-scraped pages keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct PageArchive {
    pages: HashMap<String, BiographyPage>,
}

impl PageArchive {
    /// Wrap an archive.
    pub fn new(pages: HashMap<String, BiographyPage>) -> Self {
        Self { pages }
    }

    /// Number of archived pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageSource for PageArchive {
    fn fetch(&self, url: &str) -> Result<BiographyPage> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::source_unavailable(url, "page not in archive"))
    }
}

/// What happened to one identity's biography page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Page retrieved and merged.
    Fetched,
    /// Page could not be retrieved; page fields took defaults.
    Defaulted { reason: String },
    /// No page URL known.
    NoPage,
}

/// Batch summary of profile enrichment.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    /// Outcome per identity.
    pub outcomes: BTreeMap<PersonId, EnrichmentOutcome>,
    /// Roster names that did not resolve.
    pub unresolved_roster: usize,
    /// All-players names that did not resolve.
    pub unresolved_all_players: usize,
    /// Injury reports attached to a profile.
    pub injuries_attached: usize,
    /// Injury names that did not resolve.
    pub unresolved_injuries: usize,
}

impl EnrichmentReport {
    /// Pages fetched.
    pub fn fetched(&self) -> usize {
        self.count(|o| matches!(o, EnrichmentOutcome::Fetched))
    }

    /// Pages that failed and were defaulted.
    pub fn defaulted(&self) -> usize {
        self.count(|o| matches!(o, EnrichmentOutcome::Defaulted { .. }))
    }

    /// Identities with no page.
    pub fn no_page(&self) -> usize {
        self.count(|o| matches!(o, EnrichmentOutcome::NoPage))
    }

    fn count(&self, pred: impl Fn(&EnrichmentOutcome) -> bool) -> usize {
        self.outcomes.values().filter(|o| pred(o)).count()
    }
}

fn index_entries<'a>(
    universe: &IdentityUniverse,
    entries: &'a [RosterEntry],
    threshold: u32,
    listing: &str,
) -> (HashMap<PersonId, &'a RosterEntry>, usize) {
    let mut index = HashMap::new();
    let mut unresolved = 0;
    for entry in entries {
        match universe.resolve(&entry.player_name, threshold) {
            Some(res) => {
                index.entry(res.person_id).or_insert(entry);
            }
            None => {
                unresolved += 1;
                debug!(listing, name = %entry.player_name, "Unresolved roster name");
            }
        }
    }
    (index, unresolved)
}

fn birth_year(page: &BiographyPage) -> Option<i32> {
    page.birth_year.or_else(|| {
        page.birth_date
            .as_deref()
            .and_then(|d| d.trim().get(..4))
            .and_then(|y| y.parse().ok())
    })
}

fn text_or_default(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

fn build_profile(
    name: &str,
    roster: Option<&RosterEntry>,
    all_players: Option<&RosterEntry>,
    page: Option<&BiographyPage>,
) -> PlayerProfile {
    let team = first_present([roster.and_then(|r| r.team.as_deref())])
        .map(team_abbreviation)
        .or_else(|| all_players.map(|_| FREE_AGENT.to_string()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let position = first_present([
        roster.and_then(|r| r.position.as_deref()),
        all_players.and_then(|r| r.position.as_deref()),
    ]);
    let height = first_present([
        roster.and_then(|r| r.height.as_deref()),
        all_players.and_then(|r| r.height.as_deref()),
        page.and_then(|p| p.height.as_deref()),
    ]);
    let weight = first_present([
        roster.and_then(|r| r.weight.as_deref()),
        all_players.and_then(|r| r.weight.as_deref()),
        page.and_then(|p| p.weight.as_deref()),
    ]);
    let draft_info = first_present([page.and_then(|p| p.draft_info.as_deref())]);
    let wiki_url = first_present([
        roster.and_then(|r| r.wiki_url.as_deref()),
        all_players.and_then(|r| r.wiki_url.as_deref()),
    ]);

    PlayerProfile {
        player_name: name.to_string(),
        team,
        position: text_or_default(position),
        height: text_or_default(height),
        weight: text_or_default(weight),
        draft_info: text_or_default(draft_info),
        draft_category: draft_info
            .map(parse_draft_category)
            .unwrap_or(statline_core::DraftCategory::Unknown),
        birth_year: page.and_then(birth_year),
        wiki_url: wiki_url.map(str::to_string),
        injury: None,
        performance_history: Vec::new(),
    }
}

/// Build a profile for every identity in the universe.
///
/// Page failures degrade that one profile to defaults and are recorded in the report.
pub fn enrich_profiles(
    universe: &IdentityUniverse,
    scraped: &ScrapedInputs,
    pages: &dyn PageSource,
    matching: &MatchingConfig,
    enrichment: &EnrichmentConfig,
) -> Result<(BTreeMap<PersonId, PlayerProfile>, EnrichmentReport)> {
    let mut report = EnrichmentReport::default();

    let (roster, unresolved) = index_entries(
        universe,
        &scraped.roster,
        MatchContext::Roster.threshold(matching),
        "roster",
    );
    report.unresolved_roster = unresolved;
    let (all_players, unresolved) = index_entries(
        universe,
        &scraped.all_players,
        MatchContext::Bulk.threshold(matching),
        "all_players",
    );
    report.unresolved_all_players = unresolved;

    let jobs: Vec<(PersonId, &str, Option<&str>)> = universe
        .iter()
        .map(|(id, name)| {
            let url = first_present([
                roster.get(&id).and_then(|r| r.wiki_url.as_deref()),
                all_players.get(&id).and_then(|r| r.wiki_url.as_deref()),
            ]);
            (id, name, url)
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(enrichment.workers)
        .build()
        .map_err(|e| Error::Other(format!("cannot build page pool: {e}")))?;

    let fetched: Vec<(PersonId, EnrichmentOutcome, Option<BiographyPage>)> = pool.install(|| {
        jobs.par_iter()
            .map(|&(id, _, url)| match url {
                None => (id, EnrichmentOutcome::NoPage, None),
                Some(url) => match pages.fetch(url) {
                    Ok(page) => (id, EnrichmentOutcome::Fetched, Some(page)),
                    Err(err) => {
                        warn!(person_id = id, url, error = %err, "Biography page unavailable, using defaults");
                        (id, EnrichmentOutcome::Defaulted { reason: err.to_string() }, None)
                    }
                },
            })
            .collect()
    });
    let mut page_by_id: HashMap<PersonId, BiographyPage> = HashMap::new();
    for (id, outcome, page) in fetched {
        if let Some(page) = page {
            page_by_id.insert(id, page);
        }
        report.outcomes.insert(id, outcome);
    }

    let mut profiles: BTreeMap<PersonId, PlayerProfile> = jobs
        .iter()
        .map(|&(id, name, _)| {
            let profile = build_profile(
                name,
                roster.get(&id).copied(),
                all_players.get(&id).copied(),
                page_by_id.get(&id),
            );
            (id, profile)
        })
        .collect();

    attach_injuries(universe, &scraped.injuries, matching, &mut profiles, &mut report);

    info!(
        profiles = profiles.len(),
        fetched = report.fetched(),
        defaulted = report.defaulted(),
        no_page = report.no_page(),
        unresolved_roster = report.unresolved_roster,
        unresolved_all_players = report.unresolved_all_players,
        injuries_attached = report.injuries_attached,
        unresolved_injuries = report.unresolved_injuries,
        "Enriched player profiles"
    );
    Ok((profiles, report))
}

fn attach_injuries(
    universe: &IdentityUniverse,
    injuries: &[InjuryReport],
    matching: &MatchingConfig,
    profiles: &mut BTreeMap<PersonId, PlayerProfile>,
    report: &mut EnrichmentReport,
) {
    let threshold = MatchContext::General.threshold(matching);
    for injury in injuries {
        let profile = universe
            .resolve(&injury.player_name, threshold)
            .and_then(|res| profiles.get_mut(&res.person_id));
        match profile {
            Some(profile) => {
                profile.injury = Some(InjuryStatus {
                    status: injury.status.clone(),
                    date: injury.date.clone(),
                    details: injury.details.clone(),
                });
                report.injuries_attached += 1;
            }
            None => {
                report.unresolved_injuries += 1;
                debug!(name = %injury.player_name, "Unresolved injury report");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statline_core::{BoxScoreRow, DraftCategory};

    fn box_row(id: PersonId, name: &str) -> BoxScoreRow {
        BoxScoreRow {
            player_id: id,
            player_name: name.to_string(),
            team: "SEA".to_string(),
            game_id: "1".to_string(),
            game_date: "2024-06-01".to_string(),
            matchup: String::new(),
            season_type: None,
            min: None,
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
            pts: None,
        }
    }

    fn entry(name: &str, team: Option<&str>, position: &str, url: Option<&str>) -> RosterEntry {
        RosterEntry {
            player_name: name.to_string(),
            team: team.map(str::to_string),
            position: Some(position.to_string()),
            height: None,
            weight: None,
            wiki_url: url.map(str::to_string),
        }
    }

    fn universe() -> IdentityUniverse {
        let history = vec![
            box_row(1, "Alpha One"),
            box_row(2, "Beta Two"),
            box_row(3, "Gamma Three"),
        ];
        IdentityUniverse::build(&history, &[], &MatchingConfig::default()).0
    }

    struct FailingSource;

    impl PageSource for FailingSource {
        fn fetch(&self, url: &str) -> Result<BiographyPage> {
            Err(Error::source_unavailable(url, "timed out"))
        }
    }

    #[test]
    fn test_first_present() {
        assert_eq!(first_present([None, Some(" "), Some("N/A"), Some("G")]), Some("G"));
        assert_eq!(first_present([Some("F"), Some("G")]), Some("F"));
        assert_eq!(first_present(Vec::<Option<&str>>::new()), None);
    }

    #[test]
    fn test_roster_beats_all_players() {
        let scraped = ScrapedInputs {
            roster: vec![entry("Alpha One", Some("Seattle Storm"), "G", Some("u1"))],
            all_players: vec![
                entry("Alpha One", None, "F", None),
                entry("Beta Two", None, "C", None),
            ],
            pages: HashMap::new(),
            injuries: vec![],
        };
        let mut pages = HashMap::new();
        pages.insert(
            "u1".to_string(),
            BiographyPage {
                height: Some("6 ft 0 in".to_string()),
                birth_date: Some("1998-03-14".to_string()),
                draft_info: Some("2020 / R1 / P2".to_string()),
                ..Default::default()
            },
        );
        let archive = PageArchive::new(pages);
        let (profiles, report) = enrich_profiles(
            &universe(),
            &scraped,
            &archive,
            &MatchingConfig::default(),
            &EnrichmentConfig { workers: 2 },
        )
        .unwrap();

        let alpha = &profiles[&1];
        assert_eq!(alpha.team, "SEA");
        assert_eq!(alpha.position, "G");
        assert_eq!(alpha.height, "6 ft 0 in");
        assert_eq!(alpha.birth_year, Some(1998));
        assert_eq!(alpha.draft_category, DraftCategory::TopFivePick);

        let beta = &profiles[&2];
        assert_eq!(beta.team, FREE_AGENT);
        assert_eq!(beta.position, "C");

        let gamma = &profiles[&3];
        assert_eq!(gamma.team, NOT_AVAILABLE);
        assert_eq!(gamma.draft_category, DraftCategory::Unknown);
        assert!(gamma.birth_year.is_none());

        assert_eq!(report.fetched(), 1);
        assert_eq!(report.no_page(), 2);
    }

    #[test]
    fn test_page_failure_degrades_one_profile() {
        let scraped = ScrapedInputs {
            roster: vec![
                entry("Alpha One", Some("SEA"), "G", Some("u1")),
                entry("Beta Two", Some("Las Vegas"), "F", Some("u2")),
            ],
            ..Default::default()
        };
        let (profiles, report) = enrich_profiles(
            &universe(),
            &scraped,
            &FailingSource,
            &MatchingConfig::default(),
            &EnrichmentConfig::default(),
        )
        .unwrap();

        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[&2].team, "LVA");
        assert_eq!(profiles[&2].height, NOT_AVAILABLE);
        assert_eq!(report.defaulted(), 2);
        assert!(matches!(
            report.outcomes[&1],
            EnrichmentOutcome::Defaulted { ref reason } if reason.contains("timed out")
        ));
    }

    #[test]
    fn test_injuries_attach_to_resolved_profiles() {
        let scraped = ScrapedInputs {
            injuries: vec![
                InjuryReport {
                    player_name: "Alpha One".to_string(),
                    status: "Out".to_string(),
                    date: "Jun 1".to_string(),
                    details: "Knee".to_string(),
                },
                InjuryReport {
                    player_name: "Nobody Known".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let (profiles, report) = enrich_profiles(
            &universe(),
            &scraped,
            &PageArchive::default(),
            &MatchingConfig::default(),
            &EnrichmentConfig::default(),
        )
        .unwrap();

        assert_eq!(profiles[&1].injury.as_ref().map(|i| i.status.as_str()), Some("Out"));
        assert_eq!(report.injuries_attached, 1);
        assert_eq!(report.unresolved_injuries, 1);
    }
}
