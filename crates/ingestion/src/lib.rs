//! Data ingestion and identity resolution for the statline pipeline.
//!
//! This crate handles:
//! - Loading the box-score and projection tables
//! - Folding new box scores into the historical table
//! - Canonical player identities (exact and fuzzy name matching)
//! - Profile enrichment from roster scrapes and biography pages
//! - Draft-category parsing

pub mod draft;
pub mod identity;
pub mod loaders;
pub mod merge;
pub mod profiles;
pub mod scraped;

pub use draft::parse_draft_category;
pub use identity::{
    normalize_name, token_set_ratio, IdentityUniverse, MatchContext, MatchKind, Resolution,
    ResolutionStats,
};
pub use loaders::{load_box_scores, load_projections, ScrapedInputs};
pub use merge::{merge_stats_files, MergeStats};
pub use profiles::{enrich_profiles, EnrichmentOutcome, EnrichmentReport, PageArchive, PageSource};
pub use scraped::{BiographyPage, InjuryReport, RosterEntry};
