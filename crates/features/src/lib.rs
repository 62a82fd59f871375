//! Derived statistics for the statline bundle.
//!
//! This crate handles:
//! - Season totals and per-game rates, actual and projected
//! - Trailing-minutes estimates for projected games
//! - Standardized scores, composites and ranks
//! - Monthly career curves and cohort averages
//! - Year-over-year progression

pub mod aggregation;
pub mod career;
pub mod progression;
pub mod rolling;
pub mod zscore;

pub use aggregation::{
    actuals_key, aggregate_actuals, aggregate_projections, projections_key, trailing_minutes,
    SeasonPhase,
};
pub use career::build_career_data;
pub use progression::progression;
pub use rolling::{centered_mean, RollingMean};
pub use zscore::{active_categories, punted_score, rank_by, score_dataset};
