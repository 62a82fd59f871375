//! Linking projected games to realized games and grading them.
//!
//! This crate handles:
//! - Order-independent game keys
//! - Per-player prediction ratings and team-total comparison
//! - Daily game records, flat grade history and accuracy summaries
//! - Performance history points for player profiles

pub mod history;
pub mod key;
pub mod linker;

pub use history::{
    accuracy_summary, attach_performance_history, daily_games_by_date, historical_grades,
    performance_history, AccuracySummary,
};
pub use key::game_key;
pub use linker::{grade_game, link_games, rate, realized_games, relative_error, RealizedGame};
