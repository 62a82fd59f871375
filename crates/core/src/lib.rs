//! Core types and configuration for the statline pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Raw input rows (box scores, projections) and the stat line
//! - Records of the published bundle
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod records;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use records::*;
pub use types::*;
