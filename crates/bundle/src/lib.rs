//! Bundle assembly for the statline dashboard.
//!
//! This crate handles:
//! - Sanitizing non-finite numbers before serialization
//! - The season dataset manifest
//! - Writing the bundle through a staging directory
//! - Running the whole pipeline from a [`Config`](statline_core::Config)
//! - The `statline` command line

pub mod cli;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod sanitize;
pub mod writer;

pub use manifest::{build_manifest, dataset_file_key, ManifestEntry};
pub use pipeline::{run, BuildReport};
pub use sanitize::to_sanitized_value;
pub use writer::{write_bundle, Bundle};
