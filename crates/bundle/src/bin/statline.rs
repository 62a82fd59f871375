//! `statline` command line.

use anyhow::Result;
use clap::Parser;
use statline_bundle::cli::{execute, Cli};
use statline_bundle::logging::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;
    execute(cli)
}
