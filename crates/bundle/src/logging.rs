//! Logging setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter from an explicit level, else `RUST_LOG`, else `info`.
pub fn env_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level).map_err(|e| anyhow!("invalid log level {level:?}: {e}")),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}

/// Install the global subscriber.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let fmt_layer = fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("cannot install logger: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level() {
        assert!(env_filter(Some("debug")).is_ok());
        assert!(env_filter(Some("statline_ingestion=trace,info")).is_ok());
        assert!(env_filter(Some("statline=loud")).is_err());
    }
}
