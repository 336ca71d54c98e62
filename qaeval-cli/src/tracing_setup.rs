//! Tracing setup for the qaeval CLI
//!
//! Usage:
//!   qaeval --debug ...              # Debug logging to console
//!   RUST_LOG=qaeval_server=debug qaeval serve
//!
//! Environment variables:
//!   RUST_LOG                        # Log filter (wins over everything else)
//!   APP_LOG_LEVEL                   # Default level when RUST_LOG is unset

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Enable debug logging (unless RUST_LOG is explicitly set)
    pub debug: bool,
    /// Fallback level when neither RUST_LOG nor --debug apply
    pub default_level: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            default_level: "info".to_string(),
        }
    }
}

fn filter_for(config: &TracingConfig) -> EnvFilter {
    let fallback = if config.debug {
        "debug"
    } else {
        config.default_level.as_str()
    };
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize console tracing. Logs go to stderr so command output stays
/// clean on stdout.
pub fn init(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(config))
        .with_target(config.debug) // Show targets in debug mode
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_falls_back_to_info() {
        let config = TracingConfig {
            debug: false,
            default_level: "not a [level".into(),
        };
        // Must not panic on an unparsable directive.
        let _ = filter_for(&config);
    }
}
