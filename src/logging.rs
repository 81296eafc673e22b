use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

/// Install the global fmt subscriber with the given `RUST_LOG`-style filter.
pub fn init_tracing(filter: &str) -> Result<(), ConfigError> {
    tracing_subscriber::fmt().with_env_filter(build_filter(filter)?).init();
    Ok(())
}

fn build_filter(filter: &str) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_new(filter.trim()).map_err(|e| ConfigError::Invalid {
        var: "RUST_LOG",
        reason: e.to_string(),
    })
}
