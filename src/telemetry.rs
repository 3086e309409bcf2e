use tracing_subscriber::EnvFilter;

use crate::error::{TrackError, TrackResult};

/// Installs the global subscriber. `RUST_LOG`, when set, overrides the
/// configured level. Logs go to stderr so command output stays clean.
pub fn init(log_level: &str) -> TrackResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("calltrack={}", log_level))
            .map_err(|e| TrackError::Config(format!("invalid log level '{}': {}", log_level, e)))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| TrackError::Other(format!("failed to install logger: {}", e)))
}
