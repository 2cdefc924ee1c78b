//! Log output for assertion runs.
//!
//! The engine only emits `tracing` events; installing a subscriber is left
//! to the test binary. `RUST_LOG` takes precedence over the configured
//! filter.

use crate::config::FlickerConfig;
use crate::result::{FlickerError, FlickerResult};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter used by [`init_logging`]
pub fn env_filter(config: &FlickerConfig) -> FlickerResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_filter).map_err(|e| FlickerError::InvalidConfig {
        message: format!("invalid log filter '{}': {e}", config.log_filter),
    })
}

/// Install a global fmt subscriber
///
/// Returns `Ok(false)` when a global subscriber was already installed,
/// which happens when several tests in one binary call this.
pub fn init_logging(config: &FlickerConfig) -> FlickerResult<bool> {
    let filter = env_filter(config)?;
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).without_time())
        .try_init()
        .is_ok();
    Ok(installed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let config = FlickerConfig::default();
        let _ = init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
    }

    #[test]
    fn test_env_filter_accepts_directives() {
        let config = FlickerConfig::builder()
            .log_filter("flicker=debug,warn")
            .build();
        assert!(env_filter(&config).is_ok());
    }
}
