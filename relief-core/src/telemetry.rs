//! Log subscriber setup for binaries and tests embedding the registry.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::GeneralConfig;
use crate::error::{ReliefError, Result};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. With
/// `config.json_logs` each event is written as one JSON object per line.
///
/// # Errors
/// [`ReliefError::Config`] if the level is not a valid filter or a global
/// subscriber is already installed.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| ReliefError::Config(format!("log_level '{}': {e}", config.log_level)))?,
    };

    let json = config.json_logs.then(|| tracing_subscriber::fmt::layer().json());
    let text = (!config.json_logs).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init()
        .map_err(|e| ReliefError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_refused() {
        let config = GeneralConfig {
            json_logs: true,
            ..GeneralConfig::default()
        };
        let _ = init_tracing(&config);
        assert!(matches!(
            init_tracing(&GeneralConfig::default()),
            Err(ReliefError::Config(_))
        ));
    }
}
