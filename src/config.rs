//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Env var overriding [`FlowConfig::simulated_latency`], in milliseconds.
pub const ENV_SIMULATED_LATENCY_MS: &str = "AUTH_FLOW_SIMULATED_LATENCY_MS";
/// Env var overriding [`FlowConfig::intent_buffer`].
pub const ENV_INTENT_BUFFER: &str = "AUTH_FLOW_INTENT_BUFFER";

/// Flow runtime configuration.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Delay applied by the simulated account service before it succeeds.
    pub simulated_latency: Duration,
    /// Capacity of the intent channel between presenters and the runtime.
    pub intent_buffer: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            simulated_latency: Duration::from_millis(1500),
            intent_buffer: 64,
        }
    }
}

impl FlowConfig {
    /// Build a config from the process environment, falling back to defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_SIMULATED_LATENCY_MS) {
            let millis: u64 = raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: ENV_SIMULATED_LATENCY_MS.to_string(),
                message: format!("{e}"),
            })?;
            config.simulated_latency = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(ENV_INTENT_BUFFER) {
            let buffer: usize = raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: ENV_INTENT_BUFFER.to_string(),
                message: format!("{e}"),
            })?;
            if buffer == 0 {
                return Err(ConfigError::InvalidValue {
                    key: ENV_INTENT_BUFFER.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            config.intent_buffer = buffer;
        }

        Ok(config)
    }
}
