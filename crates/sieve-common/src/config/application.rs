use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

const DEFAULT_CONFIG: &str = include_str!("default.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub sampling: SamplingConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Loads the configuration from the built-in defaults,
    /// overridden by `SIEVE__` environment variables.
    /// Nested keys are separated by `__`, e.g. `SIEVE__SAMPLING__SEED=42`.
    pub fn load() -> CommonResult<Self> {
        Self::figment()
            .admerge(Env::prefixed("SIEVE__").map(|p| p.as_str().replace("__", ".").into()))
            .extract()
            .map_err(|e| CommonError::invalid(e.to_string()))
    }

    /// Loads the built-in defaults only, ignoring the environment.
    pub fn defaults() -> CommonResult<Self> {
        Self::figment()
            .extract()
            .map_err(|e| CommonError::invalid(e.to_string()))
    }

    fn figment() -> Figment {
        Figment::from(Toml::string(DEFAULT_CONFIG))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub seed: i64,
    pub seed2: i64,
    pub allow_zero_rate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub trace_to_console: bool,
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::defaults().unwrap();
        assert_eq!(config.sampling.seed, 0);
        assert_eq!(config.sampling.seed2, 0);
        assert!(config.sampling.allow_zero_rate);
        assert!(!config.telemetry.trace_to_console);
    }

    #[test]
    fn test_environment_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SIEVE__SAMPLING__ALLOW_ZERO_RATE", "false");
            jail.set_env("SIEVE__SAMPLING__SEED", 42);
            jail.set_env("SIEVE__TELEMETRY__TRACE_TO_CONSOLE", "true");

            let config = AppConfig::load().unwrap();
            assert_eq!(config.sampling.seed, 42);
            assert_eq!(config.sampling.seed2, 0);
            assert!(!config.sampling.allow_zero_rate);
            assert!(config.telemetry.trace_to_console);

            assert!(AppConfig::defaults().unwrap().sampling.allow_zero_rate);
            Ok(())
        });
    }

    #[test]
    fn test_environment_override_with_invalid_value() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SIEVE__SAMPLING__SEED2", "not-a-number");
            assert!(matches!(
                AppConfig::load(),
                Err(CommonError::InvalidArgument(_))
            ));
            Ok(())
        });
    }
}
