//! Dispatcher configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable enabling the debug sink.
pub const VERBOSE_ENV: &str = "CIRCUIT_VERBOSE";

/// Environment variable toggling lifecycle logging.
pub const LOG_EVENTS_ENV: &str = "CIRCUIT_LOG_EVENTS";

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Report every guard/observer failure to the debug sink
    pub verbose: bool,

    /// Emit `tracing` events for registration and invocation lifecycle
    pub enable_logging: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            enable_logging: true,
        }
    }
}

impl DispatcherConfig {
    /// Build a config from `CIRCUIT_VERBOSE` and `CIRCUIT_LOG_EVENTS`.
    ///
    /// Unset variables keep their defaults. Accepts `1`/`true`/`yes`/`on`
    /// and `0`/`false`/`no`/`off`, case-insensitively.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source using the same rules as
    /// [`from_env`](Self::from_env).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(verbose) = lookup_flag(&get, VERBOSE_ENV)? {
            config.verbose = verbose;
        }
        if let Some(enable_logging) = lookup_flag(&get, LOG_EVENTS_ENV)? {
            config.enable_logging = enable_logging;
        }

        Ok(config)
    }

    /// Parse a config from TOML. Missing keys keep their defaults.
    ///
    /// ```
    /// use circuit_events::DispatcherConfig;
    ///
    /// let config = DispatcherConfig::from_toml_str("verbose = true").unwrap();
    /// assert!(config.verbose);
    /// assert!(config.enable_logging);
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

fn lookup_flag(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<bool>, ConfigError> {
    match get(key) {
        Some(value) => parse_flag(&value)
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = DispatcherConfig::default();
        assert!(!config.verbose);
        assert!(config.enable_logging);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" on "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("Off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_from_toml() {
        let config =
            DispatcherConfig::from_toml_str("verbose = true\nenable_logging = false").unwrap();
        assert_eq!(
            config,
            DispatcherConfig {
                verbose: true,
                enable_logging: false,
            }
        );

        let empty = DispatcherConfig::from_toml_str("").unwrap();
        assert_eq!(empty, DispatcherConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_bad_input() {
        let result = DispatcherConfig::from_toml_str("verbose = \"loud\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_unset_keeps_defaults() {
        let config = DispatcherConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DispatcherConfig::default());
    }

    #[test]
    fn test_from_lookup_enables_flags() {
        let vars = lookup(&[(VERBOSE_ENV, "true"), (LOG_EVENTS_ENV, "1")]);
        let config = DispatcherConfig::from_lookup(vars).unwrap();
        assert!(config.verbose);
        assert!(config.enable_logging);
    }

    #[test]
    fn test_from_lookup_disables_flags() {
        let vars = lookup(&[(VERBOSE_ENV, "off"), (LOG_EVENTS_ENV, "no")]);
        let config = DispatcherConfig::from_lookup(vars).unwrap();
        assert!(!config.verbose);
        assert!(!config.enable_logging);
    }

    #[test]
    fn test_from_lookup_rejects_invalid_flag() {
        let result = DispatcherConfig::from_lookup(lookup(&[(VERBOSE_ENV, "loud")]));
        let Err(ConfigError::InvalidValue { key, value }) = result else {
            panic!("expected InvalidValue, got {:?}", result);
        };
        assert_eq!(key, VERBOSE_ENV);
        assert_eq!(value, "loud");
    }
}
