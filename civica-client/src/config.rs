//! Configuration loading for the Civica client.
//!
//! All fields are required. No defaults baked into the binary; deployments
//! state what they run with.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the query service, e.g. `https://api.civica.example`.
    pub api_base_url: String,
    /// Bound on every fetch; an unresponsive service surfaces as an error
    /// instead of a spinner that never resolves.
    pub request_timeout_ms: u64,
    /// Quiet interval for free-text debouncing.
    pub debounce_quiet_ms: u64,
    /// Page event-loop tick interval; drives the debouncer.
    pub tick_interval_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or CIVICA_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.debounce_quiet_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "debounce_quiet_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.tick_interval_ms > self.debounce_quiet_ms {
            return Err(ConfigError::InvalidValue {
                field: "tick_interval_ms",
                reason: "must be <= debounce_quiet_ms or dispatches drift late".to_string(),
            });
        }
        Ok(())
    }
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os("CIVICA_CONFIG").map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const VALID: &str = r#"
        api_base_url = "https://api.civica.example"
        request_timeout_ms = 10000
        debounce_quiet_ms = 150
        tick_interval_ms = 50
    "#;

    #[test]
    fn valid_config_loads_and_validates() {
        let file = write_config(VALID);
        let config = ClientConfig::from_path(file.path()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.debounce_quiet_ms, 150);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = write_config(&format!("{VALID}\nextra_knob = true\n"));
        assert!(ClientConfig::from_path(file.path()).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let file = write_config(
            r#"
            api_base_url = "https://api.civica.example"
            request_timeout_ms = 0
            debounce_quiet_ms = 150
            tick_interval_ms = 50
        "#,
        );
        let config = ClientConfig::from_path(file.path()).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "request_timeout_ms",
                ..
            }
        ));
    }

    #[test]
    fn tick_slower_than_debounce_is_rejected() {
        let file = write_config(
            r#"
            api_base_url = "https://api.civica.example"
            request_timeout_ms = 10000
            debounce_quiet_ms = 150
            tick_interval_ms = 500
        "#,
        );
        let config = ClientConfig::from_path(file.path()).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let file = write_config(
            r#"
            api_base_url = "ftp://api.civica.example"
            request_timeout_ms = 10000
            debounce_quiet_ms = 150
            tick_interval_ms = 50
        "#,
        );
        let config = ClientConfig::from_path(file.path()).unwrap();
        assert!(config.validate().is_err());
    }
}
