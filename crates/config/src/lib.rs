//! Configuration loading and validation for the Suricata runtime.
//!
//! Loads configuration from `~/.suricata/config.toml` with environment
//! variable overrides. Everything is optional: a missing file yields the
//! defaults, which describe an unbounded agent loop.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime behavior settings.
///
/// Maps directly to `~/.suricata/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Maximum tool calls per invocation. Unset means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,

    /// Capacity of the runtime event bus
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Label placed between the tool name and its serialized result
    #[serde(default = "default_tool_output_label")]
    pub tool_output_label: String,

    /// Prefix of the turn reporting a failed tool call
    #[serde(default = "default_tool_error_prefix")]
    pub tool_error_prefix: String,
}

fn default_event_capacity() -> usize {
    256
}
fn default_tool_output_label() -> String {
    "OUTPUT".into()
}
fn default_tool_error_prefix() -> String {
    "ERR: ".into()
}

impl RuntimeConfig {
    /// Load configuration from the default path (~/.suricata/config.toml).
    ///
    /// Environment variables take precedence over the file:
    /// - `SURICATA_MAX_TURNS`
    /// - `SURICATA_EVENT_CAPACITY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".suricata")
    }

    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup("SURICATA_MAX_TURNS") {
            let turns = raw.trim().parse::<u32>().map_err(|e| ConfigError::EnvError {
                key: "SURICATA_MAX_TURNS".into(),
                reason: e.to_string(),
            })?;
            self.max_turns = Some(turns);
        }

        if let Some(raw) = lookup("SURICATA_EVENT_CAPACITY") {
            self.event_capacity = raw.trim().parse::<usize>().map_err(|e| ConfigError::EnvError {
                key: "SURICATA_EVENT_CAPACITY".into(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_turns == Some(0) {
            return Err(ConfigError::ValidationError(
                "max_turns must be at least 1 (omit it for an unbounded loop)".into(),
            ));
        }

        if self.event_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "event_capacity must be > 0".into(),
            ));
        }

        if self.tool_output_label.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tool_output_label must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_turns: None,
            event_capacity: default_event_capacity(),
            tool_output_label: default_tool_output_label(),
            tool_error_prefix: default_tool_error_prefix(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    EnvError { key: String, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_unbounded() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_turns, None);
        assert_eq!(config.event_capacity, 256);
        assert_eq!(config.tool_output_label, "OUTPUT");
        assert_eq!(config.tool_error_prefix, "ERR: ");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = RuntimeConfig {
            max_turns: Some(8),
            ..RuntimeConfig::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RuntimeConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn zero_turns_rejected() {
        let config = RuntimeConfig {
            max_turns: Some(0),
            ..RuntimeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = RuntimeConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_turns = 5\n").unwrap();

        let config = RuntimeConfig::load_from(&path).unwrap();
        assert_eq!(config.max_turns, Some(5));
        assert_eq!(config.event_capacity, 256);
    }

    #[test]
    fn unparseable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_turns = \"many\"\n").unwrap();

        let err = RuntimeConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> =
            HashMap::from([("SURICATA_MAX_TURNS", "3"), ("SURICATA_EVENT_CAPACITY", "32")]);
        let mut config = RuntimeConfig::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.max_turns, Some(3));
        assert_eq!(config.event_capacity, 32);
    }

    #[test]
    fn bad_env_value_rejected() {
        let mut config = RuntimeConfig::default();
        let err = config
            .apply_env_overrides(|k| (k == "SURICATA_MAX_TURNS").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("SURICATA_MAX_TURNS"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = RuntimeConfig::default_toml();
        assert!(toml_str.contains("event_capacity = 256"));
        assert!(!toml_str.contains("max_turns"));
    }
}
