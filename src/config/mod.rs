//! Config file handling
//!
//! `<config_dir>/reqbench/config.toml`, all keys optional:
//!
//! ```toml
//! request_timeout = "20s"
//! script_timeout = "5s"
//! script_memory_limit = 33554432
//! log_format = "text"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::WorkbenchError;
use crate::http::DEFAULT_TIMEOUT;
use crate::logging::LogFormat;
use crate::scripting::SandboxLimits;

/// On-disk shape of the config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    request_timeout: Option<String>,
    script_timeout: Option<String>,
    script_memory_limit: Option<usize>,
    log_format: Option<LogFormat>,
}

/// reqbench configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub config_dir: PathBuf,
    pub request_timeout: Duration,
    pub script_timeout: Duration,
    pub script_memory_limit: usize,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        let limits = SandboxLimits::default();
        Self {
            config_dir: Self::default_config_dir(),
            request_timeout: DEFAULT_TIMEOUT,
            script_timeout: limits.timeout,
            script_memory_limit: limits.memory_limit,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file, if there is one
    pub fn load() -> Result<Self, WorkbenchError> {
        let config_file = Self::default_config_dir().join("config.toml");
        if !config_file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_file)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, WorkbenchError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WorkbenchError::Config(format!("Failed to read config {}: {}", path.display(), e)))?;

        let mut config = Self::from_toml_str(&content)?;
        if let Some(dir) = path.parent() {
            config.config_dir = dir.to_path_buf();
        }
        Ok(config)
    }

    /// Parse configuration from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, WorkbenchError> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| WorkbenchError::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();
        if let Some(ref value) = file.request_timeout {
            config.request_timeout = parse_duration("request_timeout", value)?;
        }
        if let Some(ref value) = file.script_timeout {
            config.script_timeout = parse_duration("script_timeout", value)?;
        }
        if let Some(limit) = file.script_memory_limit {
            config.script_memory_limit = limit;
        }
        if let Some(format) = file.log_format {
            config.log_format = format;
        }
        Ok(config)
    }

    /// Sandbox limits derived from this configuration
    pub fn sandbox_limits(&self) -> SandboxLimits {
        SandboxLimits {
            timeout: self.script_timeout,
            memory_limit: self.script_memory_limit,
            ..SandboxLimits::default()
        }
    }

    /// Get the default config directory
    fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("reqbench"))
            .unwrap_or_else(|| PathBuf::from(".reqbench"))
    }
}

/// Parse a humantime duration ("20s", "500ms"); zero is rejected since both
/// timeouts must stay finite and positive.
pub fn parse_duration(field: &str, value: &str) -> Result<Duration, WorkbenchError> {
    let duration = humantime::parse_duration(value.trim())
        .map_err(|e| WorkbenchError::Config(format!("Invalid {} '{}': {}", field, value, e)))?;
    if duration.is_zero() {
        return Err(WorkbenchError::Config(format!("{} must be greater than zero", field)));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert_eq!(config.script_timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_toml_str(
            r#"
request_timeout = "1m"
script_timeout = "250ms"
script_memory_limit = 1048576
log_format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.sandbox_limits().timeout, Duration::from_millis(250));
        assert_eq!(config.sandbox_limits().memory_limit, 1_048_576);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_duration() {
        let err = Config::from_toml_str(r#"request_timeout = "soon""#).unwrap_err();
        assert!(matches!(err, WorkbenchError::Config(_)));
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(parse_duration("script_timeout", "0s").is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_toml_str("retries = 3").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "script_timeout = \"2s\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.script_timeout, Duration::from_secs(2));
        assert_eq!(config.config_dir, dir.path());
    }
}
