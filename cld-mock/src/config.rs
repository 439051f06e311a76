//! cld-mock configuration
//!
//! Resolution order per setting: command line → environment → TOML → default.

use std::path::PathBuf;
use std::time::Duration;

use cld_common::config::{load_toml_config, resolve_setting, ConfigFileResolver, LoggingConfig};
use serde::{Deserialize, Serialize};

pub const MODULE_NAME: &str = "cld-mock";

pub const PORT_ENV: &str = "CLD_MOCK_PORT";
pub const DATA_FILE_ENV: &str = "CLD_MOCK_DATA";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    #[serde(default)]
    pub analysis_delay_ms: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub data_file: Option<PathBuf>,
    pub analysis_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    pub port: u16,
    /// `None` serves the built-in sample database
    pub data_file: Option<PathBuf>,
    pub analysis_delay: Duration,
    pub log_level: String,
}

impl MockConfig {
    pub fn load(cli: &CliOverrides) -> cld_common::Result<Self> {
        let path = ConfigFileResolver::new(MODULE_NAME).resolve(cli.config_path.as_deref());
        let toml: TomlConfig = load_toml_config(path.as_deref())?;
        Ok(Self::from_toml(toml, cli))
    }

    pub fn from_toml(toml: TomlConfig, cli: &CliOverrides) -> Self {
        let port = resolve_setting(cli.port, PORT_ENV, toml.port, DEFAULT_PORT);

        let data_file = cli
            .data_file
            .clone()
            .or_else(|| {
                std::env::var(DATA_FILE_ENV)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(PathBuf::from)
            })
            .or(toml.data_file);

        let analysis_delay_ms = cli.analysis_delay_ms.or(toml.analysis_delay_ms).unwrap_or(0);

        Self {
            port,
            data_file,
            analysis_delay: Duration::from_millis(analysis_delay_ms),
            log_level: toml.logging.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_toml() {
        let toml = TomlConfig {
            port: Some(9100),
            analysis_delay_ms: Some(2000),
            ..Default::default()
        };
        let cli = CliOverrides {
            port: Some(9200),
            analysis_delay_ms: Some(0),
            ..Default::default()
        };

        let config = MockConfig::from_toml(toml, &cli);
        assert_eq!(config.port, 9200);
        assert_eq!(config.analysis_delay, Duration::ZERO);
    }

    #[test]
    fn test_toml_data_file() {
        let toml = TomlConfig {
            data_file: Some(PathBuf::from("/srv/cld/data.json")),
            ..Default::default()
        };
        let cli = CliOverrides {
            data_file: Some(PathBuf::from("/tmp/override.json")),
            ..Default::default()
        };
        assert_eq!(
            MockConfig::from_toml(toml, &cli).data_file,
            Some(PathBuf::from("/tmp/override.json"))
        );
    }
}
