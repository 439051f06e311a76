//! cld-ui configuration
//!
//! Resolution order per setting: command line → environment → TOML → default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cld_common::config::{
    load_toml_config, resolve_setting, write_toml_config, ConfigFileResolver, LoggingConfig,
};
use serde::{Deserialize, Serialize};

use crate::onboarding::OnboardingSettings;

pub const MODULE_NAME: &str = "cld-ui";

pub const BACKEND_URL_ENV: &str = "CLD_BACKEND_URL";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000/api";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 600;
const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_EVENT_CAPACITY: usize = 100;

/// On-disk form; every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub backend_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub submit_timeout_secs: Option<u64>,
    #[serde(default)]
    pub event_capacity: Option<usize>,
    #[serde(default)]
    pub directory_file: Option<PathBuf>,
    #[serde(default)]
    pub onboarding: OnboardingSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingSection {
    #[serde(default)]
    pub progress_interval_ms: Option<u64>,
    #[serde(default)]
    pub progress_max_step: Option<u32>,
    #[serde(default)]
    pub settle_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSection {
    #[serde(default)]
    pub debounce_ms: Option<u64>,
}

/// Command-line overrides
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub backend_url: Option<String>,
    pub directory_file: Option<PathBuf>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub request_timeout: Duration,
    pub submit_timeout: Duration,
    pub search_debounce: Duration,
    pub event_capacity: usize,
    /// `None` selects the built-in directory
    pub directory_file: Option<PathBuf>,
    pub onboarding: OnboardingSettings,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &CliOverrides::default())
    }
}

impl ClientConfig {
    /// Locate and load the TOML file, then apply environment and CLI
    pub fn load(cli: &CliOverrides) -> cld_common::Result<Self> {
        let path = ConfigFileResolver::new(MODULE_NAME).resolve(cli.config_path.as_deref());
        let toml: TomlConfig = load_toml_config(path.as_deref())?;
        Ok(Self::from_toml(toml, cli))
    }

    pub fn from_toml(toml: TomlConfig, cli: &CliOverrides) -> Self {
        let defaults = OnboardingSettings::default();

        let backend_url = resolve_setting(
            cli.backend_url.clone(),
            BACKEND_URL_ENV,
            toml.backend_url,
            DEFAULT_BACKEND_URL.to_string(),
        );

        let onboarding = OnboardingSettings {
            progress_interval: toml
                .onboarding
                .progress_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.progress_interval),
            max_step: toml.onboarding.progress_max_step.unwrap_or(defaults.max_step).max(1),
            settle_delay: toml
                .onboarding
                .settle_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.settle_delay),
        };

        Self {
            backend_url,
            request_timeout: Duration::from_secs(
                toml.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            submit_timeout: Duration::from_secs(
                toml.submit_timeout_secs.unwrap_or(DEFAULT_SUBMIT_TIMEOUT_SECS),
            ),
            search_debounce: Duration::from_millis(
                toml.search.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS),
            ),
            event_capacity: toml.event_capacity.unwrap_or(DEFAULT_EVENT_CAPACITY).max(1),
            directory_file: cli.directory_file.clone().or(toml.directory_file),
            onboarding,
            log_level: toml.logging.level,
        }
    }

    pub fn directory_file(&self) -> Option<&Path> {
        self.directory_file.as_deref()
    }

    /// Every setting spelled out, for writing a starter config file
    pub fn to_toml(&self) -> TomlConfig {
        TomlConfig {
            backend_url: Some(self.backend_url.clone()),
            request_timeout_secs: Some(self.request_timeout.as_secs()),
            submit_timeout_secs: Some(self.submit_timeout.as_secs()),
            event_capacity: Some(self.event_capacity),
            directory_file: self.directory_file.clone(),
            onboarding: OnboardingSection {
                progress_interval_ms: Some(self.onboarding.progress_interval.as_millis() as u64),
                progress_max_step: Some(self.onboarding.max_step),
                settle_delay_ms: Some(self.onboarding.settle_delay.as_millis() as u64),
            },
            search: SearchSection {
                debounce_ms: Some(self.search_debounce.as_millis() as u64),
            },
            logging: LoggingConfig {
                level: self.log_level.clone(),
            },
        }
    }

    /// Write the resolved settings to `path`, or the default config location
    pub fn write(&self, path: Option<&Path>) -> cld_common::Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => ConfigFileResolver::new(MODULE_NAME).default_path().ok_or_else(|| {
                cld_common::Error::Config("No platform config directory".to_string())
            })?,
        };
        write_toml_config(&self.to_toml(), &path)?;
        Ok(path)
    }
}
