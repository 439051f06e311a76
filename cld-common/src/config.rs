//! Configuration loading and resolution
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is never fatal: a warning is logged and compiled
//! defaults are used.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CLD_CONFIG";

/// Logging section shared by every module's TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locates the TOML config file for one module
#[derive(Debug, Clone)]
pub struct ConfigFileResolver {
    module_name: String,
}

impl ConfigFileResolver {
    /// `module_name` selects `<config_dir>/cld/<module_name>.toml`
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
        }
    }

    /// Resolve config file path
    ///
    /// Returns `None` when no explicit path was given and the default file
    /// does not exist.
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = cli_arg {
            debug!(path = %path.display(), "Config file from command line");
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                debug!(path = %path, "Config file from {}", CONFIG_ENV_VAR);
                return Some(PathBuf::from(path));
            }
        }

        let default = self.default_path()?;
        if default.exists() {
            Some(default)
        } else {
            None
        }
    }

    /// Platform default: `~/.config/cld/<module>.toml` on Linux
    pub fn default_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cld").join(format!("{}.toml", self.module_name)))
    }
}

/// Load a TOML config, falling back to defaults when the file is absent
///
/// A file that exists but fails to parse is an error.
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using compiled defaults");
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Write a TOML config atomically (temp file + rename)
pub fn write_toml_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    debug!(path = %path.display(), "Config written");
    Ok(())
}

/// Resolve one setting through CLI → ENV → TOML → default
///
/// An environment value that fails to parse is logged and skipped.
pub fn resolve_setting<T>(cli: Option<T>, env_var: &str, toml: Option<T>, default: T) -> T
where
    T: FromStr,
{
    if let Some(value) = cli {
        return value;
    }

    if let Ok(raw) = std::env::var(env_var) {
        match raw.trim().parse::<T>() {
            Ok(value) => return value,
            Err(_) => warn!(env_var = %env_var, value = %raw, "Ignoring unparseable environment value"),
        }
    }

    toml.unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        logging: LoggingConfig,
    }

    #[test]
    fn test_load_none_uses_default() {
        let config: Sample = load_toml_config(None).unwrap();
        assert_eq!(config, Sample::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_cli_path_wins() {
        let resolver = ConfigFileResolver::new("test-module");
        let path = PathBuf::from("/tmp/explicit.toml");
        assert_eq!(resolver.resolve(Some(&path)), Some(path));
    }

    #[test]
    fn test_default_path_uses_module_name() {
        let resolver = ConfigFileResolver::new("cld-ui");
        if let Some(path) = resolver.default_path() {
            assert!(path.ends_with("cld/cld-ui.toml"));
        }
    }
}
