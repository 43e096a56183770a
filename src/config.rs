// Configuration file handling
//
// The rc file lives at $HOME/.shiptrack/rc and holds `key=value` lines.
// Recognised keys:
//   data.location=<path>      database file (relative paths resolve against the rc directory)
//   tick.interval_ms=<n>      refresh interval for `watch`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default refresh interval in milliseconds
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

const CONFIG_DIR_NAME: &str = ".shiptrack";
const CONFIG_FILE_NAME: &str = "rc";
const DEFAULT_DB_FILE_NAME: &str = "orders.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_location: PathBuf,
    pub tick_interval_ms: u64,
}

impl Config {
    /// Home directory: $HOME first, then the platform default
    pub fn home_dir() -> Result<PathBuf> {
        if let Some(home) = std::env::var_os("HOME") {
            if !home.is_empty() {
                return Ok(PathBuf::from(home));
            }
        }
        dirs::home_dir().context("Failed to determine home directory")
    }

    /// Directory holding the rc file and the default database
    pub fn config_dir() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join(CONFIG_DIR_NAME))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Configuration with every value defaulted, rooted at `config_dir`
    pub fn defaults(config_dir: &Path) -> Self {
        Self {
            data_location: config_dir.join(DEFAULT_DB_FILE_NAME),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }

    /// Load the rc file if present, otherwise defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let config_dir = Self::config_dir()?;

        if !config_path.exists() {
            return Ok(Self::defaults(&config_dir));
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        Ok(Self::parse(&content, &config_dir))
    }

    /// Parse rc content. Unknown keys are ignored; malformed values keep the default.
    pub fn parse(content: &str, config_dir: &Path) -> Self {
        let mut config = Self::defaults(config_dir);

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring malformed config line: {}", line);
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() {
                        config_dir.join(path)
                    } else {
                        path
                    };
                }
                "tick.interval_ms" => match value.parse::<u64>() {
                    Ok(ms) if ms > 0 => config.tick_interval_ms = ms,
                    _ => log::warn!("Ignoring invalid tick.interval_ms value: {}", value),
                },
                other => log::debug!("Ignoring unknown config key: {}", other),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("", Path::new("/home/u/.shiptrack"));
        assert_eq!(config.data_location, PathBuf::from("/home/u/.shiptrack/orders.db"));
        assert_eq!(config.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
    }

    #[test]
    fn test_relative_data_location_resolves_against_config_dir() {
        let config = Config::parse("data.location=./custom.db\n", Path::new("/cfg"));
        assert_eq!(config.data_location, PathBuf::from("/cfg/./custom.db"));
    }

    #[test]
    fn test_absolute_data_location_and_interval() {
        let config = Config::parse(
            "# comment\ndata.location=/tmp/x.db\ntick.interval_ms = 250\ncolor=never\n",
            Path::new("/cfg"),
        );
        assert_eq!(config.data_location, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.tick_interval_ms, 250);
    }

    #[test]
    fn test_invalid_interval_keeps_default() {
        let config = Config::parse("tick.interval_ms=fast\nnonsense\n", Path::new("/cfg"));
        assert_eq!(config.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);

        let config = Config::parse("tick.interval_ms=0", Path::new("/cfg"));
        assert_eq!(config.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
    }
}
