//! Viewer configuration
//!
//! Optional TOML file at `<config dir>/pdfolio/config.toml`. Missing or
//! malformed files fall back to defaults; a malformed file is logged,
//! never fatal.

use std::fs;
use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::viewer::{DEFAULT_CACHE_SIZE, DEFAULT_PREFETCH_RADIUS};

const APP_NAME: &str = "pdfolio";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Rendered pages kept in memory
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Neighbouring pages rendered ahead of navigation
    #[serde(default = "default_prefetch_radius")]
    pub prefetch_radius: usize,
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_prefetch_radius() -> usize {
    DEFAULT_PREFETCH_RADIUS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_size: default_cache_size(),
            prefetch_radius: default_prefetch_radius(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(CONFIG_FILENAME))
}

/// Load the configuration, falling back to defaults
#[must_use]
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        warn!("could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        return Config::default();
    }

    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Config>(&content) {
            Ok(config) => {
                debug!("loaded config from {path:?}");
                config
            }
            Err(e) => {
                warn!("failed to parse config file {path:?}: {e}");
                Config::default()
            }
        },
        Err(e) => {
            warn!("failed to read config file {path:?}: {e}");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_constants() {
        let config = Config::default();
        assert_eq!(config.cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(config.prefetch_radius, DEFAULT_PREFETCH_RADIUS);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: Config = toml::from_str("cache_size = 4").expect("parse");
        assert_eq!(config.cache_size, 4);
        assert_eq!(config.prefetch_radius, DEFAULT_PREFETCH_RADIUS);
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let config: Config = toml::from_str("").expect("parse");
        assert_eq!(config.cache_size, DEFAULT_CACHE_SIZE);
    }
}
