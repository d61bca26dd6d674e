//! Declarative feed settings
//!
//! A static TOML mapping of locations to feeds drives batch runs. The
//! settings are loaded once into an immutable value and passed to the
//! pipeline; nothing here is a process-wide global.
//!
//! ```toml
//! [shortcodes]
//! temperature = "T"
//!
//! [locations.backyard]
//! feeds = ["temperature", "humidity", "light"]
//! delay_seconds = 5
//!
//! [locations.backyard.bounds]
//! light = "daylight"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Feeds collected at one physical site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub feeds: Vec<String>,

    /// Pause between feed fetches at this location, to be gentle on the
    /// remote service.
    #[serde(default)]
    pub delay_seconds: Option<u64>,

    /// Primary feed -> companion feed whose in-window readings clip the
    /// statistics sub-range (e.g. daylight-only light statistics).
    #[serde(default)]
    pub bounds: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeedSettings {
    #[serde(default)]
    pub locations: BTreeMap<String, LocationConfig>,

    /// Feed name -> report shortcode
    #[serde(default)]
    pub shortcodes: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedSettings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load from the TELEM_FEEDS path, defaulting to `feeds.toml`.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = std::env::var("TELEM_FEEDS").unwrap_or_else(|_| "feeds.toml".to_string());
        Self::load(path)
    }

    pub fn location_names(&self) -> Vec<&str> {
        self.locations.keys().map(String::as_str).collect()
    }

    pub fn location(&self, name: &str) -> Option<&LocationConfig> {
        self.locations.get(name)
    }

    pub fn shortcode(&self, feed: &str) -> Option<&str> {
        self.shortcodes.get(feed).map(String::as_str)
    }
}

impl LocationConfig {
    pub fn bounds_companion(&self, feed: &str) -> Option<&str> {
        self.bounds.get(feed).map(String::as_str)
    }

    pub fn delay_seconds(&self) -> u64 {
        self.delay_seconds.unwrap_or(0)
    }
}
