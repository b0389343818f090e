//! Engine configuration.
//!
//! All fields carry serde defaults, so an empty document yields the default
//! configuration:
//!
//! ```rust
//! use nearby::Config;
//!
//! let config = Config::from_json("{}").unwrap();
//! assert_eq!(config.cache_capacity, 10_000);
//! assert_eq!(config.max_limit, 50);
//! ```
use crate::error::{NearbyError, Result};
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How the top-K selector orders candidates.
///
/// Both strategies produce identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Rank every candidate, then truncate. O(n log n).
    #[default]
    FullSort,
    /// Keep a bounded max-heap of the best `k`. O(n log k).
    Heap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Maximum number of cached result lists before LRU eviction
    #[serde(default = "Config::default_cache_capacity")]
    pub cache_capacity: usize,

    /// Lifetime of a cached result list, counted from when it was written
    #[serde(default = "Config::default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Largest `k` a caller may ask for
    #[serde(default = "Config::default_max_limit")]
    pub max_limit: usize,

    /// `k` used when a caller does not pass one
    #[serde(default = "Config::default_limit")]
    pub default_limit: usize,

    #[serde(default)]
    pub selection: SelectionStrategy,
}

impl Config {
    const fn default_cache_capacity() -> usize {
        10_000
    }

    const fn default_cache_ttl_seconds() -> u64 {
        6 * 60 * 60
    }

    const fn default_max_limit() -> usize {
        50
    }

    const fn default_limit() -> usize {
        5
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Cache capacity must be greater than zero");
        self.cache_capacity = capacity;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        assert!(ttl.as_secs() > 0, "Cache TTL must be at least one second");
        self.cache_ttl_seconds = ttl.as_secs();
        self
    }

    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        assert!(max_limit > 0, "Max limit must be greater than zero");
        self.max_limit = max_limit;
        if self.default_limit > max_limit {
            log::warn!(
                "Default limit {} exceeds new max limit {}, clamping",
                self.default_limit,
                max_limit
            );
            self.default_limit = max_limit;
        }
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        assert!(limit > 0, "Default limit must be greater than zero");
        self.default_limit = limit;
        self
    }

    pub fn with_selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.cache_capacity == 0 {
            return Err("Cache capacity must be greater than zero".to_string());
        }

        if self.cache_ttl_seconds == 0 {
            return Err("Cache TTL must be greater than zero".to_string());
        }

        if self.max_limit == 0 {
            return Err("Max limit must be greater than zero".to_string());
        }

        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(format!(
                "Default limit must be between 1 and {}, got {}",
                self.max_limit, self.default_limit
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reads a configuration file, choosing the format by extension.
    ///
    /// `.toml` files need the `toml` feature; everything else is parsed as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            #[cfg(feature = "toml")]
            return Ok(Self::from_toml(&text)?);

            #[cfg(not(feature = "toml"))]
            return Err(NearbyError::Config(format!(
                "{} is a TOML file but the `toml` feature is disabled",
                path.display()
            )));
        }

        Self::from_json(&text).map_err(|e| NearbyError::Config(format!("{}: {}", path.display(), e)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: Self::default_cache_capacity(),
            cache_ttl_seconds: Self::default_cache_ttl_seconds(),
            max_limit: Self::default_max_limit(),
            default_limit: Self::default_limit(),
            selection: SelectionStrategy::default(),
        }
    }
}
