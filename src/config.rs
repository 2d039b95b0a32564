//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// host:port the server listens on
    pub address: String,
    /// Maximum number of entries the cache can hold, 0 = unbounded
    pub max_entries: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ADDR` - Listen address (default: 0.0.0.0:3000)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 0, unbounded)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            address: env::var("CACHE_ADDR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.address),
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_entries),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:3000".to_string(),
            max_entries: 0,
        }
    }
}
