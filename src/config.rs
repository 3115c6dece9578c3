//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default storage quota, in the low single-digit megabytes a browser-style store allows.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Directory for the file-backed cache store, None = in-memory store
    pub cache_dir: Option<PathBuf>,
    /// Byte quota of the cache store (keys + values)
    pub cache_quota_bytes: usize,
    /// Expiration in days used when no cache config has been persisted yet
    pub cache_expiration_days: u32,
    /// Directory holding `<source_id>.json` keyword snapshots
    pub sources_dir: PathBuf,
    /// Deadline in seconds for all source fetches of one analysis, 0 = none
    pub fetch_timeout_secs: u64,
    /// Expired-entry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_DIR` - File-backed cache directory (default: unset, in-memory)
    /// - `CACHE_QUOTA_BYTES` - Cache byte quota (default: 5 MiB)
    /// - `CACHE_EXPIRATION_DAYS` - Initial cache TTL in days (default: 7)
    /// - `SOURCES_DIR` - Keyword snapshot directory (default: ./sources)
    /// - `FETCH_TIMEOUT_SECS` - Source fetch deadline (default: 30)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            cache_quota_bytes: parse_var("CACHE_QUOTA_BYTES")
                .unwrap_or(defaults.cache_quota_bytes),
            cache_expiration_days: parse_var("CACHE_EXPIRATION_DAYS")
                .unwrap_or(defaults.cache_expiration_days),
            sources_dir: env::var("SOURCES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.sources_dir),
            fetch_timeout_secs: parse_var("FETCH_TIMEOUT_SECS")
                .unwrap_or(defaults.fetch_timeout_secs),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_dir: None,
            cache_quota_bytes: DEFAULT_QUOTA_BYTES,
            cache_expiration_days: 7,
            sources_dir: PathBuf::from("./sources"),
            fetch_timeout_secs: 30,
            cleanup_interval: 3600,
        }
    }
}
