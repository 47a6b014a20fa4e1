//! Application configuration.
//!
//! Configuration is read from a TOML file (every key optional) and then
//! overridden by environment variables:
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//! query_timeout_secs = 30
//!
//! [repository]
//! type = "local"
//!
//! [limits]
//! default_lookback_days = 15
//! max_window_days = 32
//! query_limit = 100000
//! result_limit = 1000
//!
//! [distribution]
//! parallel_buckets = false
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`, `PORT`: bind address
//! - `REPOSITORY_TYPE`: store backend (`local`)
//! - `OSEM_QUERY_TIMEOUT_SECS`: per-request timeout for engine calls
//! - `OSEM_DEFAULT_LOOKBACK_DAYS`: default data window when `from-date` is omitted

use chrono::Duration;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::db::repository::RepositoryError;
use crate::services::downsampling::Downsampler;
use crate::services::error::{AnalyticsError, AnalyticsResult};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub limits: SamplingPolicy,
    #[serde(default)]
    pub distribution: DistributionSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on one engine call; the engines themselves never time out.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_query_timeout_secs() -> u64 {
    30
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl ServerSettings {
    pub fn query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.query_timeout_secs)
    }
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
}

fn default_repo_type() -> String {
    "local".to_string()
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
        }
    }
}

/// Limits applied when serving raw time series.
///
/// The default lookback is 15 days. Older API documentation promised the
/// last 24 hours; clients relying on that must pass `from-date` explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingPolicy {
    /// Window used when the request omits `from-date`, counted back from `to-date`.
    #[serde(default = "default_lookback_days")]
    pub default_lookback_days: i64,
    /// Widest window a request may ask for.
    #[serde(default = "default_max_window_days")]
    pub max_window_days: i64,
    /// Maximum raw rows fetched from the store per request.
    #[serde(default = "default_query_limit")]
    pub query_limit: usize,
    /// Maximum points returned to the client per request.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
}

fn default_lookback_days() -> i64 {
    15
}

fn default_max_window_days() -> i64 {
    32
}

fn default_query_limit() -> usize {
    100_000
}

fn default_result_limit() -> usize {
    1000
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            default_lookback_days: default_lookback_days(),
            max_window_days: default_max_window_days(),
            query_limit: default_query_limit(),
            result_limit: default_result_limit(),
        }
    }
}

/// Upper bound for any day-based limit; keeps every derived instant inside
/// chrono's representable range.
pub const MAX_LIMIT_DAYS: i64 = 36_500;

impl SamplingPolicy {
    /// `None` when the configured day count does not fit a `Duration`.
    pub fn default_lookback(&self) -> Option<Duration> {
        Duration::try_days(self.default_lookback_days)
    }

    pub fn max_window(&self) -> Option<Duration> {
        Duration::try_days(self.max_window_days)
    }
}

/// Distribution analyzer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionSettings {
    /// Issue the per-bucket queries concurrently instead of one after another.
    /// Bucket order and all-or-nothing failure are kept either way.
    #[serde(default)]
    pub parallel_buckets: bool,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(AppConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `osem.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("osem.toml"),
            PathBuf::from("backend/osem.toml"),
            PathBuf::from("../osem.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No osem.toml found in standard locations",
        ))
    }

    /// Configuration for a server process: the default file when present
    /// (defaults otherwise), then environment overrides.
    pub fn load() -> Result<Self, RepositoryError> {
        let has_file = ["osem.toml", "backend/osem.toml", "../osem.toml"]
            .iter()
            .any(|p| Path::new(p).exists());
        let mut config = if has_file {
            Self::from_default_location()?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override settings from environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse("PORT") {
            self.server.port = port;
        }
        if let Ok(repo_type) = std::env::var("REPOSITORY_TYPE") {
            self.repository.repo_type = repo_type;
        }
        if let Some(secs) = env_parse("OSEM_QUERY_TIMEOUT_SECS") {
            self.server.query_timeout_secs = secs;
        }
        if let Some(days) = env_parse("OSEM_DEFAULT_LOOKBACK_DAYS") {
            self.limits.default_lookback_days = days;
        }
    }

    /// Reject limits the engines would refuse at request time.
    pub fn validate(&self) -> AnalyticsResult<()> {
        Downsampler::new(self.limits.query_limit, self.limits.result_limit)?;
        if !(0..=MAX_LIMIT_DAYS).contains(&self.limits.default_lookback_days) {
            return Err(AnalyticsError::Range(format!(
                "default_lookback_days must be between 0 and {}",
                MAX_LIMIT_DAYS
            )));
        }
        if !(1..=MAX_LIMIT_DAYS).contains(&self.limits.max_window_days) {
            return Err(AnalyticsError::Range(format!(
                "max_window_days must be between 1 and {}",
                MAX_LIMIT_DAYS
            )));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_documented_limits() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.repository.repo_type, "local");
        assert_eq!(config.limits.default_lookback(), Some(Duration::days(15)));
        assert_eq!(config.limits.max_window(), Some(Duration::days(32)));
        assert_eq!(config.limits.query_limit, 100_000);
        assert_eq!(config.limits.result_limit, 1000);
        assert!(!config.distribution.parallel_buckets);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [limits]
            result_limit = 500

            [distribution]
            parallel_buckets = true
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.result_limit, 500);
        assert_eq!(config.limits.query_limit, 100_000);
        assert!(config.distribution.parallel_buckets);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9100\n\n[repository]\ntype = \"memory\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.repository.repo_type, "memory");
    }

    #[test]
    fn test_from_missing_file_is_configuration_error() {
        let err = AppConfig::from_file("/nonexistent/osem.toml").unwrap_err();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let err = AppConfig::from_toml_str("[limits\nresult_limit = ").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_validate_rejects_inconsistent_limits() {
        let mut config = AppConfig::default();
        config.limits.result_limit = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.limits.query_limit = 10;
        config.limits.result_limit = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_day_limits() {
        for (lookback, window) in [
            (-1, 32),
            (i64::MAX, 32),
            (MAX_LIMIT_DAYS + 1, 32),
            (15, 0),
            (15, i64::MAX),
        ] {
            let mut config = AppConfig::default();
            config.limits.default_lookback_days = lookback;
            config.limits.max_window_days = window;
            assert!(
                matches!(config.validate(), Err(AnalyticsError::Range(_))),
                "lookback={} window={}",
                lookback,
                window
            );
        }

        let mut config = AppConfig::default();
        config.limits.default_lookback_days = MAX_LIMIT_DAYS;
        config.limits.max_window_days = 1;
        assert!(config.validate().is_ok());
    }
}
