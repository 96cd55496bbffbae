//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and fetch behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Batch and source settings
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Fixture document extraction switches
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// File locations, relative to the storage directory
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if the file does not exist.
    ///
    /// A file that exists but does not parse is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config not found at {:?}. Using defaults.", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.harvest.batch_size == 0 {
            return Err(AppError::validation("harvest.batch_size must be > 0"));
        }
        url::Url::parse(&self.harvest.fixture_base_url).map_err(|e| {
            AppError::validation(format!("harvest.fixture_base_url is not a URL: {e}"))
        })?;
        Ok(())
    }
}

/// HTTP client and fetch retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Extra attempts after a timeout or connection failure
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Fixed delay between retry attempts in seconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_secs: u64,

    /// Delay between fixture requests in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_retries: defaults::max_retries(),
            retry_delay_secs: defaults::retry_delay(),
            request_delay_ms: 0,
        }
    }
}

/// Batch sizing and fixture source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Seasons processed per controller step
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Origin that fixture hrefs from listing pages are relative to
    #[serde(default = "defaults::fixture_base_url")]
    pub fixture_base_url: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::batch_size(),
            fixture_base_url: defaults::fixture_base_url(),
        }
    }
}

/// Extraction switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Fill `draw_odds` from the last 1X2 price cell (same cell as `aw_odds`).
    ///
    /// Historical output was produced this way; kept on until the intended
    /// mapping is confirmed.
    #[serde(default = "defaults::legacy_draw_price")]
    pub legacy_draw_price: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            legacy_draw_price: defaults::legacy_draw_price(),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::leagues_file")]
    pub leagues_file: String,

    #[serde(default = "defaults::state_file")]
    pub state_file: String,

    #[serde(default = "defaults::errors_file")]
    pub errors_file: String,

    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,
}

impl PathsConfig {
    /// Resolve the leagues file against a storage directory.
    pub fn leagues_path(&self, root: &Path) -> PathBuf {
        root.join(&self.leagues_file)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            leagues_file: defaults::leagues_file(),
            state_file: defaults::state_file(),
            errors_file: defaults::errors_file(),
            output_dir: defaults::output_dir(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0".into()
    }

    pub fn timeout() -> u64 {
        10
    }

    pub fn max_retries() -> u32 {
        3
    }

    pub fn retry_delay() -> u64 {
        2
    }

    // Harvest defaults
    pub fn batch_size() -> usize {
        3
    }

    pub fn fixture_base_url() -> String {
        "https://www.primatips.com".into()
    }

    pub fn legacy_draw_price() -> bool {
        true
    }

    // Paths
    pub fn leagues_file() -> String {
        "leagues.json".into()
    }

    pub fn state_file() -> String {
        "state.json".into()
    }

    pub fn errors_file() -> String {
        "errors.json".into()
    }

    pub fn output_dir() -> String {
        "historical".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.harvest.batch_size, 3);
        assert_eq!(config.crawler.max_retries, 3);
        assert_eq!(config.crawler.retry_delay_secs, 2);
        assert!(config.extraction.legacy_draw_price);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config: Config = toml::from_str(
            r#"
            [harvest]
            batch_size = 5

            [paths]
            output_dir = "out"
            "#,
        )
        .unwrap();
        assert_eq!(config.harvest.batch_size, 5);
        assert_eq!(config.paths.output_dir, "out");
        assert_eq!(config.paths.state_file, "state.json");
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = Config::default();
        config.harvest.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/config.toml").unwrap();
        assert_eq!(config.crawler.timeout_secs, 10);
    }
}
