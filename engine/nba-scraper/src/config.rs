//! # Configuration Management
//!
//! Configuration for a scrape run: where the pages live, how they are extracted,
//! how hard the HTTP layer tries, and where the checkpoints land.

use crate::error::{Result, ScraperError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Heuristic upper bound on roster size. Row positions at or beyond this are never scanned.
pub const DEFAULT_MAX_ROSTER_ROWS: usize = 30;

/// Default cap on concurrent player detail fetches
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Main configuration for the scraper
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScraperConfig {
    /// Upstream site layout
    pub source: SourceConfig,
    /// Extraction rules
    pub extraction: ExtractionConfig,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Checkpoint output configuration
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Scheme + host every relative link is resolved against
    pub base_url: String,
    /// Path of the league landing page listing all teams
    pub landing_path: String,
    /// Path prefix of roster links, followed by `<code>/<slug>`
    pub roster_path_prefix: String,
    /// Path prefix of player detail links, followed by `<id>/<slug>`
    pub player_path_prefix: String,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.espn.com".to_string(),
            landing_path: "/nba/teams".to_string(),
            roster_path_prefix: "/nba/team/roster/_/name/".to_string(),
            player_path_prefix: "/nba/player/_/id/".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of `data-idx` row positions scanned per roster page
    pub max_roster_rows: usize,
    /// First-cell label of the career averages row
    pub career_label: String,
    /// CSS selector of the statistics card on a player page
    pub stats_card_selector: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_roster_rows: DEFAULT_MAX_ROSTER_ROWS,
            career_label: "Career".to_string(),
            stats_card_selector: "section.Card.PlayerStats".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum player detail pages in flight at once
    pub concurrency: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30, concurrency: DEFAULT_CONCURRENCY }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per URL, including the first
    pub max_attempts: u32,

    /// Initial retry delay in milliseconds
    pub initial_delay_ms: u64,

    /// Maximum retry delay in milliseconds
    pub max_delay_ms: u64,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory all checkpoints are written into
    pub dir: PathBuf,
    /// Biographical rows joined with identifiers, before career stats
    pub raw_biographical_file: String,
    /// All columns as scraped text, after the career stats join
    pub raw_full_file: String,
    /// Typed, sentinel-resolved table with the derived ratio
    pub cleaned_file: String,
    /// Also write the cleaned records as pretty JSON
    pub write_json: bool,
    pub json_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/nba"),
            raw_biographical_file: "raw_biographical.csv".to_string(),
            raw_full_file: "raw_full.csv".to_string(),
            cleaned_file: "cleaned.csv".to_string(),
            write_json: false,
            json_file: "cleaned.json".to_string(),
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| ScraperError::config(format!("{key} is not a number: {value}")))
}

impl ScraperConfig {
    /// Load configuration from a TOML file; absent keys keep their defaults
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ScraperError::config(format!("{}: {e}", path.display())))
    }

    /// Override selected values from `NBA_SCRAPER_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(base_url) = var("NBA_SCRAPER_BASE_URL") {
            self.source.base_url = base_url;
        }

        if let Some(dir) = var("NBA_SCRAPER_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }

        if let Some(value) = var("NBA_SCRAPER_CONCURRENCY") {
            self.http.concurrency = parse_number("NBA_SCRAPER_CONCURRENCY", &value)?;
        }

        if let Some(value) = var("NBA_SCRAPER_MAX_ROSTER_ROWS") {
            self.extraction.max_roster_rows = parse_number("NBA_SCRAPER_MAX_ROSTER_ROWS", &value)?;
        }

        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.http.concurrency == 0 {
            return Err(ScraperError::config("http.concurrency must be at least 1"));
        }
        if self.extraction.max_roster_rows == 0 {
            return Err(ScraperError::config("extraction.max_roster_rows must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ScraperError::config("retry.max_attempts must be at least 1"));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(ScraperError::config("retry.backoff_multiplier must be >= 1.0"));
        }
        url::Url::parse(&self.source.base_url)
            .map_err(|e| ScraperError::config(format!("invalid base_url: {e}")))?;
        Ok(())
    }

    /// Absolute URL of the league landing page
    pub fn landing_url(&self) -> String {
        format!("{}{}", self.source.base_url.trim_end_matches('/'), self.source.landing_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScraperConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction.max_roster_rows, 30);
        assert_eq!(config.landing_url(), "https://www.espn.com/nba/teams");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nconcurrency = 2\n\n[output]\ndir = \"out\"").unwrap();

        let config = ScraperConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.http.concurrency, 2);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.output.cleaned_file, "cleaned.csv");
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = ScraperConfig::default();
        config.http.concurrency = 0;
        assert!(matches!(config.validate(), Err(ScraperError::Config(_))));
    }

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_replace_values() {
        let mut config = ScraperConfig::default();
        config
            .apply_overrides(overrides(&[
                ("NBA_SCRAPER_BASE_URL", "http://localhost:8080"),
                ("NBA_SCRAPER_OUTPUT_DIR", "/tmp/nba"),
                ("NBA_SCRAPER_CONCURRENCY", "3"),
                ("NBA_SCRAPER_MAX_ROSTER_ROWS", " 18 "),
            ]))
            .unwrap();

        assert_eq!(config.source.base_url, "http://localhost:8080");
        assert_eq!(config.output.dir, PathBuf::from("/tmp/nba"));
        assert_eq!(config.http.concurrency, 3);
        assert_eq!(config.extraction.max_roster_rows, 18);
        assert_eq!(config.landing_url(), "http://localhost:8080/nba/teams");
    }

    #[test]
    fn test_env_overrides_absent_keep_defaults() {
        let mut config = ScraperConfig::default();
        config.apply_overrides(overrides(&[])).unwrap();

        assert_eq!(config.source.base_url, "https://www.espn.com");
        assert_eq!(config.http.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.extraction.max_roster_rows, DEFAULT_MAX_ROSTER_ROWS);
    }

    #[test]
    fn test_env_override_rejects_non_numeric_concurrency() {
        let mut config = ScraperConfig::default();
        let err = config
            .apply_overrides(overrides(&[("NBA_SCRAPER_CONCURRENCY", "many")]))
            .unwrap_err();

        assert!(
            matches!(err, ScraperError::Config(ref msg) if msg.contains("NBA_SCRAPER_CONCURRENCY"))
        );
        assert_eq!(config.http.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_env_override_rejects_non_numeric_max_rows() {
        let mut config = ScraperConfig::default();
        let err = config
            .apply_overrides(overrides(&[("NBA_SCRAPER_MAX_ROSTER_ROWS", "-4")]))
            .unwrap_err();

        assert!(matches!(err, ScraperError::Config(ref msg) if msg.contains("not a number")));
    }

    #[test]
    fn test_validate_rejects_zero_max_rows() {
        let mut config = ScraperConfig::default();
        config.extraction.max_roster_rows = 0;
        assert!(matches!(config.validate(), Err(ScraperError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = ScraperConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ScraperError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_shrinking_backoff() {
        let mut config = ScraperConfig::default();
        config.retry.backoff_multiplier = 0.5;
        assert!(matches!(config.validate(), Err(ScraperError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = ScraperConfig::default();
        config.source.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ScraperError::Config(_))));
    }
}
