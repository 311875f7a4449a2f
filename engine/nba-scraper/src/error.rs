//! Error types for the scraper

use thiserror::Error;

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Failure reaching a page
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, DNS, TLS or body read failure
    #[error("transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// Request exceeded the configured timeout
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout { url: url.to_string() };
        }
        match err.status() {
            Some(status) => Self::Status { url: url.to_string(), status: status.as_u16() },
            None => Self::Transport { url: url.to_string(), message: err.to_string() },
        }
    }
}

/// Errors that abort a scrape run
#[derive(Error, Debug)]
pub enum ScraperError {
    /// A page the pipeline cannot proceed without failed to load
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The landing page had no roster links
    #[error("no team roster links found on {url}")]
    NoTeams { url: String },

    /// Not a single roster row was extracted across the league
    #[error("no roster rows extracted for any team")]
    NoRosterRows,

    /// The same player name appears twice on one roster
    #[error("player name '{name}' appears more than once on the {team} roster")]
    NameCollision { team: String, name: String },

    /// A field expected to be numeric could not be parsed
    #[error("cannot convert {field} value '{value}' for player '{player}'")]
    TypeCoercion { player: String, field: String, value: String },

    /// A CSS selector failed to compile
    #[error("invalid selector '{0}'")]
    Selector(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (checkpoint files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON snapshot errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScraperError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new type coercion error
    pub fn coercion(player: &str, field: &str, value: &str) -> Self {
        Self::TypeCoercion {
            player: player.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
