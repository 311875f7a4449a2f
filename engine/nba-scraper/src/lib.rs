//! # NBA Scraper
//!
//! Scrapes every NBA roster and each player's career averages, reconciles them
//! into one row per player and exports cleaned, typed checkpoints.
//!
//! ## Architecture
//!
//! - **MarkupFetcher**: page source (`HttpFetcher`, optionally wrapped in `RetryingFetcher`)
//! - **Extraction**: `RowSchema` / `LabeledRowSchema` over parsed markup
//! - **Collectors**: team directory, rosters, career stats (bounded concurrency)
//! - **Reconcile + Normalize**: join on (team, name), then type every field
//! - **DatasetStore**: raw biographical, raw full and cleaned CSV checkpoints

pub mod career;
pub mod config;
pub mod directory;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod roster;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::ScraperConfig;
pub use error::{FetchError, Result, ScraperError};
pub use fetcher::{HttpFetcher, MarkupFetcher, RetryPolicy, RetryingFetcher};
pub use pipeline::{Pipeline, RunSummary};
pub use store::DatasetStore;
pub use types::{CareerStats, PlayerRecord, StatCode, TeamId};
