//! # Roster Analytics
//!
//! Descriptive and predictive analysis over the cleaned player table written by
//! `nba-scraper`: per-team aggregates, a correlation matrix and least-squares
//! regression fits.

pub mod aggregation;
pub mod cli;
pub mod column;
pub mod correlation;
pub mod error;
pub mod regression;

pub use aggregation::{team_summary, ColumnStats, TeamSummary};
pub use column::NumericColumn;
pub use correlation::{correlation_matrix, CorrelationMatrix};
pub use error::{AnalyticsError, Result};
pub use regression::{fit_linear, fit_polynomial, RegressionFit};
