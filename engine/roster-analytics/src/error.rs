//! Error types for the analytics crate

use thiserror::Error;

/// Result type alias for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Fewer complete observations than the computation needs
    #[error("need at least {needed} complete rows, found {found}")]
    InsufficientData { needed: usize, found: usize },

    /// The normal equations have no unique solution
    #[error("design matrix is singular; predictor has too little variation")]
    Singular,

    #[error("polynomial degree must be at least 1, got {0}")]
    InvalidDegree(usize),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}
