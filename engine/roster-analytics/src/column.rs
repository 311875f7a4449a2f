use nba_scraper::{PlayerRecord, StatCode};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyticsError;

/// A numeric column of the cleaned table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    Age,
    Height,
    Weight,
    Salary,
    Stat(StatCode),
    AssistTurnoverRatio,
}

impl NumericColumn {
    /// Age, height, weight, salary, the twelve career stats, then the ratio
    pub fn all() -> Vec<NumericColumn> {
        let mut columns = vec![Self::Age, Self::Height, Self::Weight, Self::Salary];
        columns.extend(StatCode::ALL.into_iter().map(Self::Stat));
        columns.push(Self::AssistTurnoverRatio);
        columns
    }

    /// Header name in the cleaned checkpoint
    pub fn name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Height => "height_inches",
            Self::Weight => "weight_lbs",
            Self::Salary => "salary",
            Self::Stat(code) => code.label(),
            Self::AssistTurnoverRatio => "assist_turnover_ratio",
        }
    }

    pub fn value(self, record: &PlayerRecord) -> Option<f64> {
        match self {
            Self::Age => Some(record.age as f64),
            Self::Height => record.height_inches,
            Self::Weight => record.weight_lbs,
            Self::Salary => Some(record.salary),
            Self::Stat(code) => record.stat(code),
            Self::AssistTurnoverRatio => record.assist_turnover_ratio,
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericColumn {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AnalyticsError::UnknownColumn(s.to_string()))
    }
}
