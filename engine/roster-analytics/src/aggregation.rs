//! # Team Aggregation
//!
//! Per-team descriptive statistics. Nulls are skipped column by column; non-finite
//! values (zero-turnover ratios) are kept and propagate into the mean.

use nba_scraper::{PlayerRecord, TeamId};
use std::collections::BTreeMap;

use crate::column::NumericColumn;

/// Mean and population standard deviation of one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl ColumnStats {
    /// `None` for an empty slice
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self { count: values.len(), mean, std_dev: variance.sqrt() })
    }
}

#[derive(Debug, Clone)]
pub struct TeamSummary {
    pub team: TeamId,
    pub players: usize,
    /// One entry per requested column; `None` when no player reports it
    pub columns: Vec<(NumericColumn, Option<ColumnStats>)>,
}

impl TeamSummary {
    pub fn get(&self, column: NumericColumn) -> Option<ColumnStats> {
        self.columns.iter().find(|(c, _)| *c == column).and_then(|(_, stats)| *stats)
    }
}

/// Group by team (ordered by team id) and summarise each column
pub fn team_summary(records: &[PlayerRecord], columns: &[NumericColumn]) -> Vec<TeamSummary> {
    let mut by_team: BTreeMap<&TeamId, Vec<&PlayerRecord>> = BTreeMap::new();
    for record in records {
        by_team.entry(&record.team).or_default().push(record);
    }

    by_team
        .into_iter()
        .map(|(team, players)| {
            let columns = columns
                .iter()
                .map(|column| {
                    let values: Vec<f64> = players.iter().filter_map(|p| column.value(p)).collect();
                    (*column, ColumnStats::from_values(&values))
                })
                .collect();
            TeamSummary { team: team.clone(), players: players.len(), columns }
        })
        .collect()
}
