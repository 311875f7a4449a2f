use nba_scraper::PlayerRecord;

use crate::column::NumericColumn;
use crate::error::{AnalyticsError, Result};

/// Pearson correlation between every pair of the chosen columns
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    /// Complete rows used after dropping incomplete ones
    pub observations: usize,
    /// Row-major, `columns.len()` squared; NaN where a column is constant
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: NumericColumn, b: NumericColumn) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        Some(self.values[i * self.columns.len() + j])
    }
}

/// Rows where every chosen column is present and finite
pub(crate) fn complete_rows(records: &[PlayerRecord], columns: &[NumericColumn]) -> Vec<Vec<f64>> {
    records
        .iter()
        .filter_map(|record| {
            columns
                .iter()
                .map(|c| c.value(record).filter(|v| v.is_finite()))
                .collect::<Option<Vec<f64>>>()
        })
        .collect()
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Listwise deletion, then pairwise Pearson coefficients
pub fn correlation_matrix(
    records: &[PlayerRecord],
    columns: &[NumericColumn],
) -> Result<CorrelationMatrix> {
    let rows = complete_rows(records, columns);
    if rows.len() < 2 {
        return Err(AnalyticsError::InsufficientData { needed: 2, found: rows.len() });
    }

    let series: Vec<Vec<f64>> =
        (0..columns.len()).map(|j| rows.iter().map(|row| row[j]).collect()).collect();

    let k = columns.len();
    let mut values = vec![0.0; k * k];
    for i in 0..k {
        for j in i..k {
            let r = pearson(&series[i], &series[j]);
            values[i * k + j] = r;
            values[j * k + i] = r;
        }
    }

    Ok(CorrelationMatrix { columns: columns.to_vec(), observations: rows.len(), values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::player;
    use nba_scraper::StatCode;

    #[test]
    fn test_perfectly_linear_columns_correlate() {
        let records = vec![
            player("t", 20, 1.0, Some(10.0)),
            player("t", 25, 2.0, Some(20.0)),
            player("t", 30, 3.0, Some(30.0)),
            player("t", 35, 4.0, None),
        ];
        let points = NumericColumn::Stat(StatCode::Points);
        let minutes = NumericColumn::Stat(StatCode::Minutes);

        let matrix = correlation_matrix(&records, &[points, minutes, NumericColumn::Age]).unwrap();

        assert_eq!(matrix.observations, 3);
        assert!((matrix.get(points, minutes).unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get(NumericColumn::Age, points).unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get(points, points).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_complete_rows() {
        let records = vec![player("t", 20, 1.0, Some(10.0)), player("t", 21, 1.0, None)];
        let err =
            correlation_matrix(&records, &[NumericColumn::Stat(StatCode::Points)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { found: 1, .. }));
    }
}
