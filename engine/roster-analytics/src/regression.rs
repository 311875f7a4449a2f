//! Least-squares fits of one column on another.
//!
//! Polynomial fits solve the normal equations `(XᵀX) b = Xᵀy` by Gaussian
//! elimination with partial pivoting; a linear fit is the degree-1 case.

use nba_scraper::PlayerRecord;

use crate::column::NumericColumn;
use crate::correlation::complete_rows;
use crate::error::{AnalyticsError, Result};

const PIVOT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct RegressionFit {
    pub x: NumericColumn,
    pub y: NumericColumn,
    /// Intercept first, then ascending powers of `x`
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    pub observations: usize,
}

impl RegressionFit {
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }
}

/// Solve `a · b = rhs` in place; `a` is `n × n` row-major
fn solve(mut a: Vec<f64>, mut rhs: Vec<f64>) -> Result<Vec<f64>> {
    let n = rhs.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i * n + col].abs().total_cmp(&a[j * n + col].abs()))
            .unwrap_or(col);
        if a[pivot * n + col].abs() < PIVOT_EPSILON {
            return Err(AnalyticsError::Singular);
        }
        if pivot != col {
            for k in 0..n {
                a.swap(col * n + k, pivot * n + k);
            }
            rhs.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[row * n + col] / a[col * n + col];
            for k in col..n {
                a[row * n + k] -= factor * a[col * n + k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row * n + k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / a[row * n + row];
    }
    Ok(solution)
}

/// Fit `y = b0 + b1·x + … + bd·x^d` over rows where both columns are present and finite
pub fn fit_polynomial(
    records: &[PlayerRecord],
    x: NumericColumn,
    y: NumericColumn,
    degree: usize,
) -> Result<RegressionFit> {
    if degree == 0 {
        return Err(AnalyticsError::InvalidDegree(degree));
    }

    let rows = complete_rows(records, &[x, y]);
    let terms = degree + 1;
    if rows.len() <= terms {
        return Err(AnalyticsError::InsufficientData { needed: terms + 1, found: rows.len() });
    }

    let mut xtx = vec![0.0; terms * terms];
    let mut xty = vec![0.0; terms];
    for row in &rows {
        let powers: Vec<f64> = (0..terms).map(|p| row[0].powi(p as i32)).collect();
        for i in 0..terms {
            xty[i] += powers[i] * row[1];
            for j in 0..terms {
                xtx[i * terms + j] += powers[i] * powers[j];
            }
        }
    }

    let coefficients = solve(xtx, xty)?;
    let mut fit = RegressionFit { x, y, coefficients, r_squared: 0.0, observations: rows.len() };

    let mean_y = rows.iter().map(|r| r[1]).sum::<f64>() / rows.len() as f64;
    let ss_tot: f64 = rows.iter().map(|r| (r[1] - mean_y).powi(2)).sum();
    let ss_res: f64 = rows.iter().map(|r| (r[1] - fit.predict(r[0])).powi(2)).sum();
    fit.r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    Ok(fit)
}

pub fn fit_linear(
    records: &[PlayerRecord],
    x: NumericColumn,
    y: NumericColumn,
) -> Result<RegressionFit> {
    fit_polynomial(records, x, y, 1)
}
