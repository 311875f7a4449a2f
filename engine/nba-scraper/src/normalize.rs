//! Field Normalizer: scraped text -> typed [`PlayerRecord`]s.
//!
//! | field  | source            | rule                                     |
//! |--------|-------------------|------------------------------------------|
//! | salary | `$1,669,178`/`--` | digits only, `--` is 0                   |
//! | age    | `24`/`--`         | integer, `--` is 0                       |
//! | height | `6' 10"`          | 12 * feet + inches                       |
//! | weight | `220 lbs`         | leading number                           |
//! | stats  | `14.2`            | float, anything unparsable is fatal      |
//!
//! Unparsable values abort the whole normalisation: a value that does not fit these
//! rules means the upstream markup changed and the extraction rules need updating.

use tracing::info;

use crate::error::{Result, ScraperError};
use crate::types::{columns, CareerStats, PlayerRecord, RawPlayerRow, StatCode, SENTINEL};

pub fn parse_salary(value: &str) -> Option<f64> {
    let value = value.trim();
    if value == SENTINEL {
        return Some(0.0);
    }
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<f64>().ok()
}

pub fn parse_age(value: &str) -> Option<u32> {
    let value = value.trim();
    if value == SENTINEL {
        return Some(0);
    }
    value.parse().ok()
}

/// `6' 10"` -> 82.0
pub fn parse_height(value: &str) -> Option<f64> {
    let mut parts = value.split_whitespace();
    let feet: f64 = parts.next()?.trim_end_matches('\'').parse().ok()?;
    let inches: f64 = parts.next()?.trim_end_matches('"').parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(12.0 * feet + inches)
}

/// `220 lbs` -> 220.0
pub fn parse_weight(value: &str) -> Option<f64> {
    value.split_whitespace().next()?.parse().ok()
}

/// Present-and-reported text of a biographical column
fn reported<'a>(row: &'a RawPlayerRow, column: &str) -> Option<&'a str> {
    row.bio_field(column).map(str::trim).filter(|v| !v.is_empty() && *v != SENTINEL)
}

fn coerce<T>(row: &RawPlayerRow, field: &str, value: &str, parsed: Option<T>) -> Result<T> {
    parsed.ok_or_else(|| ScraperError::coercion(&row.name, field, value))
}

/// Convert one joined row; the career stats map holds only codes the row carries
pub fn normalize_row(row: &RawPlayerRow) -> Result<PlayerRecord> {
    let salary = match row.bio_field(columns::SALARY) {
        Some(v) => coerce(row, columns::SALARY, v, parse_salary(v))?,
        None => 0.0,
    };

    let age = match row.bio_field(columns::AGE) {
        Some(v) => coerce(row, columns::AGE, v, parse_age(v))?,
        None => 0,
    };

    let height_inches = reported(row, columns::HEIGHT)
        .map(|v| coerce(row, columns::HEIGHT, v, parse_height(v)))
        .transpose()?;

    let weight_lbs = reported(row, columns::WEIGHT)
        .map(|v| coerce(row, columns::WEIGHT, v, parse_weight(v)))
        .transpose()?;

    let mut career_stats = CareerStats::default();
    for code in StatCode::ALL {
        if let Some(value) = row.career_field(code) {
            let parsed = value.trim().parse::<f64>().ok();
            career_stats.set(code, coerce(row, code.label(), value, parsed)?);
        }
    }
    let assist_turnover_ratio = career_stats.assist_turnover_ratio();

    Ok(PlayerRecord {
        name: row.name.clone(),
        position: row.bio_field(columns::POSITION).unwrap_or_default().to_string(),
        age,
        height_inches,
        weight_lbs,
        school: reported(row, columns::SCHOOL).unwrap_or(SENTINEL).to_string(),
        salary,
        team: row.team.clone(),
        external_id: row.link.as_ref().map(|l| l.external_id.clone()),
        detail_url: row.link.as_ref().map(|l| l.detail_url.clone()),
        career_stats,
        assist_turnover_ratio,
    })
}

/// Convert every row, stopping at the first value that cannot be coerced
pub fn normalize(rows: &[RawPlayerRow]) -> Result<Vec<PlayerRecord>> {
    let records = rows.iter().map(normalize_row).collect::<Result<Vec<_>>>()?;
    info!("Normalized {} player records", records.len());
    Ok(records)
}
