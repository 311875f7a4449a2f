//! # Dataset Store
//!
//! Flat-file checkpoints of the working table. Every write is a full re-export of
//! the table at that stage; missing values are empty cells.

use chrono::{DateTime, Utc};
use csv::StringRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::error::{Result, ScraperError};
use crate::types::{
    columns, CareerStats, FieldSet, PlayerLink, PlayerRecord, RawPlayerRow, StatCode, TeamId,
};

const BIO_COLUMNS: [&str; 7] = [
    columns::NAME,
    columns::POSITION,
    columns::AGE,
    columns::HEIGHT,
    columns::WEIGHT,
    columns::SCHOOL,
    columns::SALARY,
];

/// Header of the cleaned checkpoint, in column order
pub fn cleaned_header() -> Vec<&'static str> {
    let mut header = vec![
        "name",
        "position",
        "age",
        "height_inches",
        "weight_lbs",
        "school",
        "salary",
        "team",
        "external_id",
        "detail_url",
    ];
    header.extend(StatCode::ALL.iter().map(|code| code.label()));
    header.push("assist_turnover_ratio");
    header
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Union of career field names across rows, stat codes appended when never scraped
fn career_columns(rows: &[RawPlayerRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    let scraped =
        rows.iter().filter_map(|row| row.career.as_ref()).flat_map(|fields| fields.keys());
    let defaults = StatCode::ALL.iter().map(|code| code.label());
    for name in scraped.chain(defaults) {
        if !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    columns
}

fn opt_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// JSON form of the cleaned table
#[derive(Serialize)]
struct CleanedSnapshot<'a> {
    scraped_at: DateTime<Utc>,
    player_count: usize,
    players: &'a [PlayerRecord],
}

/// Writes and reads the run's checkpoint files
pub struct DatasetStore {
    output: OutputConfig,
}

impl DatasetStore {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    pub fn raw_biographical_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.raw_biographical_file)
    }

    pub fn raw_full_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.raw_full_file)
    }

    pub fn cleaned_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.cleaned_file)
    }

    pub fn json_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.json_file)
    }

    pub fn writes_json(&self) -> bool {
        self.output.write_json
    }

    /// Remove every checkpoint a previous run left behind
    pub fn clear_checkpoints(&self) -> Result<()> {
        for path in [
            self.raw_biographical_path(),
            self.raw_full_path(),
            self.cleaned_path(),
            self.json_path(),
        ] {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed stale checkpoint {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Write into `<file>.tmp` and rename over `path` once complete, so readers never
    /// see a partial file
    fn write_staged(&self, path: &Path, fill: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
        fs::create_dir_all(&self.output.dir)?;
        let staging = staging_path(path);

        if let Err(e) = fill(staging.as_path()) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        fs::rename(&staging, path)?;
        Ok(())
    }

    fn write_csv<I, R>(&self, path: &Path, header: &[&str], records: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: AsRef<[u8]>,
    {
        self.write_staged(path, |staging| {
            let mut writer = csv::Writer::from_path(staging)?;
            writer.write_record(header)?;
            for record in records {
                writer.write_record(record)?;
            }
            writer.flush()?;
            Ok(())
        })
    }

    fn raw_record(row: &RawPlayerRow, career_columns: Option<&[String]>) -> Vec<String> {
        let mut record = vec![row.team.to_string()];
        record.extend(BIO_COLUMNS.iter().map(|c| row.bio_field(c).unwrap_or_default().to_string()));
        record.push(row.link.as_ref().map(|l| l.external_id.clone()).unwrap_or_default());
        record.push(row.link.as_ref().map(|l| l.detail_url.clone()).unwrap_or_default());
        if let Some(columns) = career_columns {
            let career = row.career.as_ref();
            record.extend(columns.iter().map(|c| {
                career.and_then(|fields| fields.get(c)).unwrap_or_default().to_string()
            }));
        }
        record
    }

    fn write_raw(
        &self,
        path: PathBuf,
        rows: &[RawPlayerRow],
        career_columns: Option<&[String]>,
    ) -> Result<PathBuf> {
        let mut header = vec!["team"];
        header.extend(BIO_COLUMNS);
        header.extend(["id", "url"]);
        if let Some(columns) = career_columns {
            header.extend(columns.iter().map(String::as_str));
        }

        let records = rows.iter().map(|row| Self::raw_record(row, career_columns));
        self.write_csv(&path, &header, records)?;

        info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path)
    }

    /// Checkpoint 1: biographical rows joined with identifiers
    pub fn write_raw_biographical(&self, rows: &[RawPlayerRow]) -> Result<PathBuf> {
        self.write_raw(self.raw_biographical_path(), rows, None)
    }

    /// Checkpoint 2: every column as scraped text, after the career join. Career columns
    /// are every scraped career header in first-seen order, then any stat code no row had.
    pub fn write_raw_full(&self, rows: &[RawPlayerRow]) -> Result<PathBuf> {
        let columns = career_columns(rows);
        self.write_raw(self.raw_full_path(), rows, Some(&columns))
    }

    /// Checkpoint 3: the typed table
    pub fn write_cleaned(&self, records: &[PlayerRecord]) -> Result<PathBuf> {
        let path = self.cleaned_path();
        let rows = records.iter().map(|record| {
            let mut cells = vec![
                record.name.clone(),
                record.position.clone(),
                record.age.to_string(),
                opt_cell(record.height_inches),
                opt_cell(record.weight_lbs),
                record.school.clone(),
                record.salary.to_string(),
                record.team.to_string(),
                record.external_id.clone().unwrap_or_default(),
                record.detail_url.clone().unwrap_or_default(),
            ];
            cells.extend(StatCode::ALL.iter().map(|code| opt_cell(record.stat(*code))));
            cells.push(opt_cell(record.assist_turnover_ratio));
            cells
        });
        self.write_csv(&path, &cleaned_header(), rows)?;

        info!("Wrote {} cleaned records to {}", records.len(), path.display());
        Ok(path)
    }

    /// Pretty JSON snapshot of the cleaned table
    pub fn write_json(&self, records: &[PlayerRecord]) -> Result<PathBuf> {
        let path = self.json_path();

        let snapshot = CleanedSnapshot {
            scraped_at: Utc::now(),
            player_count: records.len(),
            players: records,
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        self.write_staged(&path, |staging| Ok(fs::write(staging, json)?))?;

        info!("Saved {} players to {}", records.len(), path.display());
        Ok(path)
    }

    /// Read a cleaned checkpoint back into records
    pub fn load_cleaned(path: impl AsRef<Path>) -> Result<Vec<PlayerRecord>> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let index: HashMap<String, usize> =
            reader.headers()?.iter().enumerate().map(|(i, h)| (h.to_string(), i)).collect();

        for column in cleaned_header() {
            if !index.contains_key(column) {
                return Err(ScraperError::config(format!(
                    "{} is missing column '{}'",
                    path.as_ref().display(),
                    column
                )));
            }
        }

        let mut records = Vec::new();
        for row in reader.records() {
            records.push(CleanedRow { row: row?, index: &index }.into_record()?);
        }
        Ok(records)
    }
}

struct CleanedRow<'a> {
    row: StringRecord,
    index: &'a HashMap<String, usize>,
}

impl CleanedRow<'_> {
    fn text(&self, column: &str) -> &str {
        self.index.get(column).and_then(|i| self.row.get(*i)).unwrap_or_default()
    }

    fn optional(&self, column: &str) -> Option<&str> {
        Some(self.text(column)).filter(|v| !v.is_empty())
    }

    fn float(&self, column: &str) -> Result<Option<f64>> {
        self.optional(column)
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| ScraperError::coercion(self.text("name"), column, v))
            })
            .transpose()
    }

    fn into_record(self) -> Result<PlayerRecord> {
        let age = self
            .text("age")
            .parse::<u32>()
            .map_err(|_| ScraperError::coercion(self.text("name"), "age", self.text("age")))?;

        let mut career_stats = CareerStats::default();
        for code in StatCode::ALL {
            if let Some(value) = self.float(code.label())? {
                career_stats.set(code, value);
            }
        }

        let link = match (self.optional("external_id"), self.optional("detail_url")) {
            (Some(id), Some(url)) => {
                Some(PlayerLink { external_id: id.to_string(), detail_url: url.to_string() })
            }
            _ => None,
        };

        Ok(PlayerRecord {
            name: self.text("name").to_string(),
            position: self.text("position").to_string(),
            age,
            height_inches: self.float("height_inches")?,
            weight_lbs: self.float("weight_lbs")?,
            school: self.text("school").to_string(),
            salary: self.float("salary")?.unwrap_or(0.0),
            team: TeamId::new(self.text("team")),
            external_id: link.as_ref().map(|l| l.external_id.clone()),
            detail_url: link.map(|l| l.detail_url),
            career_stats,
            assist_turnover_ratio: self.float("assist_turnover_ratio")?,
        })
    }
}
