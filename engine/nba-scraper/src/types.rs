use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Column labels of the roster table as the site renders them
pub mod columns {
    pub const NAME: &str = "Name";
    pub const POSITION: &str = "POS";
    pub const AGE: &str = "Age";
    pub const HEIGHT: &str = "HT";
    pub const WEIGHT: &str = "WT";
    pub const SCHOOL: &str = "College";
    pub const SALARY: &str = "Salary";
}

/// Placeholder the site shows for a value it does not report
pub const SENTINEL: &str = "--";

/// Stable key for a franchise, taken from the roster URL slug (e.g. "boston-celtics")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered column name -> text mapping for one extracted row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldSet {
    fields: Vec<(String, String)>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing the value in place if the key already exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Career-average statistics carried into the cleaned table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatCode {
    #[serde(rename = "GP")]
    GamesPlayed,
    #[serde(rename = "MIN")]
    Minutes,
    #[serde(rename = "FG%")]
    FieldGoalPct,
    #[serde(rename = "3P%")]
    ThreePointPct,
    #[serde(rename = "FT%")]
    FreeThrowPct,
    #[serde(rename = "REB")]
    Rebounds,
    #[serde(rename = "AST")]
    Assists,
    #[serde(rename = "BLK")]
    Blocks,
    #[serde(rename = "STL")]
    Steals,
    #[serde(rename = "PF")]
    PersonalFouls,
    #[serde(rename = "TO")]
    Turnovers,
    #[serde(rename = "PTS")]
    Points,
}

impl StatCode {
    pub const ALL: [StatCode; 12] = [
        StatCode::GamesPlayed,
        StatCode::Minutes,
        StatCode::FieldGoalPct,
        StatCode::ThreePointPct,
        StatCode::FreeThrowPct,
        StatCode::Rebounds,
        StatCode::Assists,
        StatCode::Blocks,
        StatCode::Steals,
        StatCode::PersonalFouls,
        StatCode::Turnovers,
        StatCode::Points,
    ];

    /// Column header used by the stats card and the checkpoints
    pub fn label(self) -> &'static str {
        match self {
            StatCode::GamesPlayed => "GP",
            StatCode::Minutes => "MIN",
            StatCode::FieldGoalPct => "FG%",
            StatCode::ThreePointPct => "3P%",
            StatCode::FreeThrowPct => "FT%",
            StatCode::Rebounds => "REB",
            StatCode::Assists => "AST",
            StatCode::Blocks => "BLK",
            StatCode::Steals => "STL",
            StatCode::PersonalFouls => "PF",
            StatCode::Turnovers => "TO",
            StatCode::Points => "PTS",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.label() == label)
    }
}

impl fmt::Display for StatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed career averages; a code is absent when the player has no career row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CareerStats(BTreeMap<StatCode, f64>);

impl CareerStats {
    pub fn get(&self, code: StatCode) -> Option<f64> {
        self.0.get(&code).copied()
    }

    pub fn set(&mut self, code: StatCode, value: f64) {
        self.0.insert(code, value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Assists per turnover. `None` when either input is missing; non-finite when turnovers is 0.
    pub fn assist_turnover_ratio(&self) -> Option<f64> {
        Some(self.get(StatCode::Assists)? / self.get(StatCode::Turnovers)?)
    }
}

/// Site identifier and detail page of one player, read from the roster row link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLink {
    pub external_id: String,
    pub detail_url: String,
}

/// Reconciliation key. Names are only unique within a roster, so the team is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerKey {
    pub team: TeamId,
    pub name: String,
}

impl PlayerKey {
    pub fn new(team: &TeamId, name: &str) -> Self {
        Self { team: team.clone(), name: name.to_string() }
    }
}

/// One reconciled player with every value still as scraped text
#[derive(Debug, Clone, PartialEq)]
pub struct RawPlayerRow {
    pub team: TeamId,
    pub name: String,
    pub bio: FieldSet,
    pub link: Option<PlayerLink>,
    /// `None` until the career join; an empty set means no career row was found
    pub career: Option<FieldSet>,
}

impl RawPlayerRow {
    pub fn key(&self) -> PlayerKey {
        PlayerKey::new(&self.team, &self.name)
    }

    pub fn bio_field(&self, column: &str) -> Option<&str> {
        self.bio.get(column)
    }

    pub fn career_field(&self, code: StatCode) -> Option<&str> {
        self.career.as_ref().and_then(|career| career.get(code.label()))
    }
}

/// Canonical cleaned player entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub position: String,
    /// 0 when not reported
    pub age: u32,
    pub height_inches: Option<f64>,
    pub weight_lbs: Option<f64>,
    /// "--" when not reported
    pub school: String,
    /// 0 when not listed
    pub salary: f64,
    pub team: TeamId,
    pub external_id: Option<String>,
    pub detail_url: Option<String>,
    pub career_stats: CareerStats,
    pub assist_turnover_ratio: Option<f64>,
}

impl PlayerRecord {
    pub fn stat(&self, code: StatCode) -> Option<f64> {
        self.career_stats.get(code)
    }
}
