//! # Command Line Interface
//!
//! CLI over a cleaned player checkpoint.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nba_scraper::{DatasetStore, PlayerRecord};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::aggregation::team_summary;
use crate::column::NumericColumn;
use crate::correlation::correlation_matrix;
use crate::regression::fit_polynomial;

/// Analytics CLI for the cleaned NBA player table
#[derive(Parser)]
#[command(name = "analytics-cli")]
#[command(about = "Team aggregates, correlations and regressions over scraped NBA players")]
pub struct Cli {
    /// Cleaned checkpoint written by scrape_players
    #[arg(short, long, default_value = "data/nba/cleaned.csv")]
    pub data_path: PathBuf,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Per-team player count and column means
    Teams {
        /// Columns to summarise (default: salary, age, PTS, REB, AST)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<NumericColumn>,
    },
    /// Pearson correlation matrix
    Correlate {
        /// Columns to correlate (default: every numeric column)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<NumericColumn>,
    },
    /// Least-squares fit of y on x
    Regress {
        #[arg(long)]
        x: NumericColumn,
        #[arg(long)]
        y: NumericColumn,
        /// 1 for a straight line, higher for a polynomial
        #[arg(long, default_value = "1")]
        degree: usize,
    },
}

/// CLI handler
pub struct CliHandler {
    records: Vec<PlayerRecord>,
}

impl CliHandler {
    /// Load the cleaned table
    pub fn new(data_path: &Path) -> Result<Self> {
        let records = DatasetStore::load_cleaned(data_path)
            .with_context(|| format!("Failed to load {}", data_path.display()))?;
        info!("Loaded {} players from {}", records.len(), data_path.display());
        Ok(Self { records })
    }

    /// Handle CLI commands
    pub fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Teams { columns } => self.show_teams(&columns),
            Commands::Correlate { columns } => self.show_correlation(&columns),
            Commands::Regress { x, y, degree } => self.show_regression(x, y, degree),
        }
    }

    fn show_teams(&self, columns: &[NumericColumn]) -> Result<()> {
        let columns = if columns.is_empty() {
            ["salary", "age", "PTS", "REB", "AST"]
                .iter()
                .map(|c| c.parse())
                .collect::<std::result::Result<Vec<NumericColumn>, _>>()?
        } else {
            columns.to_vec()
        };

        print!("{:<28} {:>7}", "Team", "Players");
        for column in &columns {
            print!(" {:>14}", column.name());
        }
        println!();
        println!("{}", "=".repeat(36 + 15 * columns.len()));

        for summary in team_summary(&self.records, &columns) {
            print!("{:<28} {:>7}", summary.team.as_str(), summary.players);
            for (_, stats) in &summary.columns {
                match stats {
                    Some(stats) => print!(" {:>14.2}", stats.mean),
                    None => print!(" {:>14}", "-"),
                }
            }
            println!();
        }
        Ok(())
    }

    fn show_correlation(&self, columns: &[NumericColumn]) -> Result<()> {
        let columns = if columns.is_empty() { NumericColumn::all() } else { columns.to_vec() };
        let matrix = correlation_matrix(&self.records, &columns)?;

        println!("Pearson correlation ({} complete rows)", matrix.observations);
        print!("{:<22}", "");
        for column in &columns {
            print!(" {:>8.8}", column.name());
        }
        println!();

        for a in &columns {
            print!("{:<22}", a.name());
            for b in &columns {
                let r = matrix.get(*a, *b).unwrap_or(f64::NAN);
                print!(" {:>8.3}", r);
            }
            println!();
        }
        Ok(())
    }

    fn show_regression(&self, x: NumericColumn, y: NumericColumn, degree: usize) -> Result<()> {
        let fit = fit_polynomial(&self.records, x, y, degree)?;

        println!("{} ~ {} (degree {}, {} rows)", y, x, fit.degree(), fit.observations);
        for (power, coefficient) in fit.coefficients.iter().enumerate() {
            match power {
                0 => println!("  intercept      {:>14.6}", coefficient),
                1 => println!("  {:<14} {:>14.6}", x.name(), coefficient),
                p => println!("  {:<14} {:>14.6}", format!("{}^{}", x.name(), p), coefficient),
            }
        }
        println!("  R²             {:>14.4}", fit.r_squared);
        Ok(())
    }
}
