//! # Scrape Pipeline
//!
//! Team directory -> rosters -> career stats -> reconciliation -> normalisation,
//! with a checkpoint written after each join. All run state lives in the
//! [`ScrapeRun`] value threaded through the stages.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::career::CareerStatCollector;
use crate::config::ScraperConfig;
use crate::directory::{TeamDirectory, TeamDirectoryResolver};
use crate::error::{Result, ScraperError};
use crate::fetcher::{FetchFailure, MarkupFetcher};
use crate::normalize;
use crate::reconcile;
use crate::roster::{RosterCollector, RosterPage};
use crate::store::DatasetStore;
use crate::types::{PlayerRecord, RawPlayerRow};

/// Intermediate results of one run
#[derive(Debug, Default)]
pub struct ScrapeRun {
    pub directory: TeamDirectory,
    pub rosters: Vec<RosterPage>,
    /// Reconciled rows; carry career fields once the career join has run
    pub rows: Vec<RawPlayerRow>,
    pub failures: Vec<FetchFailure>,
}

/// What a completed run produced
#[derive(Debug)]
pub struct RunSummary {
    pub teams: usize,
    pub players: usize,
    pub players_with_career: usize,
    pub failures: Vec<FetchFailure>,
    pub checkpoints: Vec<PathBuf>,
}

/// Drives a full scrape against any [`MarkupFetcher`]
pub struct Pipeline<F> {
    config: ScraperConfig,
    fetcher: F,
}

impl<F: MarkupFetcher> Pipeline<F> {
    pub fn new(config: ScraperConfig, fetcher: F) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, fetcher })
    }

    /// Resolve teams and read every roster. Teams whose roster page fails to load are
    /// skipped; a league with no roster rows at all is fatal.
    pub async fn collect_rosters(&self) -> Result<ScrapeRun> {
        let resolver = TeamDirectoryResolver::new(&self.config.source)?;
        let directory = resolver.resolve(&self.fetcher, &self.config.landing_url()).await?;

        let collector = RosterCollector::new(&self.config)?;
        let mut run = ScrapeRun { directory, ..ScrapeRun::default() };

        for team in run.directory.iter() {
            match collector.collect(&self.fetcher, team).await {
                Ok(page) => run.rosters.push(page),
                Err(ScraperError::Fetch(error)) => {
                    warn!("Skipping {}: {}", team.id, error);
                    run.failures.push(FetchFailure { subject: team.id.to_string(), error });
                }
                Err(e) => return Err(e),
            }
        }

        if run.rosters.iter().all(RosterPage::is_empty) {
            return Err(ScraperError::NoRosterRows);
        }

        run.rows = reconcile::join_identifiers(&run.rosters);
        info!("Reconciled {} players across {} teams", run.rows.len(), run.rosters.len());
        Ok(run)
    }

    /// Fetch career rows for every linked player and join them onto `run.rows`
    pub async fn collect_career_stats(&self, run: &mut ScrapeRun) -> Result<()> {
        let collector = CareerStatCollector::new(&self.config)?;
        let targets = reconcile::career_targets(&run.rows);

        let collection = collector.collect(&self.fetcher, targets).await;
        run.failures.extend(collection.failures);
        run.rows = reconcile::join_career_stats(std::mem::take(&mut run.rows), &collection.stats);
        Ok(())
    }

    /// Full run with all checkpoints. Checkpoints from an earlier run are removed first,
    /// and nothing is written for the cleaned table unless every row normalises.
    pub async fn run(&self, store: &DatasetStore) -> Result<(Vec<PlayerRecord>, RunSummary)> {
        store.clear_checkpoints()?;
        let mut checkpoints = Vec::new();

        let mut run = self.collect_rosters().await?;
        checkpoints.push(store.write_raw_biographical(&run.rows)?);

        self.collect_career_stats(&mut run).await?;
        checkpoints.push(store.write_raw_full(&run.rows)?);

        let records = normalize::normalize(&run.rows)?;
        checkpoints.push(store.write_cleaned(&records)?);
        if store.writes_json() {
            checkpoints.push(store.write_json(&records)?);
        }

        let summary = RunSummary {
            teams: run.directory.len(),
            players: records.len(),
            players_with_career: records.iter().filter(|r| !r.career_stats.is_empty()).count(),
            failures: run.failures,
            checkpoints,
        };

        info!(
            "Run complete: {} teams, {} players, {} with career stats, {} fetch failures",
            summary.teams,
            summary.players,
            summary.players_with_career,
            summary.failures.len()
        );
        Ok((records, summary))
    }
}
