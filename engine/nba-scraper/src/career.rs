use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::extract::LabeledRowSchema;
use crate::fetcher::{FetchFailure, MarkupFetcher};
use crate::types::{FieldSet, PlayerKey};

/// Career rows gathered for a batch of players
#[derive(Debug, Default)]
pub struct CareerCollection {
    /// One entry per requested player; empty when the page had no career row or failed to load
    pub stats: HashMap<PlayerKey, FieldSet>,
    pub failures: Vec<FetchFailure>,
}

impl CareerCollection {
    /// Players for which a career row was actually found
    pub fn found(&self) -> usize {
        self.stats.values().filter(|fields| !fields.is_empty()).count()
    }
}

/// Reads the career averages row from player detail pages
pub struct CareerStatCollector {
    schema: LabeledRowSchema,
    concurrency: usize,
}

impl CareerStatCollector {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            schema: LabeledRowSchema::new(
                &config.extraction.stats_card_selector,
                &config.extraction.career_label,
            )?,
            concurrency: config.http.concurrency.max(1),
        })
    }

    /// Career row of one page; empty when the player has no career history
    pub fn parse(&self, markup: &str) -> FieldSet {
        self.schema.extract(markup).unwrap_or_default()
    }

    /// Fetch every detail page with at most `concurrency` requests in flight.
    ///
    /// Results are folded into the returned collection by this task alone; a failed
    /// page is logged, recorded and contributes an empty field-set. Failures are sorted
    /// by player so their order does not depend on completion order.
    pub async fn collect<F: MarkupFetcher + ?Sized>(
        &self,
        fetcher: &F,
        targets: Vec<(PlayerKey, String)>,
    ) -> CareerCollection {
        let total = targets.len();
        info!("Fetching career stats for {} players ({} concurrent)", total, self.concurrency);

        let mut results = stream::iter(targets)
            .map(|(key, url)| async move {
                let outcome = fetcher.fetch(&url).await.map(|markup| self.parse(&markup));
                (key, outcome)
            })
            .buffer_unordered(self.concurrency);

        let mut collection = CareerCollection::default();
        while let Some((key, outcome)) = results.next().await {
            let fields = match outcome {
                Ok(fields) => {
                    if fields.is_empty() {
                        debug!("No career row for {} ({})", key.name, key.team);
                    }
                    fields
                }
                Err(error) => {
                    warn!("Failed to fetch stats for {} ({}): {}", key.name, key.team, error);
                    collection.failures.push(FetchFailure { subject: key.name.clone(), error });
                    FieldSet::new()
                }
            };
            collection.stats.insert(key, fields);
        }

        collection.failures.sort_by_cached_key(|f| (f.subject.clone(), f.error.to_string()));

        info!(
            "Career stats: {} of {} players have a career row, {} fetch failures",
            collection.found(),
            total,
            collection.failures.len()
        );
        collection
    }
}
