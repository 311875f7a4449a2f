use scraper::Html;
use std::collections::BTreeMap;
use tracing::{debug, info};
use url::Url;

use crate::config::SourceConfig;
use crate::error::{Result, ScraperError};
use crate::extract::selector;
use crate::fetcher::MarkupFetcher;
use crate::types::TeamId;

/// One franchise found on the landing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamEntry {
    pub id: TeamId,
    /// Short site code from the roster path (e.g. "bos")
    pub code: String,
    pub roster_url: String,
}

/// Team slug -> roster page, one entry per team
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    teams: BTreeMap<TeamId, TeamEntry>,
}

impl TeamDirectory {
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn get(&self, id: &TeamId) -> Option<&TeamEntry> {
        self.teams.get(id)
    }

    /// Entries ordered by team id
    pub fn iter(&self) -> impl Iterator<Item = &TeamEntry> {
        self.teams.values()
    }
}

/// Resolves the league landing page into a [`TeamDirectory`]
pub struct TeamDirectoryResolver<'a> {
    source: &'a SourceConfig,
    base: Url,
}

impl<'a> TeamDirectoryResolver<'a> {
    pub fn new(source: &'a SourceConfig) -> Result<Self> {
        let base = Url::parse(&source.base_url)
            .map_err(|e| ScraperError::config(format!("invalid base_url: {e}")))?;
        Ok(Self { source, base })
    }

    /// Fetch and parse the landing page. Zero teams is fatal.
    pub async fn resolve<F: MarkupFetcher + ?Sized>(
        &self,
        fetcher: &F,
        landing_url: &str,
    ) -> Result<TeamDirectory> {
        info!("Fetching team directory from: {}", landing_url);
        let markup = fetcher.fetch(landing_url).await?;

        let directory = self.parse(&markup)?;
        if directory.is_empty() {
            return Err(ScraperError::NoTeams { url: landing_url.to_string() });
        }

        info!("Found {} teams", directory.len());
        Ok(directory)
    }

    /// Collect every roster link on the page, first link per team wins
    pub fn parse(&self, markup: &str) -> Result<TeamDirectory> {
        let document = Html::parse_document(markup);
        let anchors = selector("a[href]")?;

        let mut directory = TeamDirectory::default();
        for anchor in document.select(&anchors) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(entry) = self.roster_entry(href) else {
                continue;
            };
            if directory.teams.contains_key(&entry.id) {
                debug!("Duplicate roster link for {}", entry.id);
                continue;
            }
            directory.teams.insert(entry.id.clone(), entry);
        }

        Ok(directory)
    }

    /// `<prefix><code>/<slug>` -> entry, anything else -> `None`
    fn roster_entry(&self, href: &str) -> Option<TeamEntry> {
        let mut url = self.base.join(href).ok()?;
        let rest = url.path().strip_prefix(self.source.roster_path_prefix.as_str())?;
        let (code, slug) = rest.trim_end_matches('/').split_once('/')?;

        let is_word = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
        if !is_word(code) || slug.is_empty() {
            return None;
        }

        let id = TeamId::new(slug);
        let code = code.to_string();
        url.set_query(None);
        url.set_fragment(None);

        Some(TeamEntry { id, code, roster_url: url.to_string() })
    }
}
