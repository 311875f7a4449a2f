use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use url::Url;

use crate::config::ScraperConfig;
use crate::directory::TeamEntry;
use crate::error::{Result, ScraperError};
use crate::extract::{selector, RowSchema};
use crate::fetcher::MarkupFetcher;
use crate::types::{columns, FieldSet, PlayerLink, TeamId};

/// Everything read from one team's roster page
#[derive(Debug, Clone, PartialEq)]
pub struct RosterPage {
    pub team: TeamId,
    /// Player name -> biographical fields, in roster row order
    pub players: Vec<(String, FieldSet)>,
    /// Player name -> site id and detail page
    pub links: HashMap<String, PlayerLink>,
}

impl RosterPage {
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Reads roster pages into [`RosterPage`]s
pub struct RosterCollector {
    schema: RowSchema,
    anchor: Selector,
    base: Url,
    player_path_prefix: String,
}

impl RosterCollector {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let base = Url::parse(&config.source.base_url)
            .map_err(|e| ScraperError::config(format!("invalid base_url: {e}")))?;

        Ok(Self {
            schema: RowSchema::roster(config.extraction.max_roster_rows)?,
            anchor: selector("a[href]")?,
            base,
            player_path_prefix: config.source.player_path_prefix.clone(),
        })
    }

    /// Fetch and parse one team's roster page
    pub async fn collect<F: MarkupFetcher + ?Sized>(
        &self,
        fetcher: &F,
        team: &TeamEntry,
    ) -> Result<RosterPage> {
        let markup = fetcher.fetch(&team.roster_url).await?;
        let page = self.parse(&team.id, &markup)?;
        info!("Collected {} players for {}", page.len(), team.id);
        Ok(page)
    }

    /// Scan row positions `[0, max_rows)`; unmatched positions and nameless rows are skipped.
    /// A name repeated on the same roster fails with [`ScraperError::NameCollision`].
    pub fn parse(&self, team: &TeamId, markup: &str) -> Result<RosterPage> {
        let document = Html::parse_document(markup);

        let mut seen = HashSet::new();
        let mut players = Vec::new();
        let mut links = HashMap::new();

        for row in self.schema.extract(&document) {
            let name = match row.fields.get(columns::NAME) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => {
                    debug!("Row {} on {} roster has no player name", row.index, team);
                    continue;
                }
            };

            if !seen.insert(name.clone()) {
                return Err(ScraperError::NameCollision { team: team.to_string(), name });
            }

            if let Some(link) = self.player_link(row.element) {
                links.insert(name.clone(), link);
            }
            players.push((name, row.fields));
        }

        Ok(RosterPage { team: team.clone(), players, links })
    }

    /// First anchor in the row pointing at `<player prefix><digits>/<slug>`
    fn player_link(&self, row: ElementRef<'_>) -> Option<PlayerLink> {
        row.select(&self.anchor).find_map(|a| {
            let href = a.value().attr("href")?;
            let url = self.base.join(href).ok()?;
            let rest = url.path().strip_prefix(self.player_path_prefix.as_str())?;
            let (id, slug) = rest.split_once('/')?;

            if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) || slug.is_empty() {
                return None;
            }

            Some(PlayerLink { external_id: id.to_string(), detail_url: url.to_string() })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_html(rows: &[(&str, Option<&str>)]) -> String {
        let body: String = rows
            .iter()
            .enumerate()
            .map(|(i, (name, id))| {
                let name_cell = match id {
                    Some(id) => format!(
                        r#"<a href="https://www.espn.com/nba/player/_/id/{id}/x-y">{name}</a><span>7</span>"#
                    ),
                    None => name.to_string(),
                };
                format!(
                    r#"<tr data-idx="{i}"><td></td><td>{name_cell}</td><td>SF</td><td>24</td><td>6' 7"</td><td>220 lbs</td><td>--</td><td>$2,000,000</td></tr>"#
                )
            })
            .collect();

        format!(
            r#"<table><thead><tr><th class="Table__TH"></th><th class="Table__TH">Name</th>
            <th class="Table__TH">POS</th><th class="Table__TH">Age</th><th class="Table__TH">HT</th>
            <th class="Table__TH">WT</th><th class="Table__TH">College</th><th class="Table__TH">Salary</th>
            </tr></thead><tbody>{body}</tbody></table>"#
        )
    }

    fn collector() -> RosterCollector {
        RosterCollector::new(&ScraperConfig::default()).unwrap()
    }

    #[test]
    fn test_short_roster_returns_only_present_rows() {
        let html =
            roster_html(&[("Jane Doe", Some("101")), ("Jo Roe", Some("102")), ("Al Poe", None)]);
        let page = collector().parse(&TeamId::new("boston-celtics"), &html).unwrap();

        assert_eq!(page.len(), 3);
        let (name, bio) = &page.players[0];
        assert_eq!(name, "Jane Doe");
        assert_eq!(bio.get("Age"), Some("24"));
        assert_eq!(bio.get("WT"), Some("220 lbs"));
        assert_eq!(bio.get("College"), Some("--"));

        assert_eq!(page.links.len(), 2);
        let link = &page.links["Jo Roe"];
        assert_eq!(link.external_id, "102");
        assert_eq!(link.detail_url, "https://www.espn.com/nba/player/_/id/102/x-y");
        assert!(!page.links.contains_key("Al Poe"));
    }

    #[test]
    fn test_parsing_same_markup_twice_is_identical() {
        let html =
            roster_html(&[("Jane Doe", Some("101")), ("Jo Roe", Some("102")), ("Al Poe", None)]);
        let collector = collector();
        let team = TeamId::new("boston-celtics");

        let first = collector.parse(&team, &html).unwrap();
        let second = collector.parse(&team, &html).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.players.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            vec!["Jane Doe", "Jo Roe", "Al Poe"]
        );
    }

    #[test]
    fn test_nameless_rows_are_omitted() {
        let html = roster_html(&[("", None), ("Jane Doe", Some("101"))]);
        let page = collector().parse(&TeamId::new("t"), &html).unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page.players[0].0, "Jane Doe");
    }

    #[test]
    fn test_duplicate_name_on_roster_is_rejected() {
        let html = roster_html(&[("Jane Doe", Some("101")), ("Jane Doe", Some("102"))]);
        let err = collector().parse(&TeamId::new("t"), &html).unwrap_err();

        assert!(matches!(err, ScraperError::NameCollision { ref name, .. } if name == "Jane Doe"));
    }
}
