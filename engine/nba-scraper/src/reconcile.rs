//! Joins the three per-player sources into one row per rostered player.
//!
//! Row existence is decided by the roster's biographical rows alone; a missing link
//! or career row leaves the corresponding fields empty instead of dropping the player.

use std::collections::HashMap;
use tracing::warn;

use crate::roster::RosterPage;
use crate::types::{FieldSet, PlayerKey, RawPlayerRow, TeamId};

/// Biographical rows joined with their identifier/URL, in team then roster order
pub fn join_identifiers(rosters: &[RosterPage]) -> Vec<RawPlayerRow> {
    let mut first_team: HashMap<&str, &TeamId> = HashMap::new();
    let mut rows = Vec::new();

    for page in rosters {
        for (name, bio) in &page.players {
            if let Some(other) = first_team.insert(name.as_str(), &page.team) {
                warn!(
                    "Player name '{}' appears on both {} and {}; keeping both rows",
                    name, other, page.team
                );
            }

            rows.push(RawPlayerRow {
                team: page.team.clone(),
                name: name.clone(),
                bio: bio.clone(),
                link: page.links.get(name).cloned(),
                career: None,
            });
        }
    }

    rows
}

/// Detail pages to visit: every joined row that carries a link
pub fn career_targets(rows: &[RawPlayerRow]) -> Vec<(PlayerKey, String)> {
    rows.iter()
        .filter_map(|row| row.link.as_ref().map(|link| (row.key(), link.detail_url.clone())))
        .collect()
}

/// Attach career rows. Players absent from `stats` get an empty career field-set.
pub fn join_career_stats(
    rows: Vec<RawPlayerRow>,
    stats: &HashMap<PlayerKey, FieldSet>,
) -> Vec<RawPlayerRow> {
    rows.into_iter()
        .map(|mut row| {
            row.career = Some(stats.get(&row.key()).cloned().unwrap_or_default());
            row
        })
        .collect()
}
