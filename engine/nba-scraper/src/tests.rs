//! End-to-end runs of the pipeline against canned pages

use tempfile::TempDir;

use crate::config::{OutputConfig, ScraperConfig};
use crate::fetcher::testing::StaticFetcher;
use crate::pipeline::Pipeline;
use crate::store::DatasetStore;
use crate::types::{StatCode, TeamId};
use crate::ScraperError;

const BASE: &str = "https://www.espn.com";

fn landing_page() -> String {
    r#"<html><body><nav>
        <a href="/nba/team/roster/_/name/bos/boston-celtics">Roster</a>
        <a href="/nba/team/schedule/_/name/bos/boston-celtics">Schedule</a>
        <a href="/nba/team/roster/_/name/den/denver-nuggets">Roster</a>
        <a href="/nba/team/roster/_/name/den/denver-nuggets">Roster</a>
    </nav></body></html>"#
        .to_string()
}

fn roster_page(players: &[(&str, &str)]) -> String {
    let rows: String = players
        .iter()
        .enumerate()
        .map(|(i, (name, id))| {
            format!(
                r#"<tr class="Table__TR" data-idx="{i}">
                    <td class="Table__TD"><img alt="{name}"></td>
                    <td class="Table__TD"><a class="AnchorLink" href="{BASE}/nba/player/_/id/{id}/slug">{name}</a><span class="pl2 n10">{i}</span></td>
                    <td class="Table__TD">G</td><td class="Table__TD">2{i}</td>
                    <td class="Table__TD">6' {i}"</td><td class="Table__TD">19{i} lbs</td>
                    <td class="Table__TD">--</td><td class="Table__TD">$1,00{i},000</td>
                </tr>"#
            )
        })
        .collect();

    format!(
        r#"<html><body><table class="Table"><thead><tr>
            <th class="Table__TH"></th><th class="Table__TH">Name</th><th class="Table__TH">POS</th>
            <th class="Table__TH">Age</th><th class="Table__TH">HT</th><th class="Table__TH">WT</th>
            <th class="Table__TH">College</th><th class="Table__TH">Salary</th>
        </tr></thead><tbody>{rows}</tbody></table></body></html>"#
    )
}

fn player_page(points: &str, turnovers: &str) -> String {
    format!(
        r#"<html><body><section class="Card PlayerStats"><table>
            <thead><tr>
              <th class="Table__TH">STATS</th><th class="Table__TH">GP</th><th class="Table__TH">MIN</th>
              <th class="Table__TH">FG%</th><th class="Table__TH">3P%</th><th class="Table__TH">FT%</th>
              <th class="Table__TH">REB</th><th class="Table__TH">AST</th><th class="Table__TH">BLK</th>
              <th class="Table__TH">STL</th><th class="Table__TH">PF</th><th class="Table__TH">TO</th>
              <th class="Table__TH">PTS</th>
            </tr></thead>
            <tbody>
              <tr data-idx="0"><td class="Table__TD">Regular Season</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td></tr>
              <tr data-idx="1"><td class="Table__TD">Career</td><td>300</td><td>30.5</td><td>47.1</td><td>36.0</td><td>80.2</td><td>5.1</td><td>4.0</td><td>0.4</td><td>1.1</td><td>2.2</td><td>{turnovers}</td><td>{points}</td></tr>
            </tbody>
        </table></section></body></html>"#
    )
}

fn player_url(id: &str) -> String {
    format!("{BASE}/nba/player/_/id/{id}/slug")
}

/// Two teams of three; player 6 has no detail page
fn league() -> StaticFetcher {
    let mut fetcher = StaticFetcher::new()
        .with_page(&format!("{BASE}/nba/teams"), &landing_page())
        .with_page(
            &format!("{BASE}/nba/team/roster/_/name/bos/boston-celtics"),
            &roster_page(&[("Ann One", "1"), ("Bea Two", "2"), ("Cy Three", "3")]),
        )
        .with_page(
            &format!("{BASE}/nba/team/roster/_/name/den/denver-nuggets"),
            &roster_page(&[("Di Four", "4"), ("Ed Five", "5"), ("Flo Six", "6")]),
        );

    for id in ["1", "2", "3", "4"] {
        fetcher = fetcher.with_page(&player_url(id), &player_page("20.5", "2.0"));
    }
    fetcher.with_page(&player_url("5"), &player_page("11.0", "0.0"))
}

fn config(dir: &TempDir) -> ScraperConfig {
    ScraperConfig {
        output: OutputConfig {
            dir: dir.path().to_path_buf(),
            write_json: true,
            ..OutputConfig::default()
        },
        ..ScraperConfig::default()
    }
}

#[tokio::test]
async fn test_full_run_produces_six_cleaned_rows() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let store = DatasetStore::new(config.output.clone());
    let pipeline = Pipeline::new(config, league()).unwrap();

    let (records, summary) = pipeline.run(&store).await.unwrap();

    assert_eq!(records.len(), 6);
    assert_eq!(summary.teams, 2);
    assert_eq!(summary.players, 6);
    assert_eq!(summary.players_with_career, 5);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].subject, "Flo Six");
    assert_eq!(summary.checkpoints.len(), 4);

    let ann = records.iter().find(|r| r.name == "Ann One").unwrap();
    assert_eq!(ann.team, TeamId::new("boston-celtics"));
    assert_eq!(ann.age, 20);
    assert_eq!(ann.height_inches, Some(72.0));
    assert_eq!(ann.weight_lbs, Some(190.0));
    assert_eq!(ann.salary, 1_000_000.0);
    assert_eq!(ann.external_id.as_deref(), Some("1"));
    assert_eq!(ann.stat(StatCode::Points), Some(20.5));
    assert_eq!(ann.assist_turnover_ratio, Some(2.0));

    let ed = records.iter().find(|r| r.name == "Ed Five").unwrap();
    assert!(ed.assist_turnover_ratio.unwrap().is_infinite());

    let flo = records.iter().find(|r| r.name == "Flo Six").unwrap();
    for code in StatCode::ALL {
        assert_eq!(flo.stat(code), None, "{code} should be null");
    }
    assert_eq!(flo.assist_turnover_ratio, None);

    let reloaded = DatasetStore::load_cleaned(store.cleaned_path()).unwrap();
    assert_eq!(reloaded.len(), 6);
    assert!(store.raw_biographical_path().exists());
    assert!(store.raw_full_path().exists());
    assert!(store.json_path().exists());
}

#[tokio::test]
async fn test_bad_stat_value_writes_no_cleaned_table() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let store = DatasetStore::new(config.output.clone());
    let fetcher = league().with_page(&player_url("6"), &player_page("lots", "1.0"));
    let pipeline = Pipeline::new(config, fetcher).unwrap();

    let err = pipeline.run(&store).await.unwrap_err();

    assert!(matches!(err, ScraperError::TypeCoercion { ref player, .. } if player == "Flo Six"));
    assert!(store.raw_full_path().exists());
    assert!(!store.cleaned_path().exists());
}

#[tokio::test]
async fn test_failed_rerun_removes_previous_cleaned_table() {
    let dir = TempDir::new().unwrap();
    let store = DatasetStore::new(config(&dir).output);

    Pipeline::new(config(&dir), league()).unwrap().run(&store).await.unwrap();
    assert!(store.cleaned_path().exists());
    assert!(store.json_path().exists());

    let broken = league().with_page(&player_url("6"), &player_page("lots", "1.0"));
    let err = Pipeline::new(config(&dir), broken).unwrap().run(&store).await.unwrap_err();

    assert!(matches!(err, ScraperError::TypeCoercion { .. }));
    assert!(std::fs::read_to_string(store.raw_full_path()).unwrap().contains("lots"));
    assert!(!store.cleaned_path().exists());
    assert!(!store.json_path().exists());
}

#[tokio::test]
async fn test_missing_roster_page_skips_team() {
    let dir = TempDir::new().unwrap();
    let fetcher = StaticFetcher::new()
        .with_page(&format!("{BASE}/nba/teams"), &landing_page())
        .with_page(
            &format!("{BASE}/nba/team/roster/_/name/den/denver-nuggets"),
            &roster_page(&[("Di Four", "4")]),
        );
    let pipeline = Pipeline::new(config(&dir), fetcher).unwrap();

    let run = pipeline.collect_rosters().await.unwrap();

    assert_eq!(run.rosters.len(), 1);
    assert_eq!(run.rows.len(), 1);
    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].subject, "boston-celtics");
}

#[tokio::test]
async fn test_league_without_roster_rows_is_fatal() {
    let dir = TempDir::new().unwrap();
    let fetcher = StaticFetcher::new()
        .with_page(&format!("{BASE}/nba/teams"), &landing_page())
        .with_page(&format!("{BASE}/nba/team/roster/_/name/bos/boston-celtics"), "<html></html>")
        .with_page(&format!("{BASE}/nba/team/roster/_/name/den/denver-nuggets"), "<html></html>");
    let pipeline = Pipeline::new(config(&dir), fetcher).unwrap();

    let err = pipeline.collect_rosters().await.unwrap_err();
    assert!(matches!(err, ScraperError::NoRosterRows));
}
