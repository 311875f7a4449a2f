use anyhow::{Context, Result};
use clap::Parser;
use nba_scraper::{
    DatasetStore, HttpFetcher, Pipeline, RetryPolicy, RetryingFetcher, ScraperConfig, StatCode,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scrape NBA rosters and career stats into CSV checkpoints
#[derive(Parser)]
#[command(name = "scrape_players")]
#[command(about = "Scrape every NBA roster and player career averages")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the checkpoint files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum player pages fetched at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Site base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Also write the cleaned table as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<ScraperConfig> {
    let mut config = match &args.config {
        Some(path) => ScraperConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ScraperConfig::default(),
    };
    config.apply_env_overrides()?;

    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(concurrency) = args.concurrency {
        config.http.concurrency = concurrency;
    }
    if let Some(base_url) = &args.base_url {
        config.source.base_url = base_url.clone();
    }
    if args.json {
        config.output.write_json = true;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!("Starting NBA player scraper against {}", config.source.base_url);

    let fetcher =
        RetryingFetcher::new(HttpFetcher::new(&config)?, RetryPolicy::from(&config.retry));
    let store = DatasetStore::new(config.output.clone());
    let pipeline = Pipeline::new(config, fetcher)?;

    let (records, summary) = pipeline.run(&store).await.context("Scrape run failed")?;

    // Print top 10 players by career points
    let mut ranked: Vec<_> = records
        .iter()
        .filter_map(|r| r.stat(StatCode::Points).map(|pts| (r, pts)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    println!("\nTop 10 Players by Career Points per Game:");
    println!(
        "{:<4} {:<24} {:<4} {:<24} {:<6} {:<12}",
        "Rank", "Name", "Pos", "Team", "PTS", "Salary"
    );
    println!("{}", "-".repeat(78));
    for (rank, (record, pts)) in ranked.iter().take(10).enumerate() {
        println!(
            "{:<4} {:<24} {:<4} {:<24} {:<6.1} ${:<11.0}",
            rank + 1,
            record.name,
            record.position,
            record.team.as_str(),
            pts,
            record.salary
        );
    }

    println!("\nSummary:");
    println!("- Teams: {}", summary.teams);
    println!("- Players: {}", summary.players);
    println!("- Players with career stats: {}", summary.players_with_career);
    println!("- Fetch failures: {}", summary.failures.len());
    for failure in &summary.failures {
        println!("    {}: {}", failure.subject, failure.error);
    }
    for path in &summary.checkpoints {
        println!("- Wrote {}", path.display());
    }

    info!("Scraping completed successfully!");
    Ok(())
}
