//! NHL team statistics ingestion CLI.
//!
//! Reads configuration from the environment (a `.env` file is honoured),
//! then ingests seasons, lists teams or evaluates a stored team table.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::{error, info, warn};

use nhl_stats_ingestion::cli::{Args, Command};
use nhl_stats_ingestion::evaluate::cross_validate;
use nhl_stats_ingestion::{Config, GameStore, GovernorPacer, Ingestor, NhlApiClient, StatsSource};

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("nhl_stats_ingestion={level}").parse().unwrap())
                .add_directive(format!("nhl_stats={level}").parse().unwrap()),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.debug);

    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    match args.command {
        Command::Ingest {
            seasons,
            teams,
            interval_ms,
        } => {
            if let Some(ms) = interval_ms {
                config.request_interval = Duration::from_millis(ms);
            }
            run_ingest(&config, seasons, &teams).await
        }
        Command::Teams => run_teams(&config).await,
        Command::Evaluate { team, folds } => run_evaluate(&config, &team, folds).await,
    }
}

async fn run_ingest(config: &Config, mut seasons: Vec<i32>, teams: &[String]) -> Result<()> {
    seasons.sort_unstable();
    seasons.dedup();

    let source = NhlApiClient::new(&config.api_base_url, config.http_timeout)?;
    let pacer = GovernorPacer::new(config.request_interval)
        .ok_or_else(|| anyhow!("request interval must be greater than zero"))?;
    let store = GameStore::connect_with_retry(&config.database_url, config.db_connect_retries)
        .await
        .with_context(|| format!("Failed to open {}", config.database_url))?;

    info!(
        "Ingesting seasons {:?} from {} (one game every {:?})",
        seasons,
        source.base_url(),
        pacer.interval()
    );

    let ingestor = Ingestor::new(source, pacer, store);
    let report = ingestor
        .ingest_seasons(&seasons, teams)
        .await
        .context("Team directory unavailable, nothing ingested")?;

    for summary in &report.completed {
        println!(
            "{:<28} {}  inserted {:>3}  already present {:>3}{}",
            summary.team.name,
            summary.season,
            summary.inserted,
            summary.already_present,
            if summary.failed_inserts > 0 {
                format!("  failed {}", summary.failed_inserts)
            } else {
                String::new()
            }
        );
    }
    for failure in &report.failed {
        println!(
            "{:<28} {}  FAILED: {}",
            failure.team.name, failure.season, failure.error
        );
    }
    for name in &report.unknown_teams {
        warn!("Unknown team: {}", name);
    }

    if report.is_clean() {
        info!("Ingestion complete: {} games stored", report.inserted());
        Ok(())
    } else {
        error!("Ingestion finished with failures: {:?}", report.failed_teams());
        Err(anyhow!(
            "{} team seasons failed, {} unknown teams",
            report.failed.len(),
            report.unknown_teams.len()
        ))
    }
}

async fn run_teams(config: &Config) -> Result<()> {
    let source = NhlApiClient::new(&config.api_base_url, config.http_timeout)?;
    let teams = source.teams().await.context("Failed to fetch teams")?;
    for team in teams {
        println!("{:>3}  {}", team.id, team.name);
    }
    Ok(())
}

async fn run_evaluate(config: &Config, team: &str, folds: usize) -> Result<()> {
    let store = GameStore::connect_with_retry(&config.database_url, config.db_connect_retries)
        .await
        .with_context(|| format!("Failed to open {}", config.database_url))?;

    if !store.table_exists(team).await? {
        return Err(anyhow!("No stored games for '{team}'"));
    }
    let games = store.games(team).await?;
    info!("Evaluating {} games for {}", games.len(), team);

    let evaluation = cross_validate(&games, folds)?;
    println!(
        "Accuracy: {:.3}% ({:.3}%)",
        evaluation.mean() * 100.0,
        evaluation.std_dev() * 100.0
    );
    Ok(())
}
