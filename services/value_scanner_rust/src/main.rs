mod config;
mod report;

use crate::config::ScannerConfig;
use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use valuebet_core::pipeline::{filter, rank, MatchPipeline, PipelineConfig};
use valuebet_core::providers::{EventSource, KambiClient};
use valuebet_core::RosterSnapshot;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Value Scanner...");

    let config = ScannerConfig::from_env()?;

    // Roster snapshot, read once per run
    let roster = RosterSnapshot::load(&config.roster_path, &config.leagues_path)
        .context("Failed to load roster")?;
    let league = roster
        .find_league(&config.league_id)
        .with_context(|| format!("Unknown league '{}'", config.league_id))?
        .clone();

    info!(
        "League {} ({}): {} teams, {} games, draw rate {:.1}%",
        league.name,
        league.country,
        roster.teams_in_league(&league).len(),
        league.total_games,
        league.stats.draw_rate * 100.0
    );

    // Odds feed
    let api_client = league
        .api_client
        .clone()
        .unwrap_or_else(|| config.kambi_api_client.clone());
    let kambi = Arc::new(KambiClient::new(
        &api_client,
        config.http_timeout,
        config.circuit_breaker.clone(),
    ));

    let events = kambi
        .fetch_events(&league)
        .await
        .context("Failed to fetch event listing")?;
    if events.is_empty() {
        info!("No events listed for {}", league.name);
        return Ok(());
    }

    // Pipeline
    let pipeline = MatchPipeline::with_config(
        kambi.clone(),
        PipelineConfig {
            concurrency: config.odds_concurrency,
            ..PipelineConfig::default()
        },
    )?;
    let batch = pipeline
        .process_batch(events, &league, &roster.teams)
        .await;

    info!("Run {}: {} events scanned", batch.run_id, batch.len());
    if !batch.matches.iter().any(|m| m.teams_resolved()) {
        warn!(
            "No event has both teams in the roster; add ratings for {} teams",
            league.name
        );
    }

    let mut value_bets = filter(&batch.matches, &config.scan_filter());
    rank(&mut value_bets);

    info!("{} matches after filtering", value_bets.len());
    for row in report::render_table(&value_bets) {
        info!("{}", row);
    }

    Ok(())
}
