//! Duel simulation tool
//!
//! Seeds a dive-site catalog (generated, or loaded from a TOML file), drives
//! a set of simulated voters through the select/record loop until each has
//! exhausted the catalog, and prints the resulting leaderboard. Useful for
//! demos and for eyeballing how quickly ratings converge.
//!
//! Run with: `cargo run --bin duel-sim -- --sites 8 --voters 4`

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;
use reef_rank::config::AppConfig;
use reef_rank::rating::win_probability;
use reef_rank::storage::MemoryStore;
use reef_rank::types::{ChampionHint, DiveSite, Matchup, SiteId};
use reef_rank::{MatchupService, RankEngine, RankError};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Reef Rank duel simulator - exercises the full matchmaking engine
#[derive(Parser)]
#[command(
    name = "duel-sim",
    version,
    about = "Simulate voters dueling dive sites and print the leaderboard",
    long_about = "Seeds a catalog of dive sites, runs simulated voters through \
                 repeated pairwise duels (carrying a champion across rounds the \
                 way the UI would), and prints the final ELO leaderboard with \
                 rank movement."
)]
struct Args {
    /// Number of generated sites (ignored when --seed-file is given)
    #[arg(short, long, value_name = "N", default_value_t = 8)]
    sites: usize,

    /// Number of simulated authenticated voters
    #[arg(short, long, value_name = "N", default_value_t = 4)]
    voters: usize,

    /// TOML file describing the catalog to seed
    #[arg(long, value_name = "FILE", help = "Seed catalog from a TOML file")]
    seed_file: Option<PathBuf>,

    /// Log level override
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Rebuild all ratings from the comparison log after the simulation
    #[arg(long, help = "Run the offline rating rebuild before printing results")]
    rebuild: bool,

    /// Emit the final leaderboard as JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// Catalog seed file format
#[derive(Debug, Deserialize)]
struct SeedFile {
    sites: Vec<SeedSite>,
}

#[derive(Debug, Deserialize)]
struct SeedSite {
    id: SiteId,
    name: String,
    rating: Option<f64>,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn load_catalog(args: &Args, initial_rating: f64) -> Result<Vec<DiveSite>> {
    if let Some(path) = &args.seed_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        let seed: SeedFile = toml::from_str(&raw)
            .with_context(|| format!("failed to parse seed file {}", path.display()))?;
        Ok(seed
            .sites
            .into_iter()
            .map(|s| DiveSite::new(s.id, s.name, s.rating.unwrap_or(initial_rating)))
            .collect())
    } else {
        Ok((1..=args.sites as SiteId)
            .map(|id| DiveSite::new(id, format!("Dive Site #{id}"), initial_rating))
            .collect())
    }
}

/// Pick a winner for the presented matchup, biased by current ratings so the
/// simulation converges the way real preferences would
fn simulate_outcome(matchup: &Matchup) -> (SiteId, SiteId) {
    let p_left = win_probability(matchup.left.rating, matchup.right.rating);
    if rand::thread_rng().gen_bool(p_left.clamp(0.05, 0.95)) {
        (matchup.left.id, matchup.right.id)
    } else {
        (matchup.right.id, matchup.left.id)
    }
}

/// One voter's full session: duel until the catalog is exhausted
async fn run_voter(engine: Arc<RankEngine>, voter: String) -> Result<u64> {
    let mut champion: Option<ChampionHint> = None;
    let mut votes = 0u64;

    loop {
        let matchup = match engine.select_pair(Some(voter.clone()), champion).await {
            Ok(matchup) => matchup,
            Err(e) => match e.downcast_ref::<RankError>() {
                Some(RankError::AllMatchupsCompleted { .. }) => {
                    info!("voter '{}' exhausted the catalog after {} votes", voter, votes);
                    return Ok(votes);
                }
                _ => return Err(e),
            },
        };

        let (winner_id, loser_id) = simulate_outcome(&matchup);
        match engine
            .record_comparison(winner_id, loser_id, Some(voter.clone()))
            .await
        {
            Ok(_) => {
                votes += 1;
                champion = matchup.side_of(winner_id).map(|side| ChampionHint {
                    site_id: winner_id,
                    side,
                });
            }
            Err(e) => match e.downcast_ref::<RankError>() {
                // duplicates are safe to ignore; drop the champion and reselect
                Some(RankError::DuplicateComparison { .. }) => {
                    warn!("voter '{}' hit a duplicate pair, reselecting", voter);
                    champion = None;
                }
                _ => return Err(e),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(level) = &args.log_level {
        config.service.log_level = level.clone();
    }
    init_logging(&config.service.log_level)?;

    let catalog = load_catalog(&args, config.rating.initial_rating)?;
    info!(
        "seeding {} sites, {} voters (service: {})",
        catalog.len(),
        args.voters,
        config.service.name
    );

    let store = Arc::new(MemoryStore::with_sites(catalog));
    let engine = Arc::new(RankEngine::with_config(store, config));

    let mut sessions = Vec::new();
    for i in 1..=args.voters {
        let engine = engine.clone();
        sessions.push(tokio::spawn(run_voter(engine, format!("sim-voter-{i}"))));
    }

    let mut total_votes = 0u64;
    for session in sessions {
        total_votes += session.await??;
    }

    if args.rebuild {
        let summary = engine.rebuild_ratings()?;
        info!(
            "rebuild replayed {} comparisons across {} sites",
            summary.comparisons_replayed, summary.sites_reset
        );
    }

    let board = engine.rankings().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    println!("\nFinal leaderboard after {} votes:", total_votes);
    println!("{:>4}  {:<24} {:>7} {:>5} {:>7} {:>7}", "rank", "site", "rating", "move", "wins", "losses");
    for entry in &board {
        let movement = match entry.rank_change {
            0 => "-".to_string(),
            n if n > 0 => format!("+{n}"),
            n => n.to_string(),
        };
        println!(
            "{:>4}  {:<24} {:>7.0} {:>5} {:>7} {:>7}",
            entry.rank,
            entry.site.name,
            entry.site.rating,
            movement,
            entry.site.wins,
            entry.site.losses
        );
    }

    let stats = engine.stats()?;
    println!(
        "\nmatchups served: {}, comparisons recorded: {}, duplicates rejected: {}",
        stats.matchups_served, stats.comparisons_recorded, stats.duplicates_rejected
    );

    Ok(())
}
