mod api;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod services;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::ScoringPolicy;

#[derive(Parser)]
#[command(name = "matchday")]
#[command(about = "Scoring and leaderboard engine for match predictions")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Initialize the database
    InitDb,
    /// Load a demo tournament with teams, matches and configs
    Seed,
    /// Enter a final score and score every prediction and bet on the match
    EnterResult {
        match_id: String,
        home_score: i32,
        away_score: i32,
        /// flat or weighted; defaults to SCORING_POLICY
        #[arg(long)]
        policy: Option<ScoringPolicy>,
    },
    /// Move an upcoming match to live
    StartMatch { match_id: String },
    /// List the matches of a tournament
    Matches { tournament_id: String },
    /// Rebuild stats and ranks from scored predictions
    Recalculate {
        #[arg(short, long)]
        tournament: Option<String>,
    },
    /// Show the leaderboard, or export it as CSV
    Leaderboard {
        #[arg(short, long)]
        tournament: Option<String>,
        #[arg(long)]
        csv: Option<String>,
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show a player's stats, streaks and recent form
    Player {
        player_id: String,
        #[arg(short, long)]
        tournament: Option<String>,
    },
    /// Stop accepting champion picks for a tournament
    LockChampions { tournament_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.port = port;
            }
            tracing::info!("Starting Matchday API server on port {}", config.port);
            api::serve(config).await?;
        }
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database...");
            cli::init_db(&config).await?;
        }
        Some(Commands::Seed) => {
            cli::seed(&config).await?;
        }
        Some(Commands::EnterResult {
            match_id,
            home_score,
            away_score,
            policy,
        }) => {
            cli::enter_result(&config, &match_id, home_score, away_score, policy).await?;
        }
        Some(Commands::StartMatch { match_id }) => {
            cli::start_match(&config, &match_id).await?;
        }
        Some(Commands::Matches { tournament_id }) => {
            cli::list_matches(&config, &tournament_id).await?;
        }
        Some(Commands::Recalculate { tournament }) => {
            cli::recalculate(&config, tournament.as_deref()).await?;
        }
        Some(Commands::Leaderboard {
            tournament,
            csv,
            limit,
        }) => {
            cli::show_leaderboard(&config, tournament.as_deref(), csv.as_deref(), limit).await?;
        }
        Some(Commands::Player {
            player_id,
            tournament,
        }) => {
            cli::show_player(&config, &player_id, tournament.as_deref()).await?;
        }
        Some(Commands::LockChampions { tournament_id }) => {
            cli::lock_champions(&config, &tournament_id).await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting Matchday API server on port {}", config.port);
            api::serve(config).await?;
        }
    }

    Ok(())
}
