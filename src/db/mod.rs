pub mod bets;
pub mod configs;
pub mod matches;
pub mod players;
pub mod predictions;
pub mod seed;

pub use bets::*;
pub use configs::*;
pub use matches::*;
pub use players::*;
pub use predictions::*;
pub use seed::seed_data;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::str::FromStr;

use crate::error::ScoringError;

pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    // Strip the "sqlite:" prefix to get the file path, create parent dir if needed
    let file_path = database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if let Some(parent) = std::path::Path::new(file_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// Creates every table and index. Safe to run on an existing database.
pub async fn init_database_with_pool(pool: &SqlitePool) -> crate::error::Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS tournaments (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            tournament_id TEXT NOT NULL,
            is_eliminated INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY (tournament_id) REFERENCES tournaments (id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            tournament_id TEXT,
            home_team_id TEXT NOT NULL,
            away_team_id TEXT NOT NULL,
            kickoff_at TEXT NOT NULL,
            venue TEXT,
            stage TEXT,
            status TEXT NOT NULL DEFAULT 'upcoming',
            home_score INTEGER,
            away_score INTEGER,
            outcome TEXT,
            weight REAL NOT NULL DEFAULT 1.0,
            outcome_points REAL NOT NULL DEFAULT 1.0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (tournament_id) REFERENCES tournaments (id),
            FOREIGN KEY (home_team_id) REFERENCES teams (id),
            FOREIGN KEY (away_team_id) REFERENCES teams (id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS players (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            total_points REAL NOT NULL DEFAULT 0,
            total_correct INTEGER NOT NULL DEFAULT 0,
            total_predictions INTEGER NOT NULL DEFAULT 0,
            current_streak INTEGER NOT NULL DEFAULT 0,
            best_streak INTEGER NOT NULL DEFAULT 0,
            rank INTEGER,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS player_tournament_stats (
            id TEXT PRIMARY KEY,
            player_id TEXT NOT NULL,
            tournament_id TEXT NOT NULL,
            total_points REAL NOT NULL DEFAULT 0,
            total_correct INTEGER NOT NULL DEFAULT 0,
            total_predictions INTEGER NOT NULL DEFAULT 0,
            current_streak INTEGER NOT NULL DEFAULT 0,
            best_streak INTEGER NOT NULL DEFAULT 0,
            rank INTEGER,
            UNIQUE (player_id, tournament_id),
            FOREIGN KEY (player_id) REFERENCES players (id),
            FOREIGN KEY (tournament_id) REFERENCES tournaments (id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS predictions (
            id TEXT PRIMARY KEY,
            player_id TEXT NOT NULL,
            match_id TEXT NOT NULL,
            pick TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            is_correct INTEGER,
            points_earned REAL NOT NULL DEFAULT 0,
            submitted_at TEXT,
            scored_at TEXT,
            locked_at TEXT,
            UNIQUE (player_id, match_id),
            FOREIGN KEY (player_id) REFERENCES players (id),
            FOREIGN KEY (match_id) REFERENCES matches (id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS score_bets (
            id TEXT PRIMARY KEY,
            player_id TEXT NOT NULL,
            match_id TEXT NOT NULL,
            predicted_home_score INTEGER NOT NULL,
            predicted_away_score INTEGER NOT NULL,
            bet_amount INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            is_correct INTEGER,
            payout INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            scored_at TEXT,
            FOREIGN KEY (player_id) REFERENCES players (id),
            FOREIGN KEY (match_id) REFERENCES matches (id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS champion_picks (
            id TEXT PRIMARY KEY,
            player_id TEXT NOT NULL,
            tournament_id TEXT NOT NULL,
            team_id TEXT NOT NULL,
            picked_at TEXT NOT NULL,
            submitted_at TEXT NOT NULL,
            UNIQUE (player_id, tournament_id),
            FOREIGN KEY (player_id) REFERENCES players (id),
            FOREIGN KEY (tournament_id) REFERENCES tournaments (id),
            FOREIGN KEY (team_id) REFERENCES teams (id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS score_prediction_configs (
            tournament_id TEXT PRIMARY KEY,
            points_for_win REAL NOT NULL,
            points_for_draw REAL NOT NULL,
            points_for_lose REAL NOT NULL,
            FOREIGN KEY (tournament_id) REFERENCES tournaments (id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS match_score_bet_configs (
            match_id TEXT PRIMARY KEY,
            enabled INTEGER NOT NULL,
            base_price INTEGER NOT NULL,
            base_reward REAL NOT NULL,
            bonus_multiplier REAL NOT NULL,
            platform_fee REAL NOT NULL,
            duplicate_multiplier REAL NOT NULL,
            max_bets_per_match INTEGER NOT NULL,
            allow_duplicate_bets INTEGER NOT NULL,
            max_duplicates INTEGER,
            lock_before_match INTEGER NOT NULL,
            FOREIGN KEY (match_id) REFERENCES matches (id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS champion_prediction_configs (
            tournament_id TEXT PRIMARY KEY,
            enabled INTEGER NOT NULL,
            betting_status TEXT NOT NULL,
            allow_change_prediction INTEGER NOT NULL,
            change_deadline TEXT,
            locked_at TEXT,
            FOREIGN KEY (tournament_id) REFERENCES tournaments (id)
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_matches_status ON matches(status)",
        "CREATE INDEX IF NOT EXISTS idx_predictions_match ON predictions(match_id, status)",
        "CREATE INDEX IF NOT EXISTS idx_predictions_player ON predictions(player_id, status)",
        "CREATE INDEX IF NOT EXISTS idx_score_bets_match ON score_bets(match_id, player_id)",
        "CREATE INDEX IF NOT EXISTS idx_tournament_stats ON player_tournament_stats(tournament_id)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database initialized successfully");
    Ok(())
}

pub(crate) fn parse_ts(raw: &str) -> crate::error::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

pub(crate) fn parse_opt_ts(raw: Option<String>) -> crate::error::Result<Option<DateTime<Utc>>> {
    raw.as_deref().map(parse_ts).transpose()
}

pub(crate) fn parse_text<T: FromStr<Err = String>>(raw: &str) -> crate::error::Result<T> {
    raw.parse().map_err(ScoringError::CorruptRecord)
}

/// Single-connection in-memory database for tests; every call is isolated.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(
            SqliteConnectOptions::from_str("sqlite::memory:")
                .unwrap()
                .foreign_keys(true),
        )
        .await
        .unwrap();
    init_database_with_pool(&pool).await.unwrap();
    pool
}

#[cfg(test)]
pub mod test_support {
    use chrono::{DateTime, Utc};
    use sqlx::SqliteConnection;

    use super::*;
    use crate::models::{Identity, Match, MatchStatus, Team, Tournament};

    pub async fn seed_tournament(conn: &mut SqliteConnection, id: &str) {
        let tournament = Tournament {
            id: id.to_string(),
            name: format!("Tournament {}", id),
            created_at: Utc::now(),
        };
        insert_tournament(conn, &tournament).await.unwrap();
    }

    pub async fn seed_team(conn: &mut SqliteConnection, id: &str, tournament_id: &str) {
        let team = Team {
            id: id.to_string(),
            name: format!("Team {}", id),
            tournament_id: tournament_id.to_string(),
            is_eliminated: false,
            created_at: Utc::now(),
        };
        insert_team(conn, &team).await.unwrap();
    }

    /// Upcoming match with its own two teams inside `tournament_id`.
    pub fn upcoming_match(id: &str, tournament_id: &str, kickoff_at: DateTime<Utc>) -> Match {
        let now = Utc::now();
        Match {
            id: id.to_string(),
            tournament_id: Some(tournament_id.to_string()),
            home_team_id: format!("{}-home", id),
            away_team_id: format!("{}-away", id),
            kickoff_at,
            venue: None,
            stage: None,
            status: MatchStatus::Upcoming,
            home_score: None,
            away_score: None,
            outcome: None,
            weight: 1.0,
            outcome_points: 1.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn seed_match(conn: &mut SqliteConnection, match_data: &Match) {
        let tournament_id = match_data.tournament_id.as_deref().unwrap_or("t1");
        if get_tournament_by_id(conn, tournament_id).await.unwrap().is_none() {
            seed_tournament(conn, tournament_id).await;
        }
        seed_team(conn, &match_data.home_team_id, tournament_id).await;
        seed_team(conn, &match_data.away_team_id, tournament_id).await;
        insert_match(conn, match_data).await.unwrap();
    }

    pub async fn seed_player(conn: &mut SqliteConnection, email: &str, name: &str) -> String {
        let identity = Identity {
            email: email.to_string(),
            display_name: Some(name.to_string()),
        };
        resolve_or_create_player(conn, &identity).await.unwrap()
    }
}
