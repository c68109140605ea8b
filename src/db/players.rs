use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use uuid::Uuid;

use super::parse_ts;
use crate::error::Result;
use crate::models::{Identity, LeaderboardEntry, Player, PlayerTournamentStats, StatsSnapshot};

fn stats_from_row(row: &SqliteRow) -> StatsSnapshot {
    StatsSnapshot {
        total_points: row.get("total_points"),
        total_correct: row.get("total_correct"),
        total_predictions: row.get("total_predictions"),
        current_streak: row.get("current_streak"),
        best_streak: row.get("best_streak"),
    }
}

fn player_from_row(row: &SqliteRow) -> Result<Player> {
    Ok(Player {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        stats: stats_from_row(row),
        rank: row.get("rank"),
        created_at: parse_ts(&row.get::<String, _>("created_at"))?,
    })
}

fn tournament_stats_from_row(row: &SqliteRow) -> PlayerTournamentStats {
    PlayerTournamentStats {
        id: row.get("id"),
        player_id: row.get("player_id"),
        tournament_id: row.get("tournament_id"),
        stats: stats_from_row(row),
        rank: row.get("rank"),
    }
}

// Player operations

/// Looks a player up by email, creating the row on first contact.
pub async fn resolve_or_create_player(
    conn: &mut SqliteConnection,
    identity: &Identity,
) -> Result<String> {
    let email = identity.email.trim().to_lowercase();

    if let Some(id) = sqlx::query_scalar::<_, String>("SELECT id FROM players WHERE email = ?")
        .bind(&email)
        .fetch_optional(&mut *conn)
        .await?
    {
        return Ok(id);
    }

    let display_name = identity
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());

    // A concurrent first contact may insert the same email; the unique
    // index keeps one row and we read it back either way.
    sqlx::query(
        r#"
        INSERT INTO players (id, email, display_name, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(email) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&email)
    .bind(&display_name)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *conn)
    .await?;

    let id = sqlx::query_scalar::<_, String>("SELECT id FROM players WHERE email = ?")
        .bind(&email)
        .fetch_one(&mut *conn)
        .await?;

    tracing::info!("Provisioned player {} for {}", id, email);
    Ok(id)
}

pub async fn get_player_by_id(conn: &mut SqliteConnection, player_id: &str) -> Result<Option<Player>> {
    let row = sqlx::query("SELECT * FROM players WHERE id = ?")
        .bind(player_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(player_from_row).transpose()
}

pub async fn get_all_players(conn: &mut SqliteConnection) -> Result<Vec<Player>> {
    let rows = sqlx::query("SELECT * FROM players ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(player_from_row).collect()
}

pub async fn update_player_stats(
    conn: &mut SqliteConnection,
    player_id: &str,
    stats: &StatsSnapshot,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE players
        SET total_points = ?, total_correct = ?, total_predictions = ?,
            current_streak = ?, best_streak = ?
        WHERE id = ?
        "#,
    )
    .bind(stats.total_points)
    .bind(stats.total_correct)
    .bind(stats.total_predictions)
    .bind(stats.current_streak)
    .bind(stats.best_streak)
    .bind(player_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn set_player_rank(conn: &mut SqliteConnection, player_id: &str, rank: i64) -> Result<()> {
    sqlx::query("UPDATE players SET rank = ? WHERE id = ?")
        .bind(rank)
        .bind(player_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// Per-tournament stats operations

pub async fn get_tournament_stats(
    conn: &mut SqliteConnection,
    player_id: &str,
    tournament_id: &str,
) -> Result<Option<PlayerTournamentStats>> {
    let row = sqlx::query(
        "SELECT * FROM player_tournament_stats WHERE player_id = ? AND tournament_id = ?",
    )
    .bind(player_id)
    .bind(tournament_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(tournament_stats_from_row))
}

pub async fn insert_tournament_stats(
    conn: &mut SqliteConnection,
    player_id: &str,
    tournament_id: &str,
    stats: &StatsSnapshot,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO player_tournament_stats
        (id, player_id, tournament_id, total_points, total_correct, total_predictions,
         current_streak, best_streak)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(player_id)
    .bind(tournament_id)
    .bind(stats.total_points)
    .bind(stats.total_correct)
    .bind(stats.total_predictions)
    .bind(stats.current_streak)
    .bind(stats.best_streak)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_tournament_stats(
    conn: &mut SqliteConnection,
    stats_id: &str,
    stats: &StatsSnapshot,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE player_tournament_stats
        SET total_points = ?, total_correct = ?, total_predictions = ?,
            current_streak = ?, best_streak = ?
        WHERE id = ?
        "#,
    )
    .bind(stats.total_points)
    .bind(stats.total_correct)
    .bind(stats.total_predictions)
    .bind(stats.current_streak)
    .bind(stats.best_streak)
    .bind(stats_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Tournament stats rows joined with the player's display name.
pub async fn get_tournament_stats_rows(
    conn: &mut SqliteConnection,
    tournament_id: &str,
) -> Result<Vec<(PlayerTournamentStats, String)>> {
    let rows = sqlx::query(
        r#"
        SELECT s.*, p.display_name
        FROM player_tournament_stats s
        INNER JOIN players p ON p.id = s.player_id
        WHERE s.tournament_id = ?
        ORDER BY s.player_id
        "#,
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .iter()
        .map(|row| (tournament_stats_from_row(row), row.get("display_name")))
        .collect())
}

pub async fn set_tournament_rank(conn: &mut SqliteConnection, stats_id: &str, rank: i64) -> Result<()> {
    sqlx::query("UPDATE player_tournament_stats SET rank = ? WHERE id = ?")
        .bind(rank)
        .bind(stats_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// Leaderboard reads

pub async fn get_global_leaderboard(conn: &mut SqliteConnection) -> Result<Vec<LeaderboardEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM players
        ORDER BY rank IS NULL, rank, total_points DESC, id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .iter()
        .map(|row| LeaderboardEntry {
            rank: row.get("rank"),
            player_id: row.get("id"),
            display_name: row.get("display_name"),
            stats: stats_from_row(row),
        })
        .collect())
}

pub async fn get_tournament_leaderboard(
    conn: &mut SqliteConnection,
    tournament_id: &str,
) -> Result<Vec<LeaderboardEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT s.*, p.display_name
        FROM player_tournament_stats s
        INNER JOIN players p ON p.id = s.player_id
        WHERE s.tournament_id = ?
        ORDER BY s.rank IS NULL, s.rank, s.total_points DESC, s.player_id
        "#,
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .iter()
        .map(|row| LeaderboardEntry {
            rank: row.get("rank"),
            player_id: row.get("player_id"),
            display_name: row.get("display_name"),
            stats: stats_from_row(row),
        })
        .collect())
}
