use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::{parse_text, parse_ts};
use crate::error::Result;
use crate::models::{Match, MatchStatus, Outcome, Team, Tournament};

// Tournament operations

pub async fn insert_tournament(conn: &mut SqliteConnection, tournament: &Tournament) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO tournaments (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&tournament.id)
        .bind(&tournament.name)
        .bind(tournament.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn get_tournament_by_id(
    conn: &mut SqliteConnection,
    tournament_id: &str,
) -> Result<Option<Tournament>> {
    let row = sqlx::query("SELECT * FROM tournaments WHERE id = ?")
        .bind(tournament_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(|row| {
        Ok(Tournament {
            id: row.get("id"),
            name: row.get("name"),
            created_at: parse_ts(&row.get::<String, _>("created_at"))?,
        })
    })
    .transpose()
}

// Team operations

pub async fn insert_team(conn: &mut SqliteConnection, team: &Team) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO teams (id, name, tournament_id, is_eliminated, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&team.id)
    .bind(&team.name)
    .bind(&team.tournament_id)
    .bind(team.is_eliminated)
    .bind(team.created_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_team_by_id(conn: &mut SqliteConnection, team_id: &str) -> Result<Option<Team>> {
    let row = sqlx::query("SELECT * FROM teams WHERE id = ?")
        .bind(team_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(|row| {
        Ok(Team {
            id: row.get("id"),
            name: row.get("name"),
            tournament_id: row.get("tournament_id"),
            is_eliminated: row.get("is_eliminated"),
            created_at: parse_ts(&row.get::<String, _>("created_at"))?,
        })
    })
    .transpose()
}

/// Returns false when the team does not exist.
pub async fn set_team_eliminated(
    conn: &mut SqliteConnection,
    team_id: &str,
    eliminated: bool,
) -> Result<bool> {
    let result = sqlx::query("UPDATE teams SET is_eliminated = ? WHERE id = ?")
        .bind(eliminated)
        .bind(team_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

// Match operations

pub async fn insert_match(conn: &mut SqliteConnection, match_data: &Match) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO matches
        (id, tournament_id, home_team_id, away_team_id, kickoff_at, venue, stage, status,
         home_score, away_score, outcome, weight, outcome_points, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&match_data.id)
    .bind(&match_data.tournament_id)
    .bind(&match_data.home_team_id)
    .bind(&match_data.away_team_id)
    .bind(match_data.kickoff_at.to_rfc3339())
    .bind(&match_data.venue)
    .bind(&match_data.stage)
    .bind(match_data.status.as_str())
    .bind(match_data.home_score)
    .bind(match_data.away_score)
    .bind(match_data.outcome.map(|o| o.as_str()))
    .bind(match_data.weight)
    .bind(match_data.outcome_points)
    .bind(match_data.created_at.to_rfc3339())
    .bind(match_data.updated_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

fn match_from_row(row: &SqliteRow) -> Result<Match> {
    Ok(Match {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        home_team_id: row.get("home_team_id"),
        away_team_id: row.get("away_team_id"),
        kickoff_at: parse_ts(&row.get::<String, _>("kickoff_at"))?,
        venue: row.get("venue"),
        stage: row.get("stage"),
        status: parse_text::<MatchStatus>(&row.get::<String, _>("status"))?,
        home_score: row.get("home_score"),
        away_score: row.get("away_score"),
        outcome: row
            .get::<Option<String>, _>("outcome")
            .as_deref()
            .map(parse_text::<Outcome>)
            .transpose()?,
        weight: row.get("weight"),
        outcome_points: row.get("outcome_points"),
        created_at: parse_ts(&row.get::<String, _>("created_at"))?,
        updated_at: parse_ts(&row.get::<String, _>("updated_at"))?,
    })
}

pub async fn get_match_by_id(conn: &mut SqliteConnection, match_id: &str) -> Result<Option<Match>> {
    let row = sqlx::query("SELECT * FROM matches WHERE id = ?")
        .bind(match_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(match_from_row).transpose()
}

pub async fn get_matches_by_tournament(
    conn: &mut SqliteConnection,
    tournament_id: &str,
) -> Result<Vec<Match>> {
    let rows = sqlx::query("SELECT * FROM matches WHERE tournament_id = ? ORDER BY kickoff_at")
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(match_from_row).collect()
}

/// Write-once result guard: only a match that is not yet finished is
/// updated. Returns false when another caller finished it first.
pub async fn finish_match(
    conn: &mut SqliteConnection,
    match_id: &str,
    home_score: i32,
    away_score: i32,
    outcome: Outcome,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE matches
        SET home_score = ?, away_score = ?, outcome = ?, status = 'finished', updated_at = ?
        WHERE id = ? AND status != 'finished'
        "#,
    )
    .bind(home_score)
    .bind(away_score)
    .bind(outcome.as_str())
    .bind(now.to_rfc3339())
    .bind(match_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// `upcoming -> live`. Returns false when the match was not upcoming.
pub async fn start_match(
    conn: &mut SqliteConnection,
    match_id: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE matches SET status = 'live', updated_at = ? WHERE id = ? AND status = 'upcoming'",
    )
    .bind(now.to_rfc3339())
    .bind(match_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
