use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::{parse_opt_ts, parse_text, parse_ts};
use crate::error::Result;
use crate::models::{BetStatus, ChampionPick, ScoreBet};

// Score bet operations

fn score_bet_from_row(row: &SqliteRow) -> Result<ScoreBet> {
    Ok(ScoreBet {
        id: row.get("id"),
        player_id: row.get("player_id"),
        match_id: row.get("match_id"),
        predicted_home_score: row.get("predicted_home_score"),
        predicted_away_score: row.get("predicted_away_score"),
        bet_amount: row.get("bet_amount"),
        status: parse_text::<BetStatus>(&row.get::<String, _>("status"))?,
        is_correct: row.get("is_correct"),
        payout: row.get("payout"),
        created_at: parse_ts(&row.get::<String, _>("created_at"))?,
        scored_at: parse_opt_ts(row.get("scored_at"))?,
    })
}

pub async fn insert_score_bet(conn: &mut SqliteConnection, bet: &ScoreBet) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO score_bets
        (id, player_id, match_id, predicted_home_score, predicted_away_score, bet_amount,
         status, is_correct, payout, created_at, scored_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&bet.id)
    .bind(&bet.player_id)
    .bind(&bet.match_id)
    .bind(bet.predicted_home_score)
    .bind(bet.predicted_away_score)
    .bind(bet.bet_amount)
    .bind(bet.status.as_str())
    .bind(bet.is_correct)
    .bind(bet.payout)
    .bind(bet.created_at.to_rfc3339())
    .bind(bet.scored_at.map(|t| t.to_rfc3339()))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Score bets of a match decoded one row at a time, each next to its id.
pub async fn get_score_bet_rows_for_match(
    conn: &mut SqliteConnection,
    match_id: &str,
) -> Result<Vec<(String, Result<ScoreBet>)>> {
    let rows = sqlx::query("SELECT * FROM score_bets WHERE match_id = ? ORDER BY created_at, rowid")
        .bind(match_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get::<String, _>("id"), score_bet_from_row(row)))
        .collect())
}

pub async fn get_player_score_bets(
    conn: &mut SqliteConnection,
    player_id: &str,
    match_id: &str,
) -> Result<Vec<ScoreBet>> {
    let rows = sqlx::query(
        "SELECT * FROM score_bets WHERE player_id = ? AND match_id = ? ORDER BY created_at, rowid",
    )
    .bind(player_id)
    .bind(match_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(score_bet_from_row).collect()
}

/// Settles a pending bet. Returns false when it was settled already.
pub async fn settle_score_bet(
    conn: &mut SqliteConnection,
    bet_id: &str,
    is_correct: bool,
    payout: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let status = if is_correct { BetStatus::Won } else { BetStatus::Lost };
    let result = sqlx::query(
        r#"
        UPDATE score_bets
        SET is_correct = ?, payout = ?, status = ?, scored_at = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(is_correct)
    .bind(payout)
    .bind(status.as_str())
    .bind(now.to_rfc3339())
    .bind(bet_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

// Champion pick operations

pub async fn get_champion_pick(
    conn: &mut SqliteConnection,
    player_id: &str,
    tournament_id: &str,
) -> Result<Option<ChampionPick>> {
    let row = sqlx::query("SELECT * FROM champion_picks WHERE player_id = ? AND tournament_id = ?")
        .bind(player_id)
        .bind(tournament_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(|row| {
        Ok(ChampionPick {
            id: row.get("id"),
            player_id: row.get("player_id"),
            tournament_id: row.get("tournament_id"),
            team_id: row.get("team_id"),
            picked_at: parse_ts(&row.get::<String, _>("picked_at"))?,
            submitted_at: parse_ts(&row.get::<String, _>("submitted_at"))?,
        })
    })
    .transpose()
}

pub async fn insert_champion_pick(conn: &mut SqliteConnection, pick: &ChampionPick) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO champion_picks (id, player_id, tournament_id, team_id, picked_at, submitted_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&pick.id)
    .bind(&pick.player_id)
    .bind(&pick.tournament_id)
    .bind(&pick.team_id)
    .bind(pick.picked_at.to_rfc3339())
    .bind(pick.submitted_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_champion_pick_team(
    conn: &mut SqliteConnection,
    pick_id: &str,
    team_id: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE champion_picks SET team_id = ?, picked_at = ?, submitted_at = ? WHERE id = ?")
        .bind(team_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(pick_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
