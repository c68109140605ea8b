use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::{parse_opt_ts, parse_text};
use crate::error::Result;
use crate::models::{Outcome, Prediction, PredictionStatus, ScoredEvent};

fn prediction_from_row(row: &SqliteRow) -> Result<Prediction> {
    Ok(Prediction {
        id: row.get("id"),
        player_id: row.get("player_id"),
        match_id: row.get("match_id"),
        pick: parse_text::<Outcome>(&row.get::<String, _>("pick"))?,
        status: parse_text::<PredictionStatus>(&row.get::<String, _>("status"))?,
        is_correct: row.get("is_correct"),
        points_earned: row.get("points_earned"),
        submitted_at: parse_opt_ts(row.get("submitted_at"))?,
        scored_at: parse_opt_ts(row.get("scored_at"))?,
        locked_at: parse_opt_ts(row.get("locked_at"))?,
    })
}

pub async fn insert_prediction(conn: &mut SqliteConnection, prediction: &Prediction) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO predictions
        (id, player_id, match_id, pick, status, is_correct, points_earned,
         submitted_at, scored_at, locked_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&prediction.id)
    .bind(&prediction.player_id)
    .bind(&prediction.match_id)
    .bind(prediction.pick.as_str())
    .bind(prediction.status.as_str())
    .bind(prediction.is_correct)
    .bind(prediction.points_earned)
    .bind(prediction.submitted_at.map(|t| t.to_rfc3339()))
    .bind(prediction.scored_at.map(|t| t.to_rfc3339()))
    .bind(prediction.locked_at.map(|t| t.to_rfc3339()))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_prediction(
    conn: &mut SqliteConnection,
    player_id: &str,
    match_id: &str,
) -> Result<Option<Prediction>> {
    let row = sqlx::query("SELECT * FROM predictions WHERE player_id = ? AND match_id = ?")
        .bind(player_id)
        .bind(match_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(prediction_from_row).transpose()
}

/// Predictions of a match decoded one row at a time. A row that does not
/// decode comes back as an error next to its id instead of failing the load.
pub async fn get_prediction_rows_for_match(
    conn: &mut SqliteConnection,
    match_id: &str,
) -> Result<Vec<(String, Result<Prediction>)>> {
    let rows = sqlx::query("SELECT * FROM predictions WHERE match_id = ? ORDER BY rowid")
        .bind(match_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get::<String, _>("id"), prediction_from_row(row)))
        .collect())
}

/// Changes the pick of a prediction that is still open. Returns false when
/// the row was locked or scored in the meantime.
pub async fn update_prediction_pick(
    conn: &mut SqliteConnection,
    prediction_id: &str,
    pick: Outcome,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE predictions
        SET pick = ?, submitted_at = ?, status = 'submitted'
        WHERE id = ? AND status NOT IN ('locked', 'scored')
        "#,
    )
    .bind(pick.as_str())
    .bind(now.to_rfc3339())
    .bind(prediction_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Records the score of one prediction. Returns false when it was already
/// scored, so a retried item never counts twice.
pub async fn mark_prediction_scored(
    conn: &mut SqliteConnection,
    prediction_id: &str,
    is_correct: bool,
    points: f64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE predictions
        SET is_correct = ?, points_earned = ?, status = 'scored', scored_at = ?
        WHERE id = ? AND status != 'scored'
        "#,
    )
    .bind(is_correct)
    .bind(points)
    .bind(now.to_rfc3339())
    .bind(prediction_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Locks every prediction on the match that is neither locked nor scored,
/// including rows whose stored status no longer parses.
pub async fn lock_open_predictions(
    conn: &mut SqliteConnection,
    match_id: &str,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE predictions
        SET status = 'locked', locked_at = ?
        WHERE match_id = ? AND status NOT IN ('locked', 'scored')
        "#,
    )
    .bind(now.to_rfc3339())
    .bind(match_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Scored history of a player, optionally limited to one tournament, in
/// scoring order.
pub async fn get_scored_events(
    conn: &mut SqliteConnection,
    player_id: &str,
    tournament_id: Option<&str>,
) -> Result<Vec<ScoredEvent>> {
    let rows = match tournament_id {
        Some(tournament_id) => {
            sqlx::query(
                r#"
                SELECT p.is_correct, p.points_earned, p.scored_at
                FROM predictions p
                INNER JOIN matches m ON m.id = p.match_id
                WHERE p.player_id = ? AND p.status = 'scored' AND m.tournament_id = ?
                ORDER BY p.scored_at, p.rowid
                "#,
            )
            .bind(player_id)
            .bind(tournament_id)
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT is_correct, points_earned, scored_at
                FROM predictions
                WHERE player_id = ? AND status = 'scored'
                ORDER BY scored_at, rowid
                "#,
            )
            .bind(player_id)
            .fetch_all(&mut *conn)
            .await?
        }
    };

    rows.iter()
        .map(|row| {
            Ok(ScoredEvent {
                is_correct: row.get::<Option<bool>, _>("is_correct").unwrap_or(false),
                points: row.get("points_earned"),
                scored_at: parse_opt_ts(row.get("scored_at"))?,
            })
        })
        .collect()
}
