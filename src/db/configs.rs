use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection};

use super::{parse_opt_ts, parse_text};
use crate::error::Result;
use crate::models::{
    BettingStatus, ChampionPredictionConfig, MatchScoreBetConfig, ScorePredictionConfig,
};

/// Falls back to the default points table when the tournament has none.
pub async fn get_score_prediction_config(
    conn: &mut SqliteConnection,
    tournament_id: Option<&str>,
) -> Result<ScorePredictionConfig> {
    let Some(tournament_id) = tournament_id else {
        return Ok(ScorePredictionConfig::default());
    };

    let row = sqlx::query("SELECT * FROM score_prediction_configs WHERE tournament_id = ?")
        .bind(tournament_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row
        .map(|row| ScorePredictionConfig {
            points_for_win: row.get("points_for_win"),
            points_for_draw: row.get("points_for_draw"),
            points_for_lose: row.get("points_for_lose"),
        })
        .unwrap_or_default())
}

pub async fn upsert_score_prediction_config(
    conn: &mut SqliteConnection,
    tournament_id: &str,
    config: &ScorePredictionConfig,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO score_prediction_configs
        (tournament_id, points_for_win, points_for_draw, points_for_lose)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(tournament_id)
    .bind(config.points_for_win)
    .bind(config.points_for_draw)
    .bind(config.points_for_lose)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_score_bet_config(
    conn: &mut SqliteConnection,
    match_id: &str,
) -> Result<Option<MatchScoreBetConfig>> {
    let row = sqlx::query("SELECT * FROM match_score_bet_configs WHERE match_id = ?")
        .bind(match_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(|row| MatchScoreBetConfig {
        enabled: row.get("enabled"),
        base_price: row.get("base_price"),
        base_reward: row.get("base_reward"),
        bonus_multiplier: row.get("bonus_multiplier"),
        platform_fee: row.get("platform_fee"),
        duplicate_multiplier: row.get("duplicate_multiplier"),
        max_bets_per_match: row.get("max_bets_per_match"),
        allow_duplicate_bets: row.get("allow_duplicate_bets"),
        max_duplicates: row.get("max_duplicates"),
        lock_before_match: row.get("lock_before_match"),
    }))
}

pub async fn upsert_score_bet_config(
    conn: &mut SqliteConnection,
    match_id: &str,
    config: &MatchScoreBetConfig,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO match_score_bet_configs
        (match_id, enabled, base_price, base_reward, bonus_multiplier, platform_fee,
         duplicate_multiplier, max_bets_per_match, allow_duplicate_bets, max_duplicates,
         lock_before_match)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(match_id)
    .bind(config.enabled)
    .bind(config.base_price)
    .bind(config.base_reward)
    .bind(config.bonus_multiplier)
    .bind(config.platform_fee)
    .bind(config.duplicate_multiplier)
    .bind(config.max_bets_per_match)
    .bind(config.allow_duplicate_bets)
    .bind(config.max_duplicates)
    .bind(config.lock_before_match)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_champion_config(
    conn: &mut SqliteConnection,
    tournament_id: &str,
) -> Result<Option<ChampionPredictionConfig>> {
    let row = sqlx::query("SELECT * FROM champion_prediction_configs WHERE tournament_id = ?")
        .bind(tournament_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(|row| {
        Ok(ChampionPredictionConfig {
            enabled: row.get("enabled"),
            betting_status: parse_text::<BettingStatus>(&row.get::<String, _>("betting_status"))?,
            allow_change_prediction: row.get("allow_change_prediction"),
            change_deadline: parse_opt_ts(row.get("change_deadline"))?,
            locked_at: parse_opt_ts(row.get("locked_at"))?,
        })
    })
    .transpose()
}

pub async fn upsert_champion_config(
    conn: &mut SqliteConnection,
    tournament_id: &str,
    config: &ChampionPredictionConfig,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO champion_prediction_configs
        (tournament_id, enabled, betting_status, allow_change_prediction, change_deadline, locked_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tournament_id)
    .bind(config.enabled)
    .bind(config.betting_status.as_str())
    .bind(config.allow_change_prediction)
    .bind(config.change_deadline.map(|t| t.to_rfc3339()))
    .bind(config.locked_at.map(|t| t.to_rfc3339()))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Moves champion betting to `locked`. Returns false when it already was.
pub async fn lock_champion_config(
    conn: &mut SqliteConnection,
    tournament_id: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE champion_prediction_configs
        SET betting_status = 'locked', locked_at = ?
        WHERE tournament_id = ? AND betting_status != 'locked'
        "#,
    )
    .bind(now.to_rfc3339())
    .bind(tournament_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
