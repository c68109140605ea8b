use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::db::{
    get_champion_config, get_match_by_id, lock_champion_config, set_team_eliminated, start_match,
};
use crate::error::{Result, ScoringError};
use crate::models::{BettingStatus, OperationResult};

/// Admin-side state changes that sit around result entry.
pub struct MatchAdmin;

impl MatchAdmin {
    /// Moves an upcoming match to live.
    pub async fn start_match(
        pool: &SqlitePool,
        match_id: &str,
        now: DateTime<Utc>,
    ) -> Result<OperationResult> {
        let mut conn = pool.acquire().await?;

        let match_data = get_match_by_id(&mut conn, match_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Match {} not found", match_id)))?;

        if !start_match(&mut conn, match_id, now).await? {
            return Err(ScoringError::Conflict(format!(
                "Match {} is {} and cannot be started",
                match_id, match_data.status
            )));
        }

        tracing::info!("Match {} is live", match_id);
        Ok(OperationResult::ok(format!("Match {} started", match_id)))
    }

    pub async fn set_team_eliminated(
        pool: &SqlitePool,
        team_id: &str,
        eliminated: bool,
    ) -> Result<OperationResult> {
        let mut conn = pool.acquire().await?;

        if !set_team_eliminated(&mut conn, team_id, eliminated).await? {
            return Err(ScoringError::NotFound(format!("Team {} not found", team_id)));
        }

        tracing::info!("Team {} eliminated = {}", team_id, eliminated);
        let message = if eliminated {
            format!("Team {} marked as eliminated", team_id)
        } else {
            format!("Team {} reinstated", team_id)
        };
        Ok(OperationResult::ok(message))
    }

    /// Closes champion picks for a tournament. Locking twice is a conflict.
    pub async fn lock_champion_predictions(
        pool: &SqlitePool,
        tournament_id: &str,
        now: DateTime<Utc>,
    ) -> Result<OperationResult> {
        let mut tx = pool.begin().await?;

        let config = get_champion_config(&mut tx, tournament_id).await?.ok_or_else(|| {
            ScoringError::NotFound(format!(
                "Champion predictions are not configured for tournament {}",
                tournament_id
            ))
        })?;

        if config.betting_status == BettingStatus::Locked
            || !lock_champion_config(&mut tx, tournament_id, now).await?
        {
            return Err(ScoringError::Conflict(format!(
                "Champion predictions for tournament {} are already locked",
                tournament_id
            )));
        }

        tx.commit().await?;

        tracing::info!("Locked champion predictions for tournament {}", tournament_id);
        Ok(OperationResult::ok(format!(
            "Champion predictions locked for tournament {}",
            tournament_id
        )))
    }
}
