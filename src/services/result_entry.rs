use chrono::{DateTime, Utc};
use sqlx::{Connection, SqliteConnection, SqlitePool};

use crate::db::{
    finish_match, get_match_by_id, get_prediction_rows_for_match, get_score_bet_config,
    get_score_bet_rows_for_match, get_score_prediction_config, lock_open_predictions,
    mark_prediction_scored, settle_score_bet,
};
use crate::error::{Result, ScoringError};
use crate::models::{
    BetStatus, Match, MatchResultInput, MatchResultSummary, MatchScoreBetConfig, MatchStatus,
    Outcome, Prediction, PredictionStatus, ScoreBet, ScorePredictionConfig, MAX_SCORE,
};
use crate::services::{ScoringEngine, ScoringPolicy, StatsAggregator};

/// Turns an admin-entered final score into scored predictions, settled
/// score bets and updated player stats.
pub struct ResultEntryOrchestrator {
    policy: ScoringPolicy,
}

impl ResultEntryOrchestrator {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub async fn enter_match_result(
        &self,
        pool: &SqlitePool,
        input: &MatchResultInput,
        now: DateTime<Utc>,
    ) -> Result<MatchResultSummary> {
        for score in [input.home_score, input.away_score] {
            if !(0..=MAX_SCORE).contains(&score) {
                return Err(ScoringError::InvalidArgument(format!(
                    "Score {} is out of range (0-{})",
                    score, MAX_SCORE
                )));
            }
        }

        let mut conn = pool.acquire().await?;

        // Finishing the match and loading its work list commit together, so a
        // failed load leaves the match open for another attempt.
        let mut tx = conn.begin().await?;

        let match_data = get_match_by_id(&mut tx, &input.match_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Match {} not found", input.match_id)))?;

        if match_data.status == MatchStatus::Finished {
            return Err(ScoringError::Conflict(format!(
                "Result for match {} has already been entered",
                match_data.id
            )));
        }

        let outcome = ScoringEngine::determine_outcome(input.home_score, input.away_score);

        // Two admins racing: only one compare-and-set succeeds.
        if !finish_match(
            &mut tx,
            &match_data.id,
            input.home_score,
            input.away_score,
            outcome,
            now,
        )
        .await?
        {
            return Err(ScoringError::Conflict(format!(
                "Result for match {} has already been entered",
                match_data.id
            )));
        }

        let config = get_score_prediction_config(&mut tx, match_data.tournament_id.as_deref()).await?;
        let bet_config = get_score_bet_config(&mut tx, &match_data.id).await?;
        let prediction_rows = get_prediction_rows_for_match(&mut tx, &match_data.id).await?;
        let bet_rows = get_score_bet_rows_for_match(&mut tx, &match_data.id).await?;
        tx.commit().await?;

        tracing::info!(
            "Match {} finished {}-{} ({})",
            match_data.id,
            input.home_score,
            input.away_score,
            outcome
        );

        let mut failures = 0;

        let mut predictions_scored = 0;
        for (id, row) in &prediction_rows {
            let prediction = match row {
                Ok(prediction) if prediction.status == PredictionStatus::Scored => continue,
                Ok(prediction) => prediction,
                Err(e) => {
                    failures += 1;
                    tracing::warn!("Skipping unreadable prediction {}: {}", id, e);
                    continue;
                }
            };

            match self
                .score_prediction(&mut conn, &match_data, prediction, outcome, &config, now)
                .await
            {
                Ok(true) => predictions_scored += 1,
                Ok(false) => {
                    tracing::debug!("Prediction {} was already scored", prediction.id)
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!("Failed to score prediction {}: {}", prediction.id, e);
                }
            }
        }

        let mut bets = Vec::with_capacity(bet_rows.len());
        for (id, row) in bet_rows {
            match row {
                Ok(bet) => bets.push(bet),
                Err(e) => {
                    failures += 1;
                    tracing::warn!("Skipping unreadable score bet {}: {}", id, e);
                }
            }
        }

        let mut score_bets_scored = 0;
        for bet in bets.iter().filter(|b| b.status == BetStatus::Pending) {
            match Self::settle_bet(&mut conn, bet, &bets, bet_config.as_ref(), input, now).await {
                Ok(true) => score_bets_scored += 1,
                Ok(false) => tracing::debug!("Score bet {} was already settled", bet.id),
                Err(e) => {
                    failures += 1;
                    tracing::warn!("Failed to settle score bet {}: {}", bet.id, e);
                }
            }
        }

        // The result is already saved, so a failed lock is reported, not returned.
        let predictions_locked = match lock_open_predictions(&mut conn, &match_data.id, now).await {
            Ok(locked) => locked,
            Err(e) => {
                failures += 1;
                tracing::error!("Failed to lock unscored predictions on match {}: {}", match_data.id, e);
                0
            }
        };
        if predictions_locked > 0 {
            tracing::warn!(
                "Locked {} unscored predictions on match {}",
                predictions_locked,
                match_data.id
            );
        }

        tracing::info!(
            "Scored {} predictions and {} score bets for match {} ({} failures)",
            predictions_scored,
            score_bets_scored,
            match_data.id,
            failures
        );

        Ok(MatchResultSummary {
            success: true,
            message: format!(
                "Result {}-{} saved. Scored {} predictions and {} score bets",
                input.home_score, input.away_score, predictions_scored, score_bets_scored
            ),
            outcome,
            predictions_scored,
            score_bets_scored,
            predictions_locked,
            failures,
        })
    }

    /// Scores one prediction and applies its stats delta in one transaction.
    async fn score_prediction(
        &self,
        conn: &mut SqliteConnection,
        match_data: &Match,
        prediction: &Prediction,
        outcome: Outcome,
        config: &ScorePredictionConfig,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let is_correct = prediction.pick == outcome;
        let points = self
            .policy
            .points_for(prediction.pick, outcome, match_data, config);

        let mut tx = conn.begin().await?;
        if !mark_prediction_scored(&mut tx, &prediction.id, is_correct, points, now).await? {
            return Ok(false);
        }
        StatsAggregator::record_scoring_event(
            &mut tx,
            &prediction.player_id,
            match_data.tournament_id.as_deref(),
            points,
            is_correct,
        )
        .await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn settle_bet(
        conn: &mut SqliteConnection,
        bet: &ScoreBet,
        all_bets: &[ScoreBet],
        config: Option<&MatchScoreBetConfig>,
        input: &MatchResultInput,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let is_correct = bet.predicted_home_score == input.home_score
            && bet.predicted_away_score == input.away_score;

        let payout = match (is_correct, config) {
            (true, Some(config)) => ScoringEngine::calculate_score_bet_payout(bet, all_bets, config),
            (true, None) => {
                tracing::warn!(
                    "No score bet config for match {}; bet {} wins without payout",
                    bet.match_id,
                    bet.id
                );
                0
            }
            (false, _) => 0,
        };

        settle_score_bet(conn, &bet.id, is_correct, payout, now).await
    }
}
