use chrono::{DateTime, Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::{
    get_champion_config, get_champion_pick, get_match_by_id, get_player_score_bets,
    get_prediction, get_score_bet_config, get_team_by_id, insert_champion_pick,
    insert_prediction, insert_score_bet, update_champion_pick_team, update_prediction_pick,
};
use crate::error::{Result, ScoringError};
use crate::models::{
    BetStatus, BettingStatus, ChampionPick, ChampionPickInput, ChampionPredictionConfig,
    ItemFailure, MatchStatus, OperationResult, Outcome, Prediction, PredictionInput,
    PredictionStatus, ScoreBet, ScoreBetInput, SubmissionReport, Team, MAX_SCORE,
};

/// Admissibility checks for player submissions. The first failing rule
/// rejects the item and nothing is written for it.
pub struct SubmissionGuard;

impl SubmissionGuard {
    /// Saves a batch of win/draw/lose picks. Items succeed or fail
    /// independently; the report carries the per-item failures.
    pub async fn submit_predictions(
        pool: &SqlitePool,
        player_id: &str,
        items: &[PredictionInput],
        now: DateTime<Utc>,
    ) -> Result<SubmissionReport> {
        if items.is_empty() {
            return Err(ScoringError::InvalidArgument(
                "No predictions submitted".to_string(),
            ));
        }

        let mut conn = pool.acquire().await?;
        let mut count = 0;
        let mut failures = Vec::new();

        for item in items {
            match Self::submit_prediction(&mut conn, player_id, item, now).await {
                Ok(()) => count += 1,
                Err(e) => {
                    if e.kind() == "internal" {
                        tracing::error!("Failed to save prediction for {}: {}", item.match_id, e);
                    } else {
                        tracing::debug!("Rejected prediction for {}: {}", item.match_id, e);
                    }
                    failures.push(ItemFailure {
                        match_id: item.match_id.clone(),
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Player {} saved {} of {} predictions",
            player_id,
            count,
            items.len()
        );

        Ok(SubmissionReport {
            success: count > 0,
            message: format!("Saved {} of {} predictions", count, items.len()),
            count,
            failures,
        })
    }

    async fn submit_prediction(
        conn: &mut SqliteConnection,
        player_id: &str,
        item: &PredictionInput,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let match_data = get_match_by_id(conn, &item.match_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Match {} not found", item.match_id)))?;

        if match_data.status != MatchStatus::Upcoming {
            return Err(ScoringError::Conflict(format!(
                "Match {} is no longer open for predictions",
                match_data.id
            )));
        }

        if now >= match_data.kickoff_at {
            return Err(ScoringError::Conflict(format!(
                "Match {} has already kicked off",
                match_data.id
            )));
        }

        let pick: Outcome = item
            .pick
            .parse()
            .map_err(|_| ScoringError::InvalidArgument(format!(
                "Invalid pick '{}': expected home, draw or away",
                item.pick
            )))?;

        if let Some(existing) = get_prediction(conn, player_id, &match_data.id).await? {
            return Self::repick(conn, &existing, pick, now).await;
        }

        let prediction = Prediction {
            id: Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            match_id: match_data.id.clone(),
            pick,
            status: PredictionStatus::Submitted,
            is_correct: None,
            points_earned: 0.0,
            submitted_at: Some(now),
            scored_at: None,
            locked_at: None,
        };

        match insert_prediction(conn, &prediction).await {
            Err(e) if e.is_unique_violation() => {
                // Lost a race with a concurrent submission of the same pair.
                let existing = get_prediction(conn, player_id, &match_data.id)
                    .await?
                    .ok_or(e)?;
                Self::repick(conn, &existing, pick, now).await
            }
            other => other,
        }
    }

    async fn repick(
        conn: &mut SqliteConnection,
        existing: &Prediction,
        pick: Outcome,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let locked = || {
            ScoringError::Conflict(format!(
                "Prediction for match {} is already locked",
                existing.match_id
            ))
        };

        if existing.status.is_final() {
            return Err(locked());
        }
        if !update_prediction_pick(conn, &existing.id, pick, now).await? {
            return Err(locked());
        }
        Ok(())
    }

    /// Places one exact-score bet.
    pub async fn submit_score_bet(
        pool: &SqlitePool,
        player_id: &str,
        input: &ScoreBetInput,
        now: DateTime<Utc>,
    ) -> Result<OperationResult> {
        let mut tx = pool.begin().await?;

        let config = get_score_bet_config(&mut tx, &input.match_id)
            .await?
            .ok_or_else(|| {
                ScoringError::NotFound(format!(
                    "Score betting is not configured for match {}",
                    input.match_id
                ))
            })?;

        if !config.enabled {
            return Err(ScoringError::Disabled(
                "Score betting is disabled for this match".to_string(),
            ));
        }

        let match_data = get_match_by_id(&mut tx, &input.match_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Match {} not found", input.match_id)))?;

        if match_data.status != MatchStatus::Upcoming {
            return Err(ScoringError::Conflict(format!(
                "Match {} is no longer open for betting",
                match_data.id
            )));
        }

        let closes_at = match_data.kickoff_at - Duration::minutes(config.lock_before_match);
        if now >= closes_at {
            return Err(ScoringError::Conflict(format!(
                "Betting window closed {} minutes before kickoff",
                config.lock_before_match
            )));
        }

        for score in [input.home_score, input.away_score] {
            if !(0..=MAX_SCORE).contains(&score) {
                return Err(ScoringError::InvalidArgument(format!(
                    "Score {} is out of range (0-{})",
                    score, MAX_SCORE
                )));
            }
        }

        let existing = get_player_score_bets(&mut tx, player_id, &match_data.id).await?;
        if existing.len() as i64 >= config.max_bets_per_match {
            return Err(ScoringError::Conflict(format!(
                "Maximum {} bets per match reached",
                config.max_bets_per_match
            )));
        }

        let identical = existing
            .iter()
            .filter(|b| {
                b.predicted_home_score == input.home_score
                    && b.predicted_away_score == input.away_score
            })
            .count() as i64;

        if !config.allow_duplicate_bets {
            if identical > 0 {
                return Err(ScoringError::Conflict(format!(
                    "You already have a bet on {}-{} for this match",
                    input.home_score, input.away_score
                )));
            }
        } else if let Some(max_duplicates) = config.max_duplicates {
            if identical >= max_duplicates {
                return Err(ScoringError::Conflict(format!(
                    "Maximum {} identical bets on {}-{} reached",
                    max_duplicates, input.home_score, input.away_score
                )));
            }
        }

        let bet = ScoreBet {
            id: Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            match_id: match_data.id.clone(),
            predicted_home_score: input.home_score,
            predicted_away_score: input.away_score,
            bet_amount: config.base_price,
            status: BetStatus::Pending,
            is_correct: None,
            payout: 0,
            created_at: now,
            scored_at: None,
        };
        insert_score_bet(&mut tx, &bet).await?;
        tx.commit().await?;

        tracing::info!(
            "Player {} bet {}-{} on match {}",
            player_id,
            bet.predicted_home_score,
            bet.predicted_away_score,
            bet.match_id
        );

        Ok(OperationResult::ok(format!(
            "Bet placed on {}-{}",
            input.home_score, input.away_score
        )))
    }

    /// Records or changes the player's tournament-winner pick. The
    /// tournament is the one the picked team plays in.
    pub async fn pick_champion(
        pool: &SqlitePool,
        player_id: &str,
        input: &ChampionPickInput,
        now: DateTime<Utc>,
    ) -> Result<OperationResult> {
        let mut tx = pool.begin().await?;

        let team = get_team_by_id(&mut tx, &input.team_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Team {} not found", input.team_id)))?;

        let config = get_champion_config(&mut tx, &team.tournament_id)
            .await?
            .ok_or_else(|| {
                ScoringError::NotFound(format!(
                    "Champion predictions are not configured for tournament {}",
                    team.tournament_id
                ))
            })?;

        if !config.enabled {
            return Err(ScoringError::Disabled(
                "Champion predictions are disabled".to_string(),
            ));
        }

        if config.betting_status != BettingStatus::Open {
            return Err(ScoringError::Conflict(format!(
                "Champion predictions are {}",
                config.betting_status
            )));
        }

        if team.is_eliminated {
            return Err(ScoringError::Conflict(format!(
                "{} has been eliminated",
                team.name
            )));
        }

        let message = match get_champion_pick(&mut tx, player_id, &team.tournament_id).await? {
            Some(existing) => {
                Self::change_champion_pick(&mut tx, &existing, &config, &team, now).await?
            }
            None => Self::save_champion_pick(&mut tx, player_id, &config, &team, now).await?,
        };

        tx.commit().await?;
        tracing::info!("Player {} picked {} as champion", player_id, team.id);
        Ok(OperationResult::ok(message))
    }

    async fn change_champion_pick(
        conn: &mut SqliteConnection,
        existing: &ChampionPick,
        config: &ChampionPredictionConfig,
        team: &Team,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if !config.allow_change_prediction {
            return Err(ScoringError::Conflict(
                "Champion pick can no longer be changed".to_string(),
            ));
        }
        if config.change_deadline.is_some_and(|deadline| now > deadline) {
            return Err(ScoringError::Conflict(
                "Champion pick change deadline has passed".to_string(),
            ));
        }
        update_champion_pick_team(conn, &existing.id, &team.id, now).await?;
        Ok(format!("Champion pick changed to {}", team.name))
    }

    async fn save_champion_pick(
        conn: &mut SqliteConnection,
        player_id: &str,
        config: &ChampionPredictionConfig,
        team: &Team,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let pick = ChampionPick {
            id: Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            tournament_id: team.tournament_id.clone(),
            team_id: team.id.clone(),
            picked_at: now,
            submitted_at: now,
        };

        match insert_champion_pick(conn, &pick).await {
            Ok(()) => Ok(format!("Champion pick saved: {}", team.name)),
            Err(e) if e.is_unique_violation() => {
                // A concurrent first pick for the same tournament got in first.
                let existing = get_champion_pick(conn, player_id, &team.tournament_id)
                    .await?
                    .ok_or(e)?;
                Self::change_champion_pick(conn, &existing, config, team, now).await
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_match, seed_player, upcoming_match};
    use crate::db::{
        get_prediction_rows_for_match, mark_prediction_scored, set_team_eliminated,
        test_pool, upsert_champion_config, upsert_score_bet_config,
    };
    use crate::models::{ChampionPredictionConfig, MatchScoreBetConfig};

    fn pick(match_id: &str, pick: &str) -> PredictionInput {
        PredictionInput {
            match_id: match_id.to_string(),
            pick: pick.to_string(),
        }
    }

    fn score(match_id: &str, home: i32, away: i32) -> ScoreBetInput {
        ScoreBetInput {
            match_id: match_id.to_string(),
            home_score: home,
            away_score: away,
        }
    }

    async fn setup(kickoff_in: Duration) -> (SqlitePool, String, DateTime<Utc>) {
        let pool = test_pool().await;
        let now = Utc::now();
        let mut conn = pool.acquire().await.unwrap();
        seed_match(&mut conn, &upcoming_match("m1", "t1", now + kickoff_in)).await;
        let player_id = seed_player(&mut conn, "ana@example.com", "Ana").await;
        drop(conn);
        (pool, player_id, now)
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let (pool, player_id, now) = setup(Duration::hours(2)).await;
        let err = SubmissionGuard::submit_predictions(&pool, &player_id, &[], now)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_resubmission_updates_single_row() {
        let (pool, player_id, now) = setup(Duration::hours(2)).await;

        SubmissionGuard::submit_predictions(&pool, &player_id, &[pick("m1", "home")], now)
            .await
            .unwrap();
        let report =
            SubmissionGuard::submit_predictions(&pool, &player_id, &[pick("m1", "away")], now)
                .await
                .unwrap();
        assert!(report.success);
        assert_eq!(report.count, 1);

        let mut conn = pool.acquire().await.unwrap();
        let rows = get_prediction_rows_for_match(&mut conn, "m1").await.unwrap();
        assert_eq!(rows.len(), 1);
        let prediction = rows[0].1.as_ref().unwrap();
        assert_eq!(prediction.pick, Outcome::Away);
        assert_eq!(prediction.status, PredictionStatus::Submitted);
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let (pool, player_id, now) = setup(Duration::hours(2)).await;
        let mut conn = pool.acquire().await.unwrap();
        seed_match(&mut conn, &upcoming_match("m2", "t1", now - Duration::minutes(1))).await;
        drop(conn);

        let items = vec![
            pick("m1", "draw"),
            pick("m2", "home"),
            pick("missing", "home"),
            pick("m1", "tie"),
        ];
        let report = SubmissionGuard::submit_predictions(&pool, &player_id, &items, now)
            .await
            .unwrap();

        assert!(report.success);
        assert_eq!(report.count, 1);
        let kinds: Vec<&str> = report.failures.iter().map(|f| f.kind.as_str()).collect();
        assert_eq!(kinds, vec!["conflict", "not_found", "invalid_argument"]);
        assert!(report.failures[0].message.contains("already kicked off"));
    }

    #[tokio::test]
    async fn test_prediction_rejected_when_match_not_upcoming() {
        let pool = test_pool().await;
        let now = Utc::now();
        let mut conn = pool.acquire().await.unwrap();
        let mut live = upcoming_match("m1", "t1", now + Duration::hours(1));
        live.status = MatchStatus::Live;
        seed_match(&mut conn, &live).await;
        let player_id = seed_player(&mut conn, "ana@example.com", "Ana").await;
        drop(conn);

        let report =
            SubmissionGuard::submit_predictions(&pool, &player_id, &[pick("m1", "home")], now)
                .await
                .unwrap();
        assert!(!report.success);
        assert!(report.failures[0].message.contains("no longer open"));
    }

    #[tokio::test]
    async fn test_scored_prediction_is_immutable() {
        let (pool, player_id, now) = setup(Duration::hours(2)).await;
        SubmissionGuard::submit_predictions(&pool, &player_id, &[pick("m1", "home")], now)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let existing = get_prediction(&mut conn, &player_id, "m1").await.unwrap().unwrap();
        mark_prediction_scored(&mut conn, &existing.id, true, 1.0, now).await.unwrap();
        drop(conn);

        let report =
            SubmissionGuard::submit_predictions(&pool, &player_id, &[pick("m1", "away")], now)
                .await
                .unwrap();
        assert_eq!(report.count, 0);
        assert!(report.failures[0].message.contains("already locked"));

        let mut conn = pool.acquire().await.unwrap();
        let row = get_prediction(&mut conn, &player_id, "m1").await.unwrap().unwrap();
        assert_eq!(row.pick, Outcome::Home);
    }

    async fn enable_bets(pool: &SqlitePool, config: MatchScoreBetConfig) {
        let mut conn = pool.acquire().await.unwrap();
        upsert_score_bet_config(&mut conn, "m1", &config).await.unwrap();
    }

    #[tokio::test]
    async fn test_fourth_score_bet_hits_cap() {
        let (pool, player_id, now) = setup(Duration::hours(2)).await;
        enable_bets(&pool, MatchScoreBetConfig::default()).await;

        for (h, a) in [(1, 0), (2, 0), (2, 1)] {
            SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", h, a), now)
                .await
                .unwrap();
        }
        let err = SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", 3, 0), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::Conflict(_)));
        assert!(err.to_string().contains("Maximum 3"));

        let mut conn = pool.acquire().await.unwrap();
        let bets = get_player_score_bets(&mut conn, &player_id, "m1").await.unwrap();
        assert_eq!(bets.len(), 3);
        assert!(bets.iter().all(|b| b.bet_amount == 50_000 && b.status == BetStatus::Pending));
    }

    #[tokio::test]
    async fn test_score_bet_window_and_range() {
        let (pool, player_id, now) = setup(Duration::minutes(20)).await;
        enable_bets(&pool, MatchScoreBetConfig::default()).await;

        let err = SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", 1, 0), now)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("window closed"));

        let relaxed = MatchScoreBetConfig {
            lock_before_match: 10,
            ..MatchScoreBetConfig::default()
        };
        enable_bets(&pool, relaxed).await;
        let err = SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", 100, 0), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidArgument(_)));
        let err = SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", 0, -1), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_score_bet_config_gates() {
        let (pool, player_id, now) = setup(Duration::hours(2)).await;

        let err = SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", 1, 0), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::NotFound(_)));

        enable_bets(
            &pool,
            MatchScoreBetConfig {
                enabled: false,
                ..MatchScoreBetConfig::default()
            },
        )
        .await;
        let err = SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", 1, 0), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::Disabled(_)));
    }

    #[tokio::test]
    async fn test_duplicate_bet_policies() {
        let (pool, player_id, now) = setup(Duration::hours(2)).await;
        enable_bets(
            &pool,
            MatchScoreBetConfig {
                allow_duplicate_bets: false,
                ..MatchScoreBetConfig::default()
            },
        )
        .await;

        SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", 2, 2), now)
            .await
            .unwrap();
        let err = SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", 2, 2), now)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already have a bet on 2-2"));

        enable_bets(
            &pool,
            MatchScoreBetConfig {
                max_duplicates: Some(2),
                ..MatchScoreBetConfig::default()
            },
        )
        .await;
        SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", 2, 2), now)
            .await
            .unwrap();
        let err = SubmissionGuard::submit_score_bet(&pool, &player_id, &score("m1", 2, 2), now)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Maximum 2 identical bets"));
    }

    async fn champion_setup(config: ChampionPredictionConfig) -> (SqlitePool, String, DateTime<Utc>) {
        let (pool, player_id, now) = setup(Duration::hours(2)).await;
        let mut conn = pool.acquire().await.unwrap();
        upsert_champion_config(&mut conn, "t1", &config).await.unwrap();
        drop(conn);
        (pool, player_id, now)
    }

    fn team(id: &str) -> ChampionPickInput {
        ChampionPickInput {
            team_id: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_champion_pick_insert_then_change() {
        let (pool, player_id, now) = champion_setup(ChampionPredictionConfig::default()).await;

        SubmissionGuard::pick_champion(&pool, &player_id, &team("m1-home"), now)
            .await
            .unwrap();
        let result = SubmissionGuard::pick_champion(&pool, &player_id, &team("m1-away"), now)
            .await
            .unwrap();
        assert!(result.message.contains("changed"));

        let mut conn = pool.acquire().await.unwrap();
        let stored = get_champion_pick(&mut conn, &player_id, "t1").await.unwrap().unwrap();
        assert_eq!(stored.team_id, "m1-away");
    }

    #[tokio::test]
    async fn test_champion_pick_insert_race_falls_back_to_change() {
        let (pool, player_id, now) = champion_setup(ChampionPredictionConfig::default()).await;
        SubmissionGuard::pick_champion(&pool, &player_id, &team("m1-home"), now)
            .await
            .unwrap();

        // The row already exists when the insert runs, as it would for the
        // slower of two simultaneous first picks.
        let mut conn = pool.acquire().await.unwrap();
        let away = get_team_by_id(&mut conn, "m1-away").await.unwrap().unwrap();
        let config = ChampionPredictionConfig::default();
        let message = SubmissionGuard::save_champion_pick(&mut conn, &player_id, &config, &away, now)
            .await
            .unwrap();
        assert!(message.contains("changed"));
        let stored = get_champion_pick(&mut conn, &player_id, "t1").await.unwrap().unwrap();
        assert_eq!(stored.team_id, "m1-away");

        let frozen = ChampionPredictionConfig {
            allow_change_prediction: false,
            ..ChampionPredictionConfig::default()
        };
        let home = get_team_by_id(&mut conn, "m1-home").await.unwrap().unwrap();
        let err = SubmissionGuard::save_champion_pick(&mut conn, &player_id, &frozen, &home, now)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_champion_pick_change_rules() {
        let frozen = ChampionPredictionConfig {
            allow_change_prediction: false,
            ..ChampionPredictionConfig::default()
        };
        let (pool, player_id, now) = champion_setup(frozen).await;
        SubmissionGuard::pick_champion(&pool, &player_id, &team("m1-home"), now)
            .await
            .unwrap();
        let err = SubmissionGuard::pick_champion(&pool, &player_id, &team("m1-away"), now)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("can no longer be changed"));

        let past_deadline = ChampionPredictionConfig {
            change_deadline: Some(now - Duration::days(1)),
            ..ChampionPredictionConfig::default()
        };
        let mut conn = pool.acquire().await.unwrap();
        upsert_champion_config(&mut conn, "t1", &past_deadline).await.unwrap();
        drop(conn);
        let err = SubmissionGuard::pick_champion(&pool, &player_id, &team("m1-away"), now)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("deadline has passed"));
    }

    #[tokio::test]
    async fn test_champion_pick_gates() {
        let locked = ChampionPredictionConfig {
            betting_status: BettingStatus::Locked,
            ..ChampionPredictionConfig::default()
        };
        let (pool, player_id, now) = champion_setup(locked).await;
        let err = SubmissionGuard::pick_champion(&pool, &player_id, &team("m1-home"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::Conflict(_)));

        let mut conn = pool.acquire().await.unwrap();
        upsert_champion_config(&mut conn, "t1", &ChampionPredictionConfig::default())
            .await
            .unwrap();
        set_team_eliminated(&mut conn, "m1-home", true).await.unwrap();
        drop(conn);
        let err = SubmissionGuard::pick_champion(&pool, &player_id, &team("m1-home"), now)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("eliminated"));

        let err = SubmissionGuard::pick_champion(&pool, &player_id, &team("nobody"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::NotFound(_)));

        let mut conn = pool.acquire().await.unwrap();
        let disabled = ChampionPredictionConfig {
            enabled: false,
            ..ChampionPredictionConfig::default()
        };
        upsert_champion_config(&mut conn, "t1", &disabled).await.unwrap();
        drop(conn);
        let err = SubmissionGuard::pick_champion(&pool, &player_id, &team("m1-away"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::Disabled(_)));
    }
}
