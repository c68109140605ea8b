use sqlx::SqliteConnection;

use crate::db::{
    get_player_by_id, get_tournament_stats, insert_tournament_stats, update_player_stats,
    update_tournament_stats,
};
use crate::error::{Result, ScoringError};
use crate::models::StatsSnapshot;

/// Applies one scored prediction to the player's running totals.
///
/// Runs on the caller's connection so it shares the transaction of the
/// prediction it belongs to.
pub struct StatsAggregator;

impl StatsAggregator {
    pub async fn record_scoring_event(
        conn: &mut SqliteConnection,
        player_id: &str,
        tournament_id: Option<&str>,
        points: f64,
        is_correct: bool,
    ) -> Result<()> {
        let player = get_player_by_id(conn, player_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound(format!("Player {} not found", player_id)))?;

        let mut global = player.stats;
        global.record(points, is_correct);
        update_player_stats(conn, player_id, &global).await?;

        if let Some(tournament_id) = tournament_id {
            match get_tournament_stats(conn, player_id, tournament_id).await? {
                Some(mut row) => {
                    row.stats.record(points, is_correct);
                    update_tournament_stats(conn, &row.id, &row.stats).await?;
                }
                None => {
                    // First scored prediction in this tournament enrolls the player.
                    let mut seeded = StatsSnapshot::default();
                    seeded.record(points, is_correct);
                    insert_tournament_stats(conn, player_id, tournament_id, &seeded).await?;
                    tracing::debug!("Enrolled player {} in tournament {}", player_id, tournament_id);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_player, seed_tournament};
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_global_and_tournament_stats_accumulate() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        seed_tournament(&mut conn, "t1").await;
        let player_id = seed_player(&mut conn, "ana@example.com", "Ana").await;

        StatsAggregator::record_scoring_event(&mut conn, &player_id, Some("t1"), 3.0, true)
            .await
            .unwrap();
        StatsAggregator::record_scoring_event(&mut conn, &player_id, Some("t1"), 3.0, true)
            .await
            .unwrap();
        StatsAggregator::record_scoring_event(&mut conn, &player_id, None, 0.0, false)
            .await
            .unwrap();

        let player = get_player_by_id(&mut conn, &player_id).await.unwrap().unwrap();
        assert_eq!(player.stats.total_points, 6.0);
        assert_eq!(player.stats.total_correct, 2);
        assert_eq!(player.stats.total_predictions, 3);
        assert_eq!(player.stats.current_streak, 0);
        assert_eq!(player.stats.best_streak, 2);

        let scoped = get_tournament_stats(&mut conn, &player_id, "t1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(scoped.stats.total_predictions, 2);
        assert_eq!(scoped.stats.current_streak, 2);
    }

    #[tokio::test]
    async fn test_first_event_seeds_tournament_row() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        seed_tournament(&mut conn, "t1").await;
        let player_id = seed_player(&mut conn, "bo@example.com", "Bo").await;

        StatsAggregator::record_scoring_event(&mut conn, &player_id, Some("t1"), 1.0, true)
            .await
            .unwrap();

        let scoped = get_tournament_stats(&mut conn, &player_id, "t1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            scoped.stats,
            StatsSnapshot {
                total_points: 1.0,
                total_correct: 1,
                total_predictions: 1,
                current_streak: 1,
                best_streak: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_player_is_not_found() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let err = StatsAggregator::record_scoring_event(&mut conn, "ghost", None, 1.0, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::NotFound(_)));
    }
}
