use sqlx::{SqliteConnection, SqlitePool};
use std::cmp::Ordering;

use crate::db::{
    get_all_players, get_global_leaderboard, get_scored_events, get_tournament_by_id,
    get_tournament_leaderboard, get_tournament_stats_rows, set_player_rank, set_tournament_rank,
    update_player_stats, update_tournament_stats,
};
use crate::error::{Result, ScoringError};
use crate::models::{LeaderboardEntry, OperationResult, StatsSnapshot};
use crate::utils::{accuracy_percentage, name_sort_key};

/// Rebuilds stats from scored predictions and assigns dense 1..N ranks.
pub struct LeaderboardRanker;

struct Ranked {
    key: String,
    player_id: String,
    name_key: String,
    stats: StatsSnapshot,
}

impl LeaderboardRanker {
    /// Recalculates the global board, or one tournament's board when
    /// `tournament_id` is given. The whole scope is rewritten in one
    /// transaction so readers never see a half-ranked board.
    pub async fn recalculate(pool: &SqlitePool, tournament_id: Option<&str>) -> Result<OperationResult> {
        let mut tx = pool.begin().await?;

        let ranked = match tournament_id {
            None => Self::recalculate_global(&mut tx).await?,
            Some(tournament_id) => Self::recalculate_tournament(&mut tx, tournament_id).await?,
        };

        tx.commit().await?;

        let scope = tournament_id
            .map(|t| format!("tournament {}", t))
            .unwrap_or_else(|| "global leaderboard".to_string());
        tracing::info!("Recalculated {} ({} players)", scope, ranked);

        Ok(OperationResult::ok(format!(
            "Recalculated {} for {} players",
            scope, ranked
        )))
    }

    pub async fn leaderboard(
        pool: &SqlitePool,
        tournament_id: Option<&str>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let mut conn = pool.acquire().await?;
        match tournament_id {
            None => get_global_leaderboard(&mut conn).await,
            Some(tournament_id) => {
                if get_tournament_by_id(&mut conn, tournament_id).await?.is_none() {
                    return Err(ScoringError::NotFound(format!(
                        "Tournament {} not found",
                        tournament_id
                    )));
                }
                get_tournament_leaderboard(&mut conn, tournament_id).await
            }
        }
    }

    /// Writes a board as CSV, one row per entry in board order.
    pub fn write_csv<W: std::io::Write>(entries: &[LeaderboardEntry], writer: W) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record([
            "rank",
            "player_id",
            "display_name",
            "total_points",
            "total_correct",
            "total_predictions",
            "accuracy",
            "current_streak",
            "best_streak",
        ])?;

        for entry in entries {
            let stats = &entry.stats;
            writer.write_record(&[
                entry.rank.map(|r| r.to_string()).unwrap_or_default(),
                entry.player_id.clone(),
                entry.display_name.clone(),
                stats.total_points.to_string(),
                stats.total_correct.to_string(),
                stats.total_predictions.to_string(),
                format!(
                    "{:.1}",
                    accuracy_percentage(stats.total_correct, stats.total_predictions)
                ),
                stats.current_streak.to_string(),
                stats.best_streak.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    async fn recalculate_global(conn: &mut SqliteConnection) -> Result<usize> {
        let players = get_all_players(conn).await?;
        let mut ranked = Vec::with_capacity(players.len());

        for player in players {
            let events = get_scored_events(conn, &player.id, None).await?;
            let stats = StatsSnapshot::rebuild(&events);
            if stats != player.stats {
                tracing::debug!("Corrected drifted stats for player {}", player.id);
            }
            update_player_stats(conn, &player.id, &stats).await?;
            ranked.push(Ranked {
                key: player.id.clone(),
                player_id: player.id,
                name_key: String::new(),
                stats,
            });
        }

        // Global ties fall back to player id only.
        ranked.sort_by(|a, b| by_points(a, b).then_with(|| a.player_id.cmp(&b.player_id)));

        for (index, entry) in ranked.iter().enumerate() {
            set_player_rank(conn, &entry.key, index as i64 + 1).await?;
        }
        Ok(ranked.len())
    }

    async fn recalculate_tournament(conn: &mut SqliteConnection, tournament_id: &str) -> Result<usize> {
        if get_tournament_by_id(conn, tournament_id).await?.is_none() {
            return Err(ScoringError::NotFound(format!(
                "Tournament {} not found",
                tournament_id
            )));
        }

        let rows = get_tournament_stats_rows(conn, tournament_id).await?;
        let mut ranked = Vec::with_capacity(rows.len());

        for (row, display_name) in rows {
            let events = get_scored_events(conn, &row.player_id, Some(tournament_id)).await?;
            let stats = StatsSnapshot::rebuild(&events);
            update_tournament_stats(conn, &row.id, &stats).await?;
            ranked.push(Ranked {
                key: row.id,
                player_id: row.player_id,
                name_key: name_sort_key(&display_name),
                stats,
            });
        }

        ranked.sort_by(|a, b| {
            by_points(a, b)
                .then_with(|| a.name_key.cmp(&b.name_key))
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        for (index, entry) in ranked.iter().enumerate() {
            set_tournament_rank(conn, &entry.key, index as i64 + 1).await?;
        }
        Ok(ranked.len())
    }
}

fn by_points(a: &Ranked, b: &Ranked) -> Ordering {
    b.stats.total_points.total_cmp(&a.stats.total_points)
}
