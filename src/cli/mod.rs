use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::db::{
    create_pool, get_matches_by_tournament, get_player_by_id, get_scored_events,
    get_tournament_by_id, get_tournament_stats, init_database_with_pool,
};
use crate::models::MatchResultInput;
use crate::services::{
    LeaderboardRanker, MatchAdmin, ResultEntryOrchestrator, ScoringEngine, ScoringPolicy,
};
use crate::utils::{accuracy_percentage, recent_form};

async fn open_pool(config: &AppConfig) -> Result<SqlitePool> {
    let pool = create_pool(&config.database_url).await?;
    init_database_with_pool(&pool).await?;
    Ok(pool)
}

pub async fn init_db(config: &AppConfig) -> Result<()> {
    open_pool(config).await?;
    println!("✅ Database ready at {}", config.database_url);
    Ok(())
}

pub async fn seed(config: &AppConfig) -> Result<()> {
    let pool = open_pool(config).await?;
    println!("🌱 Seeding demo tournament...");
    crate::db::seed_data(&pool).await?;
    println!("✅ Demo data seeded");
    Ok(())
}

pub async fn enter_result(
    config: &AppConfig,
    match_id: &str,
    home_score: i32,
    away_score: i32,
    policy: Option<ScoringPolicy>,
) -> Result<()> {
    let pool = open_pool(config).await?;
    let policy = policy.unwrap_or(config.scoring_policy);

    println!("⚽ Entering result {}-{} for match {} ({:?})", home_score, away_score, match_id, policy);

    let input = MatchResultInput {
        match_id: match_id.to_string(),
        home_score,
        away_score,
    };
    let summary = ResultEntryOrchestrator::new(policy)
        .enter_match_result(&pool, &input, Utc::now())
        .await?;

    println!("✅ {}", summary.message);
    println!("   Outcome: {}", summary.outcome);
    if summary.predictions_locked > 0 {
        println!("   🔒 Locked {} predictions that could not be scored", summary.predictions_locked);
    }
    if summary.failures > 0 {
        println!("   ⚠️  {} items failed, see logs", summary.failures);
    }

    Ok(())
}

pub async fn start_match(config: &AppConfig, match_id: &str) -> Result<()> {
    let pool = open_pool(config).await?;
    let result = MatchAdmin::start_match(&pool, match_id, Utc::now()).await?;
    println!("✅ {}", result.message);
    Ok(())
}

pub async fn list_matches(config: &AppConfig, tournament_id: &str) -> Result<()> {
    let pool = open_pool(config).await?;
    let mut conn = pool.acquire().await?;

    let Some(tournament) = get_tournament_by_id(&mut conn, tournament_id).await? else {
        println!("❌ Tournament '{}' not found", tournament_id);
        return Ok(());
    };

    let matches = get_matches_by_tournament(&mut conn, tournament_id).await?;
    println!("📅 {} ({} matches)\n", tournament.name, matches.len());

    for m in matches {
        let score = match (m.home_score, m.away_score) {
            (Some(h), Some(a)) => format!("{}-{}", h, a),
            _ => "-".to_string(),
        };
        println!(
            "   {} | {} vs {} | {} | {} | {}",
            m.id,
            m.home_team_id,
            m.away_team_id,
            m.kickoff_at.format("%Y-%m-%d %H:%M"),
            m.status,
            score
        );
    }

    Ok(())
}

pub async fn recalculate(config: &AppConfig, tournament_id: Option<&str>) -> Result<()> {
    let pool = open_pool(config).await?;
    let result = LeaderboardRanker::recalculate(&pool, tournament_id).await?;
    println!("✅ {}", result.message);
    Ok(())
}

pub async fn show_leaderboard(
    config: &AppConfig,
    tournament_id: Option<&str>,
    csv_path: Option<&str>,
    limit: usize,
) -> Result<()> {
    let pool = open_pool(config).await?;
    let entries = LeaderboardRanker::leaderboard(&pool, tournament_id).await?;

    if let Some(path) = csv_path {
        let file = std::fs::File::create(path)?;
        LeaderboardRanker::write_csv(&entries, file)?;
        println!("💾 Exported {} entries to {}", entries.len(), path);
        return Ok(());
    }

    if entries.is_empty() {
        println!("📭 Leaderboard is empty. Enter a match result first.");
        return Ok(());
    }

    let title = tournament_id
        .map(|t| format!("Tournament {}", t))
        .unwrap_or_else(|| "Global leaderboard".to_string());
    println!("🏆 {}\n", title);
    for entry in entries.iter().take(limit) {
        let stats = &entry.stats;
        println!(
            "{:>4}. {:<24} {:>7.1} pts | {}/{} correct ({:.0}%) | streak {} (best {})",
            entry.rank.map_or("-".to_string(), |r| r.to_string()),
            entry.display_name,
            stats.total_points,
            stats.total_correct,
            stats.total_predictions,
            accuracy_percentage(stats.total_correct, stats.total_predictions),
            stats.current_streak,
            stats.best_streak
        );
    }

    Ok(())
}

pub async fn show_player(
    config: &AppConfig,
    player_id: &str,
    tournament_id: Option<&str>,
) -> Result<()> {
    let pool = open_pool(config).await?;
    let mut conn = pool.acquire().await?;

    let Some(player) = get_player_by_id(&mut conn, player_id).await? else {
        println!("❌ Player '{}' not found", player_id);
        return Ok(());
    };

    let (stats, rank) = match tournament_id {
        Some(tournament_id) => match get_tournament_stats(&mut conn, player_id, tournament_id).await? {
            Some(row) => (row.stats, row.rank),
            None => {
                println!("📭 {} has no scored predictions in {}", player.display_name, tournament_id);
                return Ok(());
            }
        },
        None => (player.stats, player.rank),
    };

    let events = get_scored_events(&mut conn, player_id, tournament_id).await?;
    let streaks = ScoringEngine::calculate_streaks(&events);

    println!("👤 {} <{}>", player.display_name, player.email);
    println!("   Rank: {}", rank.map_or("-".to_string(), |r| r.to_string()));
    println!(
        "   {:.1} pts | {}/{} correct ({:.0}%)",
        stats.total_points,
        stats.total_correct,
        stats.total_predictions,
        accuracy_percentage(stats.total_correct, stats.total_predictions)
    );
    println!(
        "   Streak {} (best {}) | Form {}",
        streaks.current_streak,
        streaks.best_streak,
        recent_form(&events)
    );
    if streaks.current_streak != stats.current_streak || streaks.best_streak != stats.best_streak {
        println!("   ⚠️  Stored streaks differ from history, run `recalculate`");
    }

    Ok(())
}

pub async fn lock_champions(config: &AppConfig, tournament_id: &str) -> Result<()> {
    let pool = open_pool(config).await?;
    let result = MatchAdmin::lock_champion_predictions(&pool, tournament_id, Utc::now()).await?;
    println!("🔒 {}", result.message);
    Ok(())
}
