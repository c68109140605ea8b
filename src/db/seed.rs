use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use super::{
    insert_match, insert_team, insert_tournament, upsert_champion_config, upsert_score_bet_config,
    upsert_score_prediction_config,
};
use crate::models::{
    ChampionPredictionConfig, Match, MatchScoreBetConfig, MatchStatus, ScorePredictionConfig, Team,
    Tournament,
};

const DEMO_TOURNAMENT: &str = "demo_cup";

pub async fn seed_data(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tournaments")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        tracing::info!("Database already seeded ({} tournaments found), skipping.", count);
        return Ok(());
    }

    tracing::info!("Seeding database with the demo cup...");

    let mut tx = pool.begin().await?;
    seed_demo_cup(&mut tx).await?;
    tx.commit().await?;

    tracing::info!("Database seeded successfully.");
    Ok(())
}

async fn seed_demo_cup(conn: &mut SqliteConnection) -> Result<()> {
    let now = Utc::now();

    insert_tournament(
        conn,
        &Tournament {
            id: DEMO_TOURNAMENT.to_string(),
            name: "Demo Cup".to_string(),
            created_at: now,
        },
    )
    .await?;

    // (id, name)
    let teams = [
        ("arg", "Argentina"),
        ("bra", "Brazil"),
        ("fra", "France"),
        ("ger", "Germany"),
        ("esp", "Spain"),
        ("eng", "England"),
        ("por", "Portugal"),
        ("ned", "Netherlands"),
    ];

    for (id, name) in teams {
        let team = Team {
            id: id.to_string(),
            name: name.to_string(),
            tournament_id: DEMO_TOURNAMENT.to_string(),
            is_eliminated: false,
            created_at: now,
        };
        insert_team(conn, &team).await?;
    }

    // (id, home, away, days from now, stage, weight)
    let fixtures = [
        ("demo_m1", "arg", "bra", 1, "Group A", 1.0),
        ("demo_m2", "fra", "ger", 1, "Group A", 1.0),
        ("demo_m3", "esp", "eng", 2, "Group B", 1.0),
        ("demo_m4", "por", "ned", 2, "Group B", 1.0),
        ("demo_m5", "arg", "fra", 5, "Semi-final", 2.0),
        ("demo_m6", "esp", "por", 5, "Semi-final", 2.0),
    ];

    let bet_config = MatchScoreBetConfig::default();
    for (id, home, away, days, stage, weight) in fixtures {
        let match_data = Match {
            id: id.to_string(),
            tournament_id: Some(DEMO_TOURNAMENT.to_string()),
            home_team_id: home.to_string(),
            away_team_id: away.to_string(),
            kickoff_at: now + Duration::days(days),
            venue: Some("National Stadium".to_string()),
            stage: Some(stage.to_string()),
            status: MatchStatus::Upcoming,
            home_score: None,
            away_score: None,
            outcome: None,
            weight,
            outcome_points: 1.0,
            created_at: now,
            updated_at: now,
        };
        insert_match(conn, &match_data).await?;
        upsert_score_bet_config(conn, id, &bet_config).await?;
    }

    upsert_score_prediction_config(conn, DEMO_TOURNAMENT, &ScorePredictionConfig::default()).await?;
    upsert_champion_config(
        conn,
        DEMO_TOURNAMENT,
        &ChampionPredictionConfig {
            change_deadline: Some(now + Duration::days(4)),
            ..ChampionPredictionConfig::default()
        },
    )
    .await?;

    tracing::info!("Seeded {} teams and {} matches", teams.len(), fixtures.len());
    Ok(())
}
