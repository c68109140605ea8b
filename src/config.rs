use anyhow::{Context, Result};
use std::env;

use crate::services::ScoringPolicy;

/// Process-level settings. Game rules live in the database, not here.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub scoring_policy: ScoringPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:../data/matchday.db".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a number")?,
            Err(_) => 3000,
        };

        let scoring_policy = match env::var("SCORING_POLICY") {
            Ok(raw) => raw
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid SCORING_POLICY")?,
            Err(_) => ScoringPolicy::default(),
        };

        Ok(Self {
            database_url,
            port,
            scoring_policy,
        })
    }
}
