use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BettingStatus;

/// Points table for the weighted win/draw/lose policy, per tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorePredictionConfig {
    /// Awarded when the pick equals the outcome. Default 3.
    pub points_for_win: f64,
    /// Partial credit when either the pick or the outcome is a draw. Default 1.
    pub points_for_draw: f64,
    /// Everything else. Default 0.
    pub points_for_lose: f64,
}

impl Default for ScorePredictionConfig {
    fn default() -> Self {
        Self {
            points_for_win: 3.0,
            points_for_draw: 1.0,
            points_for_lose: 0.0,
        }
    }
}

/// Exact-score betting rules for a single match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchScoreBetConfig {
    /// Default true.
    pub enabled: bool,
    /// Stake recorded on every bet. Default 50000.
    pub base_price: i64,
    /// Default 200000.
    pub base_reward: f64,
    /// Default 1.5.
    pub bonus_multiplier: f64,
    /// Percent taken off the payout. Default 5.
    pub platform_fee: f64,
    /// Applied when a player backed the same score more than once. Default 2.0.
    pub duplicate_multiplier: f64,
    /// Default 3.
    pub max_bets_per_match: i64,
    /// Default true.
    pub allow_duplicate_bets: bool,
    /// Cap on identical bets when duplicates are allowed. Default none.
    pub max_duplicates: Option<i64>,
    /// Minutes before kickoff at which betting closes. Default 30.
    pub lock_before_match: i64,
}

impl Default for MatchScoreBetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_price: 50_000,
            base_reward: 200_000.0,
            bonus_multiplier: 1.5,
            platform_fee: 5.0,
            duplicate_multiplier: 2.0,
            max_bets_per_match: 3,
            allow_duplicate_bets: true,
            max_duplicates: None,
            lock_before_match: 30,
        }
    }
}

/// Champion-pick rules for a tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChampionPredictionConfig {
    /// Default true.
    pub enabled: bool,
    /// Default open.
    pub betting_status: BettingStatus,
    /// Default true.
    pub allow_change_prediction: bool,
    /// Picks are frozen after this instant when set. Default none.
    pub change_deadline: Option<DateTime<Utc>>,
    /// Set when an admin locks champion predictions.
    pub locked_at: Option<DateTime<Utc>>,
}

impl Default for ChampionPredictionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            betting_status: BettingStatus::Open,
            allow_change_prediction: true,
            change_deadline: None,
            locked_at: None,
        }
    }
}
