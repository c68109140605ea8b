use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod config;
pub mod stats;

pub use config::*;
pub use stats::*;

/// Declares a lowercase string-backed enum stored as TEXT.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "'{}' is not a valid {}",
                        other,
                        stringify!($name)
                    )),
                }
            }
        }
    };
}

text_enum!(Outcome {
    Home => "home",
    Draw => "draw",
    Away => "away",
});

text_enum!(MatchStatus {
    Upcoming => "upcoming",
    Live => "live",
    Finished => "finished",
});

text_enum!(PredictionStatus {
    Draft => "draft",
    Submitted => "submitted",
    Locked => "locked",
    Scored => "scored",
});

text_enum!(BetStatus {
    Pending => "pending",
    Won => "won",
    Lost => "lost",
});

text_enum!(BettingStatus {
    Open => "open",
    Locked => "locked",
    Closed => "closed",
});

impl PredictionStatus {
    /// Locked and scored predictions can no longer change their pick.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Locked | Self::Scored)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub tournament_id: String,
    pub is_eliminated: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub tournament_id: Option<String>,
    pub home_team_id: String,
    pub away_team_id: String,
    pub kickoff_at: DateTime<Utc>,
    pub venue: Option<String>,
    pub stage: Option<String>,
    pub status: MatchStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub outcome: Option<Outcome>,
    /// Multiplier for the weighted scoring policy (finals worth more).
    pub weight: f64,
    /// Base points for a correct pick under the flat scoring policy.
    pub outcome_points: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub player_id: String,
    pub match_id: String,
    pub pick: Outcome,
    pub status: PredictionStatus,
    pub is_correct: Option<bool>,
    pub points_earned: f64,
    pub submitted_at: Option<DateTime<Utc>>,
    pub scored_at: Option<DateTime<Utc>>,
    pub locked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBet {
    pub id: String,
    pub player_id: String,
    pub match_id: String,
    pub predicted_home_score: i32,
    pub predicted_away_score: i32,
    pub bet_amount: i64,
    pub status: BetStatus,
    pub is_correct: Option<bool>,
    pub payout: i64,
    pub created_at: DateTime<Utc>,
    pub scored_at: Option<DateTime<Utc>>,
}

impl ScoreBet {
    pub fn is_same_score(&self, other: &ScoreBet) -> bool {
        self.predicted_home_score == other.predicted_home_score
            && self.predicted_away_score == other.predicted_away_score
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChampionPick {
    pub id: String,
    pub player_id: String,
    pub tournament_id: String,
    pub team_id: String,
    pub picked_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(flatten)]
    pub stats: StatsSnapshot,
    pub rank: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTournamentStats {
    pub id: String,
    pub player_id: String,
    pub tournament_id: String,
    #[serde(flatten)]
    pub stats: StatsSnapshot,
    pub rank: Option<i64>,
}

/// External identity handed over by whatever authenticates the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub display_name: Option<String>,
}

// Operation inputs

/// Highest goal count accepted for a result or an exact-score bet.
pub const MAX_SCORE: i32 = 99;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionInput {
    pub match_id: String,
    /// Kept as raw text so a malformed pick is reported per item.
    pub pick: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBetInput {
    pub match_id: String,
    pub home_score: i32,
    pub away_score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChampionPickInput {
    pub team_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResultInput {
    pub match_id: String,
    pub home_score: i32,
    pub away_score: i32,
}

// Operation outputs

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    pub match_id: String,
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub failures: Vec<ItemFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResultSummary {
    pub success: bool,
    pub message: String,
    pub outcome: Outcome,
    pub predictions_scored: usize,
    pub score_bets_scored: usize,
    pub predictions_locked: u64,
    pub failures: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: Option<i64>,
    pub player_id: String,
    pub display_name: String,
    #[serde(flatten)]
    pub stats: StatsSnapshot,
}

// API Response types
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}
