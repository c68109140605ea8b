use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scored prediction as seen by the aggregate fold.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEvent {
    pub is_correct: bool,
    pub points: f64,
    pub scored_at: Option<DateTime<Utc>>,
}

/// Running aggregate over a player's scored predictions.
///
/// Both the incremental per-result update and the full leaderboard rebuild
/// go through [`StatsSnapshot::record`], so the two paths share one formula.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_points: f64,
    pub total_correct: i64,
    pub total_predictions: i64,
    pub current_streak: i64,
    pub best_streak: i64,
}

impl StatsSnapshot {
    pub fn record(&mut self, points: f64, is_correct: bool) {
        self.total_points += points;
        self.total_predictions += 1;
        if is_correct {
            self.total_correct += 1;
            self.current_streak += 1;
        } else {
            self.current_streak = 0;
        }
        self.best_streak = self.best_streak.max(self.current_streak);
    }

    /// Rebuilds from history, oldest first. Missing timestamps sort as epoch 0.
    pub fn rebuild(events: &[ScoredEvent]) -> Self {
        let mut ordered: Vec<&ScoredEvent> = events.iter().collect();
        ordered.sort_by_key(|e| e.scored_at.unwrap_or(DateTime::UNIX_EPOCH));

        let mut stats = Self::default();
        for event in ordered {
            stats.record(event.points, event.is_correct);
        }
        stats
    }
}
