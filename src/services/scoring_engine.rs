use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{
    Match, MatchScoreBetConfig, Outcome, ScoreBet, ScorePredictionConfig, ScoredEvent,
    StatsSnapshot,
};

/// How a finished match turns a win/draw/lose pick into points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// `outcome_points` of the match for a correct pick, nothing otherwise.
    #[default]
    FlatOutcomePoints,
    /// Win/draw/lose table of the tournament, scaled by the match weight.
    WeightedOutcome,
}

impl FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flat" | "flat_outcome_points" => Ok(Self::FlatOutcomePoints),
            "weighted" | "weighted_outcome" => Ok(Self::WeightedOutcome),
            other => Err(format!("unknown scoring policy '{}'", other)),
        }
    }
}

impl ScoringPolicy {
    /// Points earned by `pick` on a finished match.
    pub fn points_for(
        &self,
        pick: Outcome,
        outcome: Outcome,
        match_data: &Match,
        config: &ScorePredictionConfig,
    ) -> f64 {
        match self {
            Self::FlatOutcomePoints => {
                if pick == outcome {
                    match_data.outcome_points
                } else {
                    0.0
                }
            }
            Self::WeightedOutcome => {
                ScoringEngine::score_prediction(pick, outcome, match_data.weight, config)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current_streak: i64,
    pub best_streak: i64,
}

/// Stateless scoring formulas.
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn determine_outcome(home_score: i32, away_score: i32) -> Outcome {
        match home_score.cmp(&away_score) {
            std::cmp::Ordering::Greater => Outcome::Home,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::Away,
        }
    }

    /// Weighted win/draw/lose points.
    ///
    /// A wrong pick still earns the draw points whenever the pick or the
    /// actual outcome is a draw. A zero or NaN weight counts as 1.
    pub fn score_prediction(
        pick: Outcome,
        actual: Outcome,
        weight: f64,
        config: &ScorePredictionConfig,
    ) -> f64 {
        let weight = if weight == 0.0 || weight.is_nan() { 1.0 } else { weight };

        if pick == actual {
            config.points_for_win * weight
        } else if pick == Outcome::Draw || actual == Outcome::Draw {
            config.points_for_draw * weight
        } else {
            config.points_for_lose * weight
        }
    }

    /// Payout of a winning exact-score bet. Callers only pass bets whose
    /// score matched; losing bets pay 0 without coming through here.
    pub fn calculate_score_bet_payout(
        bet: &ScoreBet,
        all_bets_for_match: &[ScoreBet],
        config: &MatchScoreBetConfig,
    ) -> i64 {
        let duplicate_count = all_bets_for_match
            .iter()
            .filter(|other| other.player_id == bet.player_id && other.is_same_score(bet))
            .count();

        let effective_multiplier = if duplicate_count > 1 {
            config.duplicate_multiplier
        } else {
            1.0
        };

        let payout = config.base_reward
            * effective_multiplier
            * config.bonus_multiplier
            * (1.0 - config.platform_fee / 100.0);

        payout.round() as i64
    }

    /// Current and best run of correct predictions, oldest first by
    /// `scored_at`.
    pub fn calculate_streaks(predictions: &[ScoredEvent]) -> Streaks {
        let stats = StatsSnapshot::rebuild(predictions);
        Streaks {
            current_streak: stats.current_streak,
            best_streak: stats.best_streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BetStatus, MatchStatus};
    use chrono::{TimeZone, Utc};

    fn bet(player: &str, home: i32, away: i32) -> ScoreBet {
        ScoreBet {
            id: format!("{}-{}-{}", player, home, away),
            player_id: player.to_string(),
            match_id: "m1".to_string(),
            predicted_home_score: home,
            predicted_away_score: away,
            bet_amount: 50_000,
            status: BetStatus::Pending,
            is_correct: None,
            payout: 0,
            created_at: Utc::now(),
            scored_at: None,
        }
    }

    fn finished_match(weight: f64, outcome_points: f64) -> Match {
        let now = Utc::now();
        Match {
            id: "m1".to_string(),
            tournament_id: None,
            home_team_id: "h".to_string(),
            away_team_id: "a".to_string(),
            kickoff_at: now,
            venue: None,
            stage: None,
            status: MatchStatus::Finished,
            home_score: Some(2),
            away_score: Some(0),
            outcome: Some(Outcome::Home),
            weight,
            outcome_points,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_determine_outcome() {
        assert_eq!(ScoringEngine::determine_outcome(3, 1), Outcome::Home);
        assert_eq!(ScoringEngine::determine_outcome(1, 3), Outcome::Away);
        assert_eq!(ScoringEngine::determine_outcome(2, 2), Outcome::Draw);
        assert_eq!(ScoringEngine::determine_outcome(0, 0), Outcome::Draw);
    }

    #[test]
    fn test_score_prediction_formula() {
        let config = ScorePredictionConfig::default();
        assert_eq!(
            ScoringEngine::score_prediction(Outcome::Home, Outcome::Home, 2.0, &config),
            6.0
        );
        assert_eq!(
            ScoringEngine::score_prediction(Outcome::Away, Outcome::Home, 1.0, &config),
            0.0
        );
        // Draw pick earns partial credit even though it is wrong.
        assert_eq!(
            ScoringEngine::score_prediction(Outcome::Draw, Outcome::Home, 1.0, &config),
            1.0
        );
        // Same when the match itself was drawn.
        assert_eq!(
            ScoringEngine::score_prediction(Outcome::Home, Outcome::Draw, 1.0, &config),
            1.0
        );
    }

    #[test]
    fn test_score_prediction_weighted_scenario() {
        let config = ScorePredictionConfig {
            points_for_win: 3.0,
            points_for_draw: 1.0,
            points_for_lose: 0.0,
        };
        let points: Vec<f64> = [Outcome::Home, Outcome::Draw, Outcome::Away]
            .iter()
            .map(|pick| ScoringEngine::score_prediction(*pick, Outcome::Home, 2.0, &config))
            .collect();
        assert_eq!(points, vec![6.0, 2.0, 0.0]);
    }

    #[test]
    fn test_score_prediction_zero_weight_counts_as_one() {
        let config = ScorePredictionConfig::default();
        assert_eq!(
            ScoringEngine::score_prediction(Outcome::Away, Outcome::Away, 0.0, &config),
            3.0
        );
    }

    #[test]
    fn test_single_bet_payout_with_defaults() {
        let config = MatchScoreBetConfig::default();
        let winning = bet("alice", 2, 1);
        let all = vec![winning.clone(), bet("bob", 2, 1), bet("alice", 0, 0)];
        assert_eq!(
            ScoringEngine::calculate_score_bet_payout(&winning, &all, &config),
            285_000
        );
    }

    #[test]
    fn test_duplicate_bet_payout_doubles() {
        let config = MatchScoreBetConfig::default();
        let first = bet("alice", 2, 1);
        let mut second = bet("alice", 2, 1);
        second.id = "dup".to_string();
        let all = vec![first.clone(), second];
        assert_eq!(
            ScoringEngine::calculate_score_bet_payout(&first, &all, &config),
            570_000
        );
    }

    #[test]
    fn test_calculate_streaks() {
        let at = |m| Some(Utc.with_ymd_and_hms(2024, 6, 1, 18, m, 0).unwrap());
        let events = vec![
            ScoredEvent { is_correct: true, points: 1.0, scored_at: at(0) },
            ScoredEvent { is_correct: true, points: 1.0, scored_at: at(1) },
            ScoredEvent { is_correct: false, points: 0.0, scored_at: at(2) },
            ScoredEvent { is_correct: true, points: 1.0, scored_at: at(3) },
        ];
        assert_eq!(
            ScoringEngine::calculate_streaks(&events),
            Streaks { current_streak: 1, best_streak: 2 }
        );
        assert_eq!(ScoringEngine::calculate_streaks(&[]), Streaks::default());
    }

    #[test]
    fn test_policies_diverge() {
        let config = ScorePredictionConfig::default();
        let m = finished_match(2.0, 1.0);

        let flat = ScoringPolicy::FlatOutcomePoints;
        assert_eq!(flat.points_for(Outcome::Home, Outcome::Home, &m, &config), 1.0);
        assert_eq!(flat.points_for(Outcome::Draw, Outcome::Home, &m, &config), 0.0);

        let weighted = ScoringPolicy::WeightedOutcome;
        assert_eq!(weighted.points_for(Outcome::Home, Outcome::Home, &m, &config), 6.0);
        assert_eq!(weighted.points_for(Outcome::Draw, Outcome::Home, &m, &config), 2.0);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("weighted".parse::<ScoringPolicy>(), Ok(ScoringPolicy::WeightedOutcome));
        assert_eq!("Flat".parse::<ScoringPolicy>(), Ok(ScoringPolicy::FlatOutcomePoints));
        assert!("bonus".parse::<ScoringPolicy>().is_err());
    }
}
