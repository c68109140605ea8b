pub mod leaderboard;
pub mod match_admin;
pub mod result_entry;
pub mod scoring_engine;
pub mod stats_aggregator;
pub mod submission_guard;

pub use leaderboard::*;
pub use match_admin::*;
pub use result_entry::*;
pub use scoring_engine::*;
pub use stats_aggregator::*;
pub use submission_guard::*;
