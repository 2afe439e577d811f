//! Pure scoring rules: no I/O, every function is a deterministic fold over its inputs.

pub mod achievements;
pub mod aggregator;
pub mod leaderboard;
pub mod medals;

pub use achievements::{AchievementEvaluator, AchievementThresholds};
pub use aggregator::StatsAggregator;
pub use medals::{MedalEvaluator, MedalRequirements, TierRequirement};
