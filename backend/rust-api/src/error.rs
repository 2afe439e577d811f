use thiserror::Error;

use crate::models::progress::MedalType;

/// Failure talking to the attempt store. Never means "no attempts".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("attempt store unavailable: {0}")]
    Unavailable(String),

    #[error("attempt store returned malformed data: {0}")]
    Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("could not retrieve attempt history: {0}")]
    Retrieval(#[from] StoreError),

    #[error("leaderboard limit must be between 1 and {max}, got {requested}")]
    InvalidLimit { requested: u32, max: u32 },
}

/// Deployment mistake in the medal table; fatal at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringConfigError {
    #[error("medal requirements are missing tier {0}")]
    MissingTier(MedalType),

    #[error("medal requirements declare tier {0} more than once")]
    DuplicateTier(MedalType),

    #[error("medal tier {0} cannot carry requirements")]
    UnawardableTier(MedalType),

    #[error("{field} threshold of {tier} must be greater than that of {previous}")]
    NonIncreasing {
        tier: MedalType,
        previous: MedalType,
        field: &'static str,
    },

    #[error("accuracy threshold of {tier} must lie within 0..=100, got {value}")]
    AccuracyOutOfRange { tier: MedalType, value: f64 },

    #[error("streak reference offset of {0} minutes is outside a day")]
    InvalidUtcOffset(i32),
}
