use chrono::FixedOffset;
use serde::Deserialize;
use std::env;

use crate::error::ScoringConfigError;
use crate::scoring::{
    medals::default_tiers, AchievementThresholds, MedalRequirements, TierRequirement,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub bind_addr: String,
    pub scoring: ScoringSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Offset from UTC, in minutes, of the day boundary used for streaks.
    pub streak_utc_offset_minutes: i32,
    pub leaderboard: LeaderboardSettings,
    pub medals: Vec<TierRequirement>,
    pub achievements: AchievementThresholds,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            streak_utc_offset_minutes: 0,
            leaderboard: LeaderboardSettings::default(),
            medals: default_tiers(),
            achievements: AchievementThresholds::default(),
        }
    }
}

impl ScoringSettings {
    pub fn reference_offset(&self) -> Result<FixedOffset, ScoringConfigError> {
        self.streak_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ScoringConfigError::InvalidUtcOffset(
                self.streak_utc_offset_minutes,
            ))
    }

    pub fn medal_requirements(&self) -> Result<MedalRequirements, ScoringConfigError> {
        MedalRequirements::new(&self.medals)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LeaderboardSettings {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first (two levels up), then the local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Self::from_settings(&settings, &app_env)
    }

    pub fn from_settings(
        settings: &config::Config,
        app_env: &str,
    ) -> Result<Self, config::ConfigError> {
        let mongo_uri = match settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
        {
            Ok(uri) => uri,
            Err(_) if app_env == "prod" => {
                return Err(config::ConfigError::Message(
                    "MONGO_URI must be set in production".to_string(),
                ));
            }
            Err(_) => {
                eprintln!("WARNING: MONGO_URI not set, using local MongoDB (dev mode only!)");
                "mongodb://localhost:27017".to_string()
            }
        };

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "ducklingo".to_string());

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let scoring = match settings.get::<ScoringSettings>("scoring") {
            Ok(scoring) => scoring,
            Err(config::ConfigError::NotFound(_)) => ScoringSettings::default(),
            Err(err) => return Err(err),
        };

        Ok(Config {
            mongo_uri,
            mongo_database,
            bind_addr,
            scoring,
        })
    }
}
