use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Medal tiers in ascending order; the derived `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedalType {
    None,
    Bronze,
    Silver,
    Gold,
    Diamond,
    Emerald,
}

impl MedalType {
    /// Awardable tiers, lowest first.
    pub const TIERS: [MedalType; 5] = [
        MedalType::Bronze,
        MedalType::Silver,
        MedalType::Gold,
        MedalType::Diamond,
        MedalType::Emerald,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MedalType::None => "none",
            MedalType::Bronze => "bronze",
            MedalType::Silver => "silver",
            MedalType::Gold => "gold",
            MedalType::Diamond => "diamond",
            MedalType::Emerald => "emerald",
        }
    }
}

impl fmt::Display for MedalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub questions_answered: u32,
    pub correct_answers: u32,
}

impl LevelProgress {
    pub fn accuracy_percentage(&self) -> f64 {
        accuracy(self.correct_answers, self.questions_answered)
    }
}

/// Snapshot of a user's progress, derived from their full attempt history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_xp: u64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub accuracy_percentage: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub current_medal: MedalType,
    pub last_active_day: Option<NaiveDate>,
    /// Size of the largest exercise set answered without a single mistake.
    pub best_perfect_session: u32,
    pub levels: BTreeMap<String, LevelProgress>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_xp: 0,
            questions_answered: 0,
            correct_answers: 0,
            accuracy_percentage: 0.0,
            current_streak: 0,
            longest_streak: 0,
            current_medal: MedalType::None,
            last_active_day: None,
            best_perfect_session: 0,
            levels: BTreeMap::new(),
        }
    }
}

impl UserStats {
    pub fn with_medal(mut self, medal: MedalType) -> Self {
        self.current_medal = medal;
        self
    }
}

/// Percentage of correct answers; 0 when nothing was answered.
pub fn accuracy(correct: u32, answered: u32) -> f64 {
    if answered == 0 {
        return 0.0;
    }
    f64::from(correct) / f64::from(answered) * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    Streak,
    Accuracy,
    Questions,
    PerfectScore,
    LevelMaster,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub kind: AchievementKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<String>,
}

impl Achievement {
    pub fn new(kind: AchievementKind) -> Self {
        Self {
            kind,
            levels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub display_name: String,
    pub stats: UserStats,
}
