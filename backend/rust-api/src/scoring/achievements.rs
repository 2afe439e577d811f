use serde::{Deserialize, Serialize};

use crate::models::progress::{Achievement, AchievementKind, UserStats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementThresholds {
    pub streak_days: u32,
    pub accuracy_percentage: f64,
    pub accuracy_min_questions: u32,
    pub questions: u32,
    pub perfect_score_min_questions: u32,
    pub level_master_min_questions: u32,
    pub level_master_accuracy: f64,
}

impl Default for AchievementThresholds {
    fn default() -> Self {
        Self {
            streak_days: 7,
            accuracy_percentage: 90.0,
            accuracy_min_questions: 20,
            questions: 100,
            perfect_score_min_questions: 10,
            level_master_min_questions: 20,
            level_master_accuracy: 80.0,
        }
    }
}

/// Independent unlock predicates; each achievement is checked on its own.
#[derive(Debug, Clone, Default)]
pub struct AchievementEvaluator {
    thresholds: AchievementThresholds,
}

impl AchievementEvaluator {
    pub fn new(thresholds: AchievementThresholds) -> Self {
        Self { thresholds }
    }

    pub fn evaluate(&self, stats: &UserStats) -> Vec<Achievement> {
        let t = &self.thresholds;
        let mut unlocked = Vec::new();

        if stats.longest_streak >= t.streak_days {
            unlocked.push(Achievement::new(AchievementKind::Streak));
        }

        if stats.questions_answered >= t.accuracy_min_questions
            && stats.accuracy_percentage >= t.accuracy_percentage
        {
            unlocked.push(Achievement::new(AchievementKind::Accuracy));
        }

        if stats.questions_answered >= t.questions {
            unlocked.push(Achievement::new(AchievementKind::Questions));
        }

        if t.perfect_score_min_questions > 0
            && stats.best_perfect_session >= t.perfect_score_min_questions
        {
            unlocked.push(Achievement::new(AchievementKind::PerfectScore));
        }

        let mastered: Vec<String> = stats
            .levels
            .iter()
            .filter(|(_, progress)| {
                progress.questions_answered > 0
                    && progress.questions_answered >= t.level_master_min_questions
                    && progress.accuracy_percentage() >= t.level_master_accuracy
            })
            .map(|(level, _)| level.clone())
            .collect();

        if !mastered.is_empty() {
            unlocked.push(Achievement {
                kind: AchievementKind::LevelMaster,
                levels: mastered,
            });
        }

        unlocked
    }
}
