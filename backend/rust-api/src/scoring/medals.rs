use serde::{Deserialize, Serialize};

use crate::error::ScoringConfigError;
use crate::models::progress::{MedalType, UserStats};

/// One row of the medal table as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRequirement {
    pub medal: MedalType,
    pub xp: u64,
    pub questions: u32,
    pub accuracy: f64,
}

impl TierRequirement {
    pub fn new(medal: MedalType, xp: u64, questions: u32, accuracy: f64) -> Self {
        Self {
            medal,
            xp,
            questions,
            accuracy,
        }
    }

    fn is_met_by(&self, stats: &UserStats) -> bool {
        stats.total_xp >= self.xp
            && stats.questions_answered >= self.questions
            && stats.accuracy_percentage >= self.accuracy
    }
}

pub fn default_tiers() -> Vec<TierRequirement> {
    vec![
        TierRequirement::new(MedalType::Bronze, 50, 10, 60.0),
        TierRequirement::new(MedalType::Silver, 200, 50, 70.0),
        TierRequirement::new(MedalType::Gold, 500, 100, 80.0),
        TierRequirement::new(MedalType::Diamond, 1000, 250, 85.0),
        TierRequirement::new(MedalType::Emerald, 2500, 500, 90.0),
    ]
}

/// Validated medal table: five tiers, bronze first, every threshold strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct MedalRequirements {
    tiers: Vec<TierRequirement>,
}

impl MedalRequirements {
    pub fn new(rows: &[TierRequirement]) -> Result<Self, ScoringConfigError> {
        let mut tiers: Vec<TierRequirement> = Vec::with_capacity(MedalType::TIERS.len());

        for row in rows {
            if row.medal == MedalType::None {
                return Err(ScoringConfigError::UnawardableTier(row.medal));
            }
            if tiers.iter().any(|t| t.medal == row.medal) {
                return Err(ScoringConfigError::DuplicateTier(row.medal));
            }
            if !(0.0..=100.0).contains(&row.accuracy) {
                return Err(ScoringConfigError::AccuracyOutOfRange {
                    tier: row.medal,
                    value: row.accuracy,
                });
            }
            tiers.push(row.clone());
        }

        for medal in MedalType::TIERS {
            if !tiers.iter().any(|t| t.medal == medal) {
                return Err(ScoringConfigError::MissingTier(medal));
            }
        }

        tiers.sort_by_key(|t| t.medal);

        for pair in tiers.windows(2) {
            let (previous, tier) = (&pair[0], &pair[1]);
            let field = if tier.xp <= previous.xp {
                Some("xp")
            } else if tier.questions <= previous.questions {
                Some("questions")
            } else if tier.accuracy <= previous.accuracy {
                Some("accuracy")
            } else {
                None
            };

            if let Some(field) = field {
                return Err(ScoringConfigError::NonIncreasing {
                    tier: tier.medal,
                    previous: previous.medal,
                    field,
                });
            }
        }

        Ok(Self { tiers })
    }

    /// Tiers ordered bronze to emerald.
    pub fn tiers(&self) -> &[TierRequirement] {
        &self.tiers
    }
}

impl Default for MedalRequirements {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MedalEvaluator {
    requirements: MedalRequirements,
}

impl MedalEvaluator {
    pub fn new(requirements: MedalRequirements) -> Self {
        Self { requirements }
    }

    /// Highest tier whose xp, question and accuracy thresholds are all met.
    pub fn evaluate(&self, stats: &UserStats) -> MedalType {
        self.requirements
            .tiers()
            .iter()
            .rev()
            .find(|tier| tier.is_met_by(stats))
            .map(|tier| tier.medal)
            .unwrap_or(MedalType::None)
    }
}
