use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod progress;

/// One answered exercise as recorded by the attempt store. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub user_id: String,
    pub is_correct: bool,
    pub xp_awarded: u32,
    pub answered_at: DateTime<Utc>,
    /// Exercise set the attempt was answered in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Proficiency level label, e.g. "A1".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl AttemptRecord {
    pub fn new(
        user_id: impl Into<String>,
        is_correct: bool,
        xp_awarded: u32,
        answered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            is_correct,
            xp_awarded,
            answered_at,
            session_id: None,
            level: None,
        }
    }

    pub fn in_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn at_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }
}

/// Display identity shown next to a user's leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
}
