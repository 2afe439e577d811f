use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::models::progress::{accuracy, LevelProgress, UserStats};
use crate::models::AttemptRecord;

/// Folds a user's attempt history into a [`UserStats`] snapshot.
///
/// Calendar days are taken in a single fixed reference offset so that every
/// user's streak is computed against the same day boundary.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    reference_offset: FixedOffset,
}

impl Default for StatsAggregator {
    /// Days in UTC.
    fn default() -> Self {
        Self {
            reference_offset: Utc.fix(),
        }
    }
}

impl StatsAggregator {
    pub fn new(reference_offset: FixedOffset) -> Self {
        Self { reference_offset }
    }

    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.reference_offset).date_naive()
    }

    /// The medal field is left at `none`; the caller fills it from the evaluator.
    pub fn aggregate(&self, attempts: &[AttemptRecord], today: NaiveDate) -> UserStats {
        let mut stats = UserStats::default();
        let mut active_days = BTreeSet::new();
        let mut sessions: BTreeMap<&str, (u32, bool)> = BTreeMap::new();
        let mut levels: BTreeMap<String, LevelProgress> = BTreeMap::new();

        for attempt in attempts {
            stats.total_xp = stats.total_xp.saturating_add(u64::from(attempt.xp_awarded));
            stats.questions_answered = stats.questions_answered.saturating_add(1);
            if attempt.is_correct {
                stats.correct_answers = stats.correct_answers.saturating_add(1);
            }

            // Clock skew: a day ahead of `today` counts as today.
            active_days.insert(self.day_of(attempt.answered_at).min(today));

            if let Some(session_id) = attempt.session_id.as_deref() {
                let session = sessions.entry(session_id).or_insert((0, true));
                session.0 = session.0.saturating_add(1);
                session.1 &= attempt.is_correct;
            }

            if let Some(level) = attempt.level.as_ref() {
                let progress = levels.entry(level.clone()).or_default();
                progress.questions_answered = progress.questions_answered.saturating_add(1);
                if attempt.is_correct {
                    progress.correct_answers = progress.correct_answers.saturating_add(1);
                }
            }
        }

        stats.accuracy_percentage = accuracy(stats.correct_answers, stats.questions_answered);

        let streaks = streaks(&active_days);
        stats.current_streak = streaks.current;
        stats.longest_streak = streaks.longest;
        stats.last_active_day = active_days.last().copied();

        stats.best_perfect_session = sessions
            .values()
            .filter(|(_, all_correct)| *all_correct)
            .map(|(answered, _)| *answered)
            .max()
            .unwrap_or(0);
        stats.levels = levels;

        stats
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Streaks {
    current: u32,
    longest: u32,
}

/// `current` is the run ending at the most recent counted day.
fn streaks(days: &BTreeSet<NaiveDate>) -> Streaks {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    Streaks {
        current: run,
        longest,
    }
}
