use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::config::ScoringSettings;
use crate::error::{ScoringConfigError, StatsError};
use crate::metrics::{record_medal, record_stats_computation, LEADERBOARD_BUILD_DURATION_SECONDS};
use crate::models::progress::{Achievement, LeaderboardEntry, MedalType, UserStats};
use crate::models::AttemptRecord;
use crate::scoring::{leaderboard, AchievementEvaluator, MedalEvaluator, StatsAggregator};

use super::attempt_store::AttemptStore;

/// Computes progress views from the attempt store on every call; nothing is cached.
pub struct ProgressService {
    store: Arc<dyn AttemptStore>,
    aggregator: StatsAggregator,
    medals: MedalEvaluator,
    achievements: AchievementEvaluator,
    max_leaderboard_limit: u32,
}

impl ProgressService {
    pub fn new(
        store: Arc<dyn AttemptStore>,
        aggregator: StatsAggregator,
        medals: MedalEvaluator,
        achievements: AchievementEvaluator,
        max_leaderboard_limit: u32,
    ) -> Self {
        Self {
            store,
            aggregator,
            medals,
            achievements,
            max_leaderboard_limit,
        }
    }

    /// Fails when the medal table or reference offset is misconfigured.
    pub fn from_settings(
        store: Arc<dyn AttemptStore>,
        settings: &ScoringSettings,
    ) -> Result<Self, ScoringConfigError> {
        Ok(Self::new(
            store,
            StatsAggregator::new(settings.reference_offset()?),
            MedalEvaluator::new(settings.medal_requirements()?),
            AchievementEvaluator::new(settings.achievements.clone()),
            settings.leaderboard.max_limit,
        ))
    }

    pub fn store(&self) -> &Arc<dyn AttemptStore> {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.aggregator.day_of(Utc::now())
    }

    /// Aggregates one history and fills in its medal.
    pub fn stats_for(&self, attempts: &[AttemptRecord], today: NaiveDate) -> UserStats {
        let stats = self.aggregator.aggregate(attempts, today);
        let medal = self.medals.evaluate(&stats);
        stats.with_medal(medal)
    }

    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats, StatsError> {
        self.user_stats_on(user_id, self.today()).await
    }

    pub async fn user_stats_on(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<UserStats, StatsError> {
        let attempts = match self.store.attempts_for_user(user_id).await {
            Ok(attempts) => attempts,
            Err(err) => {
                record_stats_computation(false);
                tracing::warn!(user_id, error = %err, "Failed to load attempt history");
                return Err(err.into());
            }
        };

        let stats = self.stats_for(&attempts, today);
        record_stats_computation(true);
        record_medal(stats.current_medal);

        tracing::debug!(
            user_id,
            attempts = attempts.len(),
            total_xp = stats.total_xp,
            medal = %stats.current_medal,
            "User stats computed"
        );

        Ok(stats)
    }

    pub async fn user_medal(&self, user_id: &str) -> Result<MedalType, StatsError> {
        Ok(self.user_stats(user_id).await?.current_medal)
    }

    pub async fn user_achievements(&self, user_id: &str) -> Result<Vec<Achievement>, StatsError> {
        let stats = self.user_stats(user_id).await?;
        Ok(self.achievements_for(&stats))
    }

    pub fn achievements_for(&self, stats: &UserStats) -> Vec<Achievement> {
        self.achievements.evaluate(stats)
    }

    pub async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StatsError> {
        self.leaderboard_on(limit, self.today()).await
    }

    pub async fn leaderboard_on(
        &self,
        limit: u32,
        today: NaiveDate,
    ) -> Result<Vec<LeaderboardEntry>, StatsError> {
        if limit == 0 || limit > self.max_leaderboard_limit {
            return Err(StatsError::InvalidLimit {
                requested: limit,
                max: self.max_leaderboard_limit,
            });
        }

        let timer = LEADERBOARD_BUILD_DURATION_SECONDS.start_timer();

        let attempts = self.store.all_attempts().await.map_err(|err| {
            record_stats_computation(false);
            tracing::warn!(error = %err, "Failed to load attempt history for leaderboard");
            StatsError::from(err)
        })?;

        let mut by_user: BTreeMap<String, Vec<AttemptRecord>> = BTreeMap::new();
        for attempt in attempts {
            by_user
                .entry(attempt.user_id.clone())
                .or_default()
                .push(attempt);
        }

        let candidates: Vec<(String, UserStats)> = by_user
            .into_iter()
            .map(|(user_id, history)| {
                let stats = self.stats_for(&history, today);
                (user_id, stats)
            })
            .collect();
        let candidate_count = candidates.len();

        let ranked = leaderboard::rank(candidates, limit as usize);
        let top_ids: Vec<String> = ranked.iter().map(|row| row.user_id.clone()).collect();
        let profiles = self.store.profiles(&top_ids).await.map_err(|err| {
            record_stats_computation(false);
            tracing::warn!(error = %err, "Failed to load profiles for leaderboard");
            StatsError::from(err)
        })?;
        let entries = leaderboard::with_profiles(ranked, &profiles);

        timer.observe_duration();
        record_stats_computation(true);
        tracing::info!(
            candidates = candidate_count,
            returned = entries.len(),
            "Leaderboard computed"
        );

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::services::attempt_store::InMemoryAttemptStore;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;

    use crate::models::UserProfile;

    struct UnavailableStore;

    #[async_trait]
    impl AttemptStore for UnavailableStore {
        async fn attempts_for_user(&self, _: &str) -> Result<Vec<AttemptRecord>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn all_attempts(&self) -> Result<Vec<AttemptRecord>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn profiles(
            &self,
            _: &[String],
        ) -> Result<HashMap<String, UserProfile>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn attempts(user: &str, count: u32, xp: u32, correct_every: u32) -> Vec<AttemptRecord> {
        (0..count)
            .map(|i| {
                AttemptRecord::new(
                    user,
                    i % correct_every == 0,
                    xp,
                    Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()
                        + Duration::days(i64::from(i % 3)),
                )
            })
            .collect()
    }

    fn service(store: InMemoryAttemptStore) -> ProgressService {
        ProgressService::from_settings(Arc::new(store), &ScoringSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn unknown_user_has_zero_stats_and_no_medal() {
        let svc = service(InMemoryAttemptStore::new());
        let stats = svc.user_stats_on("ghost", day(6)).await.unwrap();
        assert_eq!(stats, UserStats::default());
        assert_eq!(stats.current_medal, MedalType::None);
    }

    #[tokio::test]
    async fn retrieval_failure_is_not_zero_progress() {
        let svc = ProgressService::from_settings(
            Arc::new(UnavailableStore),
            &ScoringSettings::default(),
        )
        .unwrap();

        let err = svc.user_stats_on("anna", day(6)).await.unwrap_err();
        assert!(matches!(err, StatsError::Retrieval(StoreError::Unavailable(_))));
        assert!(svc.user_medal("anna").await.is_err());
        assert!(svc.user_achievements("anna").await.is_err());
        assert!(svc.leaderboard(5).await.is_err());
    }

    #[tokio::test]
    async fn stats_carry_evaluated_medal() {
        // 12 answers, 9 correct (75%), 60 xp: bronze.
        let history = attempts("anna", 12, 5, 1)
            .into_iter()
            .enumerate()
            .map(|(i, mut a)| {
                a.is_correct = i % 4 != 0;
                a
            })
            .collect();
        let svc = service(InMemoryAttemptStore::with_attempts(history));

        let stats = svc.user_stats_on("anna", day(6)).await.unwrap();
        assert_eq!(stats.total_xp, 60);
        assert_eq!(stats.correct_answers, 9);
        assert_eq!(stats.accuracy_percentage, 75.0);
        assert_eq!(stats.current_medal, MedalType::Bronze);
        assert_eq!(stats.current_streak, 3);
    }

    #[tokio::test]
    async fn leaderboard_ranks_every_user_with_medals() {
        let mut history = attempts("carl", 20, 30, 1);
        history.extend(attempts("anna", 5, 10, 1));
        history.extend(attempts("bo", 5, 10, 2));
        history.extend(attempts("dora", 1, 1, 1));
        let store = InMemoryAttemptStore::with_attempts(history);
        store.set_display_name("carl", "Carl").unwrap();
        store.set_display_name("anna", "Anna").unwrap();
        let svc = service(store);

        let board = svc.leaderboard_on(3, day(6)).await.unwrap();
        let rows: Vec<(u32, &str, &str, u64)> = board
            .iter()
            .map(|e| {
                (
                    e.rank,
                    e.user_id.as_str(),
                    e.display_name.as_str(),
                    e.stats.total_xp,
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                (1, "carl", "Carl", 600),
                (2, "anna", "Anna", 50),
                (2, "bo", "Unknown", 50),
            ]
        );
        assert_eq!(board[0].stats.current_medal, MedalType::Bronze);
        assert_eq!(board[1].stats.current_medal, MedalType::None);
    }

    #[tokio::test]
    async fn leaderboard_build_counts_as_successful_computation() {
        use crate::metrics::STATS_COMPUTATIONS_TOTAL;

        let svc = service(InMemoryAttemptStore::with_attempts(attempts("x", 3, 10, 1)));
        let before = STATS_COMPUTATIONS_TOTAL
            .with_label_values(&["success"])
            .get();

        svc.leaderboard_on(5, day(6)).await.unwrap();

        let after = STATS_COMPUTATIONS_TOTAL
            .with_label_values(&["success"])
            .get();
        assert!(after > before);
    }

    #[tokio::test]
    async fn leaderboard_is_repeatable() {
        let mut history = attempts("x", 4, 10, 1);
        history.extend(attempts("y", 4, 10, 1));
        history.extend(attempts("w", 4, 10, 1));
        let svc = service(InMemoryAttemptStore::with_attempts(history));

        let first = svc.leaderboard_on(10, day(6)).await.unwrap();
        let second = svc.leaderboard_on(10, day(6)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|e| e.user_id.as_str()).collect::<Vec<_>>(),
            vec!["w", "x", "y"]
        );
    }

    #[tokio::test]
    async fn leaderboard_limit_is_validated() {
        let svc = service(InMemoryAttemptStore::new());
        assert_eq!(
            svc.leaderboard_on(0, day(6)).await,
            Err(StatsError::InvalidLimit {
                requested: 0,
                max: 100
            })
        );
        assert!(svc.leaderboard_on(101, day(6)).await.is_err());
        assert!(svc.leaderboard_on(100, day(6)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn achievements_follow_stats() {
        let history: Vec<_> = (0..10)
            .map(|i| {
                AttemptRecord::new(
                    "anna",
                    true,
                    10,
                    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap() + Duration::days(i),
                )
                .in_session("set-1")
            })
            .collect();
        let svc = service(InMemoryAttemptStore::with_attempts(history.clone()));

        let stats = svc.stats_for(&history, day(10));
        let kinds: Vec<_> = svc.achievements_for(&stats).iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                crate::models::progress::AchievementKind::Streak,
                crate::models::progress::AchievementKind::PerfectScore,
            ]
        );
    }
}
