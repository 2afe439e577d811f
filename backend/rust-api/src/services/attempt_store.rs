use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{AttemptRecord, UserProfile};

/// Read-only access to the persisted attempt history.
///
/// Each call returns one consistent snapshot. An empty result means the user
/// has no attempts; any failure to read is reported as a [`StoreError`].
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn attempts_for_user(&self, user_id: &str) -> Result<Vec<AttemptRecord>, StoreError>;

    async fn all_attempts(&self) -> Result<Vec<AttemptRecord>, StoreError>;

    /// Profiles for the given ids; unknown ids are simply absent from the map.
    async fn profiles(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, UserProfile>, StoreError>;

    /// Reachability probe for health checks.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Process-local store for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryAttemptStore {
    attempts: RwLock<Vec<AttemptRecord>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attempts(attempts: Vec<AttemptRecord>) -> Self {
        Self {
            attempts: RwLock::new(attempts),
            profiles: RwLock::default(),
        }
    }

    pub fn record(&self, attempt: AttemptRecord) -> Result<(), StoreError> {
        self.attempts
            .write()
            .map_err(|_| StoreError::Unavailable("attempt lock poisoned".to_string()))?
            .push(attempt);
        Ok(())
    }

    pub fn set_display_name(
        &self,
        user_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<(), StoreError> {
        let user_id = user_id.into();
        self.profiles
            .write()
            .map_err(|_| StoreError::Unavailable("profile lock poisoned".to_string()))?
            .insert(
                user_id.clone(),
                UserProfile {
                    user_id,
                    display_name: display_name.into(),
                },
            );
        Ok(())
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn attempts_for_user(&self, user_id: &str) -> Result<Vec<AttemptRecord>, StoreError> {
        let attempts = self
            .attempts
            .read()
            .map_err(|_| StoreError::Unavailable("attempt lock poisoned".to_string()))?;
        Ok(attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn all_attempts(&self) -> Result<Vec<AttemptRecord>, StoreError> {
        let attempts = self
            .attempts
            .read()
            .map_err(|_| StoreError::Unavailable("attempt lock poisoned".to_string()))?;
        Ok(attempts.clone())
    }

    async fn profiles(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, UserProfile>, StoreError> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| StoreError::Unavailable("profile lock poisoned".to_string()))?;
        Ok(user_ids
            .iter()
            .filter_map(|id| profiles.get(id).map(|p| (id.clone(), p.clone())))
            .collect())
    }
}
