use std::collections::HashMap;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime, Document},
    error::ErrorKind,
    Database,
};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::metrics::track_db_operation;
use crate::models::{AttemptRecord, UserProfile};
use crate::utils::retry::{retry_async_with_config, RetryConfig};
use crate::utils::time::bson_to_chrono;

use super::attempt_store::AttemptStore;

const ATTEMPTS_COLLECTION: &str = "exercise_attempts";
const PROFILES_COLLECTION: &str = "profiles";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AttemptDocument {
    user_id: String,
    is_correct: bool,
    xp_awarded: u32,
    answered_at: BsonDateTime,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    level: Option<String>,
}

impl TryFrom<AttemptDocument> for AttemptRecord {
    type Error = StoreError;

    fn try_from(doc: AttemptDocument) -> Result<Self, Self::Error> {
        let answered_at = bson_to_chrono(doc.answered_at).ok_or_else(|| {
            StoreError::Malformed(format!(
                "attempt of user {} has an unrepresentable answered_at",
                doc.user_id
            ))
        })?;

        Ok(AttemptRecord {
            user_id: doc.user_id,
            is_correct: doc.is_correct,
            xp_awarded: doc.xp_awarded,
            answered_at,
            session_id: doc.session_id,
            level: doc.level,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileDocument {
    user_id: String,
    display_name: String,
}

/// Attempt history backed by the `exercise_attempts` and `profiles` collections.
pub struct MongoAttemptStore {
    mongo: Database,
    retry: RetryConfig,
}

impl MongoAttemptStore {
    pub fn new(mongo: Database) -> Self {
        Self {
            mongo,
            retry: RetryConfig::default(),
        }
    }

    async fn find_attempts(&self, filter: Document) -> Result<Vec<AttemptRecord>, StoreError> {
        let cursor = self
            .mongo
            .collection::<AttemptDocument>(ATTEMPTS_COLLECTION)
            .find(filter)
            .sort(doc! { "answered_at": 1 })
            .await
            .map_err(map_mongo_error)?;

        let documents: Vec<AttemptDocument> =
            cursor.try_collect().await.map_err(map_mongo_error)?;

        documents.into_iter().map(AttemptRecord::try_from).collect()
    }

    async fn find_profiles(&self, user_ids: &[String]) -> Result<Vec<ProfileDocument>, StoreError> {
        let cursor = self
            .mongo
            .collection::<ProfileDocument>(PROFILES_COLLECTION)
            .find(doc! { "user_id": { "$in": user_ids } })
            .await
            .map_err(map_mongo_error)?;

        cursor.try_collect().await.map_err(map_mongo_error)
    }
}

#[async_trait]
impl AttemptStore for MongoAttemptStore {
    async fn attempts_for_user(&self, user_id: &str) -> Result<Vec<AttemptRecord>, StoreError> {
        tracing::debug!("Loading attempt history for user={}", user_id);
        retry_async_with_config(self.retry.clone(), is_transient, || {
            track_db_operation(
                "find",
                ATTEMPTS_COLLECTION,
                self.find_attempts(doc! { "user_id": user_id }),
            )
        })
        .await
    }

    async fn all_attempts(&self) -> Result<Vec<AttemptRecord>, StoreError> {
        tracing::debug!("Loading attempt history for all users");
        retry_async_with_config(self.retry.clone(), is_transient, || {
            track_db_operation("find", ATTEMPTS_COLLECTION, self.find_attempts(Document::new()))
        })
        .await
    }

    async fn profiles(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, UserProfile>, StoreError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let documents = retry_async_with_config(self.retry.clone(), is_transient, || {
            track_db_operation("find", PROFILES_COLLECTION, self.find_profiles(user_ids))
        })
        .await?;

        Ok(documents
            .into_iter()
            .map(|doc| {
                (
                    doc.user_id.clone(),
                    UserProfile {
                        user_id: doc.user_id,
                        display_name: doc.display_name,
                    },
                )
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.mongo
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(map_mongo_error)
    }
}

fn map_mongo_error(err: mongodb::error::Error) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::BsonDeserialization(_) => StoreError::Malformed(err.to_string()),
        _ => StoreError::Unavailable(err.to_string()),
    }
}

fn is_transient(err: &StoreError) -> bool {
    matches!(err, StoreError::Unavailable(_))
}
