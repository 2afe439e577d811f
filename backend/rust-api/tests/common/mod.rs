#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use ducklingo_api::{
    config::{Config, ScoringSettings},
    create_router,
    error::StoreError,
    models::{AttemptRecord, UserProfile},
    services::{attempt_store::AttemptStore, AppState},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub fn test_config() -> Config {
    Config {
        mongo_uri: "mongodb://unused:27017".to_string(),
        mongo_database: "ducklingo_test".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        scoring: ScoringSettings::default(),
    }
}

pub fn create_test_app(store: Arc<dyn AttemptStore>) -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(
        AppState::with_store(test_config(), store).expect("Failed to initialize test app state"),
    );

    create_router(app_state)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Attempts answered today, one day apart going backwards.
pub fn daily_attempts(user: &str, days: i64, xp: u32, correct: bool) -> Vec<AttemptRecord> {
    let today = Utc::now();
    (0..days)
        .map(|back| AttemptRecord::new(user, correct, xp, today - Duration::days(back)))
        .collect()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Store whose backend is always down.
pub struct UnavailableStore;

#[async_trait]
impl AttemptStore for UnavailableStore {
    async fn attempts_for_user(&self, _: &str) -> Result<Vec<AttemptRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn all_attempts(&self) -> Result<Vec<AttemptRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn profiles(&self, _: &[String]) -> Result<HashMap<String, UserProfile>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Store that hands back rows it could not decode.
pub struct MalformedStore;

#[async_trait]
impl AttemptStore for MalformedStore {
    async fn attempts_for_user(&self, _: &str) -> Result<Vec<AttemptRecord>, StoreError> {
        Err(StoreError::Malformed("xp_awarded: invalid value -5".to_string()))
    }

    async fn all_attempts(&self) -> Result<Vec<AttemptRecord>, StoreError> {
        Err(StoreError::Malformed("xp_awarded: invalid value -5".to_string()))
    }

    async fn profiles(&self, _: &[String]) -> Result<HashMap<String, UserProfile>, StoreError> {
        Ok(HashMap::new())
    }
}
