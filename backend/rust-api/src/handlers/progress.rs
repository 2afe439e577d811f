use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{
    error::StatsError,
    models::progress::{Achievement, LeaderboardEntry, MedalType, UserStats},
    services::AppState,
};

pub(crate) async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStats>, ApiError> {
    let stats = state.progress.user_stats(&user_id).await?;
    Ok(Json(stats))
}

pub(crate) async fn get_user_medal(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<MedalResponse>, ApiError> {
    let medal = state.progress.user_medal(&user_id).await?;
    Ok(Json(MedalResponse { user_id, medal }))
}

pub(crate) async fn get_user_achievements(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<AchievementsResponse>, ApiError> {
    let achievements = state.progress.user_achievements(&user_id).await?;
    Ok(Json(AchievementsResponse {
        user_id,
        achievements,
    }))
}

pub(crate) async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    query
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid leaderboard query: {}", e)))?;

    let limit = query
        .limit
        .unwrap_or(state.config.scoring.leaderboard.default_limit);
    let entries = state.progress.leaderboard(limit).await?;
    Ok(Json(LeaderboardResponse { entries }))
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LeaderboardQuery {
    #[validate(range(min = 1))]
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MedalResponse {
    user_id: String,
    medal: MedalType,
}

#[derive(Debug, Serialize)]
pub(crate) struct AchievementsResponse {
    user_id: String,
    achievements: Vec<Achievement>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LeaderboardResponse {
    entries: Vec<LeaderboardEntry>,
}

const PROGRESS_UNAVAILABLE: &str = "Could not compute your progress";

#[derive(Debug)]
pub(crate) enum ApiError {
    BadRequest(String),
    ServiceUnavailable(String),
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::InvalidLimit { .. } => ApiError::BadRequest(err.to_string()),
            // Never surfaced as "no medal": the user's progress is unknown.
            StatsError::Retrieval(_) => ApiError::ServiceUnavailable(PROGRESS_UNAVAILABLE.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::ServiceUnavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        (
            status,
            Json(json!({ "message": message, "status": status.as_u16() })),
        )
            .into_response()
    }
}
