use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod scoring;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<services::AppState>) -> Router {
    // Read-only endpoints, callers are authenticated upstream
    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1", progress_routes().layer(cors))
        .with_state(app_state)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

fn progress_routes() -> Router<Arc<services::AppState>> {
    Router::new()
        .route(
            "/progress/users/{user_id}/stats",
            get(handlers::progress::get_user_stats),
        )
        .route(
            "/progress/users/{user_id}/medal",
            get(handlers::progress::get_user_medal),
        )
        .route(
            "/progress/users/{user_id}/achievements",
            get(handlers::progress::get_user_achievements),
        )
        .route("/leaderboard", get(handlers::progress::get_leaderboard))
}
