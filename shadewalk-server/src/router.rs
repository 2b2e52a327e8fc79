use std::time::Duration;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower::{ServiceBuilder, limit::GlobalConcurrencyLimitLayer, timeout::TimeoutLayer};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{AppState, config::ServerConfig, handlers};

/// API routes plus the static frontend as fallback.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/api/shortest-path", post(handlers::shortest_path))
        .route("/api/shortest-shaded-path", post(handlers::shortest_shaded_path))
        .route("/api/shade", post(handlers::shade))
        .route("/api/cadastre", get(handlers::cadastre))
        .route("/api/walkpath", get(handlers::walkpath))
        .route("/api/health-centers", post(handlers::health_centers))
        .route("/health", get(handlers::health));

    api.fallback_service(ServeDir::new(&config.frontend_dir))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.request_timeout_secs,
                )))
                .layer(GlobalConcurrencyLimitLayer::new(config.concurrency_limit)),
        )
        .layer(CorsLayer::permissive())
}

async fn handle_middleware_error(error: BoxError) -> impl IntoResponse {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out", "kind": "timeout" })),
        )
    } else {
        tracing::error!(error = %error, "unhandled middleware error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": error.to_string(), "kind": "internal" })),
        )
    }
}
