use crate::error::MentorError;
use crate::models::{RecommendationRequest, RecommendationResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

async fn weak_topic_recommendations(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<RecommendationResponse>, MentorError> {
    // Malformed bodies answer like a blank identity: 400 with a JSON detail.
    let Json(request) =
        payload.map_err(|rejection| MentorError::Validation(rejection.body_text()))?;
    let response = state
        .recommendation_service
        .get_recommendations(&request)
        .await?;
    Ok(Json(response))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/recommendations/weak-topics",
            post(weak_topic_recommendations),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
