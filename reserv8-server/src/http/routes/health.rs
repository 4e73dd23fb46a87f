//! Health check endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::http::server::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub time: String,
}

/// Smoke-test response
#[derive(Serialize)]
pub struct TestResponse {
    pub message: &'static str,
}

/// GET /health - healthy only if a pooled connection can be acquired
async fn health(State(state): State<Arc<AppState>>) -> Response {
    let time = Utc::now().to_rfc3339();

    match state.pool.acquire().await {
        Ok(_conn) => Json(HealthResponse {
            status: "healthy",
            message: None,
            time,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "health check could not reach database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "error",
                    message: Some("Database connection error"),
                    time,
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/test
async fn api_test() -> Json<TestResponse> {
    tracing::info!("test endpoint hit");
    Json(TestResponse {
        message: "Test successful",
    })
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/test", get(api_test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn api_test_returns_message() {
        let Json(body) = api_test().await;
        assert_eq!(body.message, "Test successful");
    }
}
