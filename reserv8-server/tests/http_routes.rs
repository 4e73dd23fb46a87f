//! Router tests that run without a database
//!
//! The pool points at a closed port, so any handler that reaches the
//! database fails fast. Everything asserted here is decided before that.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use reserv8_server::auth::{AuthError, TokenVerifier, VerifiedToken};
use reserv8_server::config::DatabaseConfig;
use reserv8_server::db::pool::create_lazy_pool;
use reserv8_server::notify::{BookingConfirmation, Notifier, NotifyError};
use reserv8_server::{build_router, AppState};

const ORIGIN: &str = "http://localhost:5173";

/// Accepts exactly one token
struct FixedVerifier;

#[async_trait]
impl TokenVerifier for FixedVerifier {
    async fn verify(&self, id_token: &str) -> Result<VerifiedToken, AuthError> {
        match id_token {
            "good-token" => Ok(VerifiedToken {
                uid: "uid-1".into(),
                email: Some("guest@example.com".into()),
            }),
            "" => Err(AuthError::Malformed("empty token".into())),
            _ => Err(AuthError::Expired),
        }
    }
}

struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_booking_confirmation(
        &self,
        _to: &str,
        _booking: &BookingConfirmation,
    ) -> Result<(), NotifyError> {
        Ok(())
    }
}

fn app() -> Router {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut db = DatabaseConfig::from_url("mysql://nobody@127.0.0.1:1/reserv8");
    db.acquire_timeout = Duration::from_millis(500);
    let pool = create_lazy_pool(&db).unwrap();

    let state = AppState::new(pool, Arc::new(FixedVerifier), Arc::new(NoopNotifier));
    build_router(state, &[ORIGIN.to_string()]).unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_endpoint_answers() {
    let (status, body) = send(get("/api/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Test successful");
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let (status, body) = send(get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    assert!(body["time"].is_string());
}

#[tokio::test]
async fn booking_with_bad_date_is_rejected() {
    let (status, body) = send(post_json(
        "/restaurants/olive-bistro/book",
        json!({
            "date": "14/03/2025",
            "time": "7:30 PM",
            "tables": 2,
            "email": "guest@example.com",
            "name": "Asha"
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn booking_more_than_capacity_is_rejected() {
    let (status, body) = send(post_json(
        "/restaurants/olive-bistro/book",
        json!({
            "date": "2025-03-14",
            "time": "19:30",
            "tables": 11,
            "email": "guest@example.com",
            "name": "Asha"
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn booking_with_bad_email_is_rejected() {
    let (status, _) = send(post_json(
        "/restaurants/olive-bistro/book",
        json!({
            "date": "2025-03-14",
            "time": "19:30",
            "email": "not-an-email",
            "name": "Asha"
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_without_email_is_json_400() {
    let (status, body) = send(post_json(
        "/restaurants/olive-bistro/book",
        json!({
            "date": "2025-03-14",
            "time": "19:30",
            "name": "Asha"
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn booking_with_string_tables_is_json_400() {
    let (status, body) = send(post_json(
        "/restaurants/olive-bistro/book",
        json!({
            "date": "2025-03-14",
            "time": "19:30",
            "tables": "2",
            "email": "guest@example.com",
            "name": "Asha"
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn booking_body_that_is_not_json_is_rejected() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/restaurants/olive-bistro/book")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn booking_with_long_phone_is_rejected() {
    let (status, body) = send(post_json(
        "/restaurants/olive-bistro/book",
        json!({
            "date": "2025-03-14",
            "time": "19:30",
            "email": "guest@example.com",
            "name": "Asha",
            "phone": "0".repeat(40)
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert!(body["error"].as_str().unwrap().contains("phone"));
}

#[tokio::test]
async fn register_with_non_json_body_is_rejected() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("idToken=good-token"))
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn legacy_booking_validates_time_slot() {
    let (status, body) = send(post_json(
        "/bookings",
        json!({
            "restaurant_id": 7,
            "date": "2025-03-14",
            "time_slot": "25:00",
            "customer_name": "Asha",
            "email": "guest@example.com"
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn availability_requires_date_and_time() {
    let (status, body) = send(get("/restaurants/olive-bistro/availability?date=2025-03-14")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("time"));
}

#[tokio::test]
async fn availability_with_repeated_date_is_json_400() {
    let (status, body) = send(get(
        "/restaurants/olive-bistro/availability?date=2025-03-14&date=2025-03-15&time=19:30",
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn timeslots_reject_bad_date() {
    let (status, _) = send(get("/restaurants/olive-bistro/timeslots/tomorrow")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_with_expired_token_is_401() {
    let (status, body) = send(post_json(
        "/register",
        json!({ "idToken": "stale", "name": "Asha" }),
    ))
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Session expired. Please log in again.");
}

#[tokio::test]
async fn login_without_token_is_401() {
    let (status, body) = send(post_json("/login", json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"],
        "Malformed token. Please provide a valid ID token."
    );
}

#[tokio::test]
async fn valid_token_without_database_is_503() {
    let (status, body) = send(post_json("/login", json!({ "idToken": "good-token" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Database connection error");
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/restaurants")
        .header(header::ORIGIN, ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ORIGIN
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn cors_ignores_unknown_origin() {
    let request = Request::builder()
        .uri("/api/test")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
