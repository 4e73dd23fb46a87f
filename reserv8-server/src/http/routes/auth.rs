//! Account endpoints backed by Firebase ID tokens

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;

/// Register request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "idToken", default)]
    pub id_token: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub uid: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "idToken", default)]
    pub id_token: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: User,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// POST /register - store the account behind a verified token
async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let token = state.verifier.verify(&req.id_token).await?;

    // Body email first, then whatever the token carries
    let email = non_blank(req.email.as_deref()).or(token.email.as_deref());
    UserRepo::new(&state.pool)
        .register(&token.uid, non_blank(req.name.as_deref()), email)
        .await?;

    tracing::info!(uid = %token.uid, "user registered");
    Ok(Json(RegisterResponse {
        message: "User registered successfully",
        uid: token.uid,
    }))
}

/// POST /login - return the stored account for a verified token
async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = state.verifier.verify(&req.id_token).await?;
    let user = UserRepo::new(&state.pool).find_by_uid(&token.uid).await?;

    tracing::info!(uid = %token.uid, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        user,
    }))
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_dropped() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" Asha ")), Some("Asha"));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn missing_token_deserializes_as_empty() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(req.id_token.is_empty());

        let req: RegisterRequest =
            serde_json::from_str(r#"{"idToken":"abc","name":"Asha"}"#).unwrap();
        assert_eq!(req.id_token, "abc");
        assert!(req.email.is_none());
    }
}
