//! Request extractors that reject with ApiError
//!
//! Axum's own `Json` and `Query` answer a bad body with a plain-text 400 or
//! 422. These wrap them so every failure carries the `{error, code}` body.

use axum::extract::{FromRequest, FromRequestParts};

use super::error::ApiError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::IntoResponse;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Party {
        size: i32,
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn json_body_is_extracted() {
        let request = json_request(r#"{"size":4}"#);
        let ApiJson(party) = ApiJson::<Party>::from_request(request, &()).await.unwrap();
        assert_eq!(party.size, 4);
    }

    #[tokio::test]
    async fn wrong_type_rejects_with_400() {
        let err = ApiJson::<Party>::from_request(json_request(r#"{"size":"4"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::Malformed { .. }));
    }

    #[tokio::test]
    async fn missing_content_type_rejects_with_400() {
        let request = Request::builder()
            .method("POST")
            .body(Body::from(r#"{"size":4}"#))
            .unwrap();
        let err = ApiJson::<Party>::from_request(request, &()).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_query_rejects_with_400() {
        let (mut parts, _) = Request::builder()
            .uri("/slots?size=many")
            .body(())
            .unwrap()
            .into_parts();
        let err = ApiQuery::<Party>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Malformed { .. }));
    }
}
