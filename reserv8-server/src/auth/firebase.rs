//! Firebase ID-token verification
//!
//! Firebase ID tokens are RS256 JWTs signed with Google's rotating
//! secure-token keys. A token is accepted when:
//! - its `kid` names a key in the published JWK set
//! - the signature verifies and `exp` has not passed
//! - `aud` is the project id and `iss` is `https://securetoken.google.com/<project id>`
//! - `sub` (the uid) is a non-empty string of at most 128 characters
//! - `iat` and `auth_time` are not in the future
//!
//! Keys are fetched per verification.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::{AuthError, TokenVerifier, VerifiedToken};

/// Google's published JWK set for Firebase ID tokens
pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Clock skew tolerated on `iat`/`auth_time`, in seconds
const LEEWAY_SECS: i64 = 60;

const MAX_UID_LEN: usize = 128;

/// Claims Firebase puts in an ID token
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub auth_time: Option<i64>,
    pub email: Option<String>,
}

/// Verifier for one Firebase project
#[derive(Debug, Clone)]
pub struct FirebaseVerifier {
    project_id: String,
    jwks_url: String,
    client: reqwest::Client,
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            jwks_url: GOOGLE_JWKS_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetch keys from somewhere else (emulators, tests)
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    pub fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        validation
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::Keys(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::Keys(e.to_string()))
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, id_token: &str) -> Result<VerifiedToken, AuthError> {
        let id_token = id_token.trim();
        if id_token.is_empty() {
            return Err(AuthError::Malformed("token is empty".to_string()));
        }

        let header = decode_header(id_token).map_err(map_jwt_error)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::Invalid(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::Malformed("missing kid header".to_string()))?;

        let keys = self.fetch_keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| AuthError::Invalid(format!("unknown key id {}", kid)))?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| AuthError::Keys(e.to_string()))?;

        let data = decode::<FirebaseClaims>(id_token, &key, &self.validation())
            .map_err(map_jwt_error)?;

        check_claims(&data.claims, Utc::now().timestamp())
    }
}

/// Checks `jsonwebtoken` does not cover.
pub fn check_claims(claims: &FirebaseClaims, now: i64) -> Result<VerifiedToken, AuthError> {
    if claims.sub.is_empty() || claims.sub.chars().count() > MAX_UID_LEN {
        return Err(AuthError::Invalid("subject must be a non-empty uid".to_string()));
    }
    if claims.iat > now + LEEWAY_SECS {
        return Err(AuthError::Invalid("issued in the future".to_string()));
    }
    if claims.auth_time.is_some_and(|t| t > now + LEEWAY_SECS) {
        return Err(AuthError::Invalid("authenticated in the future".to_string()));
    }

    Ok(VerifiedToken {
        uid: claims.sub.clone(),
        email: claims.email.clone(),
    })
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthError::Malformed(e.to_string()),
        _ => AuthError::Invalid(e.to_string()),
    }
}
