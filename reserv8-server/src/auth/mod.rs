//! ID-token verification
//!
//! Handlers depend on the `TokenVerifier` trait; production uses
//! [`FirebaseVerifier`], tests substitute an in-process double.

pub mod firebase;

use async_trait::async_trait;

pub use firebase::FirebaseVerifier;

/// Identity carried by a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub uid: String,
    pub email: Option<String>,
}

/// Token verification error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("ID token has expired")]
    Expired,

    #[error("malformed ID token: {0}")]
    Malformed(String),

    #[error("invalid ID token: {0}")]
    Invalid(String),

    #[error("could not load signing keys: {0}")]
    Keys(String),

    #[error("token verification is not configured")]
    NotConfigured,
}

impl AuthError {
    /// Message shown to the client
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Expired => "Session expired. Please log in again.",
            Self::Malformed(_) => "Malformed token. Please provide a valid ID token.",
            _ => "Invalid token",
        }
    }
}

/// Verifies ID tokens presented at `/register` and `/login`
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<VerifiedToken, AuthError>;
}

/// Verifier used when no Firebase project is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledVerifier;

#[async_trait]
impl TokenVerifier for DisabledVerifier {
    async fn verify(&self, _id_token: &str) -> Result<VerifiedToken, AuthError> {
        Err(AuthError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages() {
        assert_eq!(
            AuthError::Expired.user_message(),
            "Session expired. Please log in again."
        );
        assert_eq!(
            AuthError::Malformed("x".into()).user_message(),
            "Malformed token. Please provide a valid ID token."
        );
        assert_eq!(AuthError::NotConfigured.user_message(), "Invalid token");
    }

    #[tokio::test]
    async fn disabled_verifier_rejects_everything() {
        let err = DisabledVerifier.verify("anything").await.unwrap_err();
        assert!(matches!(err, AuthError::NotConfigured));
    }
}
