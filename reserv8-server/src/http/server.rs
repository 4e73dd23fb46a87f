//! Axum server setup
//!
//! Server skeleton with:
//! - CORS restricted to the configured frontend origins
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use sqlx::MySqlPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::auth::{DisabledVerifier, FirebaseVerifier, TokenVerifier};
use crate::config::ServerConfig;
use crate::db::pool::{spawn_keepalive, KEEPALIVE_INTERVAL};
use crate::notify::{self, DisabledNotifier, Notifier, NotifyError, SmtpMailer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub verifier: Arc<dyn TokenVerifier>,
    pub notifier: Arc<dyn Notifier>,
    /// How long a booking response waits for the confirmation email
    pub email_timeout: Duration,
}

impl AppState {
    pub fn new(
        pool: MySqlPool,
        verifier: Arc<dyn TokenVerifier>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            pool,
            verifier,
            notifier,
            email_timeout: notify::SEND_TIMEOUT,
        }
    }

    /// Wire up Firebase and SMTP from configuration. Missing settings
    /// disable the feature instead of failing startup.
    pub fn from_config(pool: MySqlPool, config: &ServerConfig) -> Result<Self, ServerError> {
        let verifier: Arc<dyn TokenVerifier> = match &config.firebase_project_id {
            Some(project_id) => {
                tracing::info!(project = %project_id, "Firebase token verification enabled");
                Arc::new(FirebaseVerifier::new(project_id.clone()))
            }
            None => {
                tracing::warn!("FIREBASE_PROJECT_ID not set - /register and /login will reject all tokens");
                Arc::new(DisabledVerifier)
            }
        };

        let notifier: Arc<dyn Notifier> = match &config.mail {
            Some(mail) => {
                tracing::info!(relay = %mail.smtp_host, "Confirmation email enabled");
                Arc::new(SmtpMailer::new(mail)?)
            }
            None => {
                tracing::warn!("GMAIL_USER/GMAIL_APP_PASSWORD not set - confirmation email disabled");
                Arc::new(DisabledNotifier)
            }
        };

        Ok(Self::new(pool, verifier, notifier))
    }
}

/// Build the application router with all routes.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Result<Router, ServerError> {
    let origins = cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| ServerError::InvalidOrigin(origin.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    Ok(Router::new()
        .merge(routes::health::router())
        .merge(routes::restaurants::router())
        .merge(routes::booking::router())
        .merge(routes::auth::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(Arc::new(state)))
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&config.database).await?;
/// run_server(pool, &config).await?;
/// ```
pub async fn run_server(pool: MySqlPool, config: &ServerConfig) -> Result<(), ServerError> {
    let state = AppState::from_config(pool.clone(), config)?;
    let app = build_router(state, &config.cors_origins)?;

    let keepalive = spawn_keepalive(pool.clone(), KEEPALIVE_INTERVAL);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    keepalive.abort();
    pool.close().await;
    tracing::info!("Database connections closed, shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CORS origin: {0}")]
    InvalidOrigin(String),

    #[error("mail setup failed: {0}")]
    Mail(#[from] NotifyError),
}
