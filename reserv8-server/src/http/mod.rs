//! HTTP server layer
//!
//! Axum server with:
//! - CORS for the configured frontend origins
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses, including undecodable bodies

pub mod server;
pub mod error;
pub mod extractors;
pub mod routes;

pub use server::{build_router, run_server, AppState, ServerError};
pub use error::ApiError;
