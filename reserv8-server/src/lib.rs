//! reserv8-server: restaurant table booking backend
//!
//! Serves the restaurant catalogue, per-slot table availability and
//! bookings over HTTP, backed by MySQL. Accounts are Firebase identities;
//! bookings trigger an SMTP confirmation email.

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod notify;

pub use config::{ConfigError, DatabaseConfig, ServerConfig};
pub use db::{create_pool, DbError};
pub use http::{build_router, run_server, ApiError, AppState, ServerError};
