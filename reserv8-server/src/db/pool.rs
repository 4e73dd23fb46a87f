//! Database connection pool management
//!
//! Uses sqlx MySqlPool with explicit connection limits and acquire timeout.

use std::time::Duration;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use tokio::task::JoinHandle;

use crate::config::DatabaseConfig;

/// How often idle connections are exercised so the server doesn't drop them
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Create a MySQL connection pool.
///
/// # Errors
///
/// Returns an error if the options are malformed or the first connection fails.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&DatabaseConfig::from_url("mysql://localhost/reserv8")).await?;
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> Result<MySqlPool, sqlx::Error> {
    let options = config.connect_options()?;

    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
}

/// Create a pool that connects on first use (for tests and delayed startup).
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<MySqlPool, sqlx::Error> {
    let options = config.connect_options()?;

    Ok(MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_lazy_with(options))
}

/// Ping the pool with `SELECT 1` on a fixed interval until the pool closes.
pub fn spawn_keepalive(pool: MySqlPool, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if pool.is_closed() {
                break;
            }
            if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
                tracing::error!(error = %e, "database ping failed");
            }
        }
    })
}
