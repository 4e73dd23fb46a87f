//! HTTP server command
//!
//! Runs the booking API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use reserv8_server::db::{create_pool, migrations};
use reserv8_server::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: HOST/PORT env, else 127.0.0.1:5000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Database URL (overrides DB_HOST/DB_USER/... settings)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Allowed CORS origin; repeat for several (overrides CORS_ORIGINS)
    #[arg(long = "cors-origin", value_name = "ORIGIN")]
    pub cors_origins: Vec<String>,

    /// Create missing tables before serving
    #[arg(long)]
    pub migrate: bool,
}

/// Read server settings from the environment, with a database URL override.
pub fn load_config(database_url: Option<&str>) -> Result<ServerConfig> {
    ServerConfig::from_lookup(|key| match (key, database_url) {
        ("DATABASE_URL", Some(url)) => Some(url.to_string()),
        _ => std::env::var(key).ok(),
    })
    .context("Invalid server configuration. Set DATABASE_URL or DB_HOST/DB_USER/DB_PASSWORD/DB_NAME")
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = load_config(args.database_url.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if !args.cors_origins.is_empty() {
        config.cors_origins = args.cors_origins;
    }

    tracing::info!("Starting reserv8 server on {}", config.bind_addr);

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "Connected to MySQL"
    );

    if args.migrate || config.run_migrations {
        migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;
    }

    // Run server (blocks until shutdown)
    run_server(pool, &config).await.context("Server error")?;

    Ok(())
}
