//! Schema bootstrap command

use anyhow::{Context, Result};
use clap::Parser;

use reserv8_server::db::{create_pool, migrations};

use super::serve::load_config;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides DB_HOST/DB_USER/... settings)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Create any missing tables and exit
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let config = load_config(args.database_url.as_deref())?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    pool.close().await;
    Ok(())
}
