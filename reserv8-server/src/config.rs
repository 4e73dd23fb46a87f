//! Server configuration - environment loading
//!
//! Configuration is read from environment variables (a `.env` file is
//! loaded by the CLI before this runs):
//! - `DATABASE_URL`, or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`
//! - `DB_MAX_CONNECTIONS`: pool size (default: 10)
//! - `HOST`/`PORT`: bind address (default: 127.0.0.1:5000)
//! - `CORS_ORIGINS`: comma-separated allowed origins
//! - `FIREBASE_PROJECT_ID`: audience for ID-token verification
//! - `GMAIL_USER`/`GMAIL_APP_PASSWORD`/`SMTP_HOST`: confirmation mail relay

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use sqlx::mysql::MySqlConnectOptions;

/// Default pool size, matching the connection limit the frontend was tuned against
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:5174"];
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_MAIL_FROM: &str = "Reserv8 <noreply@reserv8.com>";

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Where the MySQL pool connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

/// Database pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            target: DatabaseTarget::Url(url.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Build driver connect options. Passwords given as parts need no URL escaping.
    pub fn connect_options(&self) -> Result<MySqlConnectOptions, sqlx::Error> {
        match &self.target {
            DatabaseTarget::Url(url) => MySqlConnectOptions::from_str(url),
            DatabaseTarget::Parts {
                host,
                port,
                user,
                password,
                database,
            } => Ok(MySqlConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(database)),
        }
    }
}

/// SMTP relay credentials for confirmation mail
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    pub bind_addr: SocketAddr,

    pub database: DatabaseConfig,

    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,

    /// Firebase project whose ID tokens are accepted. `None` rejects every token.
    pub firebase_project_id: Option<String>,

    /// `None` disables confirmation mail
    pub mail: Option<MailConfig>,

    /// Create missing tables at startup
    pub run_migrations: bool,
}

impl ServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host: IpAddr = parse_or(&var, "HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port: u16 = parse_or(&var, "PORT", DEFAULT_PORT)?;

        let target = match var("DATABASE_URL") {
            Some(url) => DatabaseTarget::Url(url),
            None => DatabaseTarget::Parts {
                host: var("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: parse_or(&var, "DB_PORT", 3306)?,
                user: var("DB_USER").unwrap_or_else(|| "root".to_string()),
                password: var("DB_PASSWORD").unwrap_or_default(),
                database: var("DB_NAME").ok_or(ConfigError::Missing("DATABASE_URL or DB_NAME"))?,
            },
        };

        let max_connections = parse_or(&var, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                reason: "must be at least 1".to_string(),
            });
        }

        let cors_origins = match var("CORS_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        let mail = match (var("GMAIL_USER"), var("GMAIL_APP_PASSWORD")) {
            (Some(username), Some(password)) => Some(MailConfig {
                smtp_host: var("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                username,
                password,
                from: var("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            database: DatabaseConfig {
                target,
                max_connections,
                acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            },
            cors_origins,
            firebase_project_id: var("FIREBASE_PROJECT_ID"),
            mail,
            run_migrations: parse_or(&var, "RUN_MIGRATIONS", false)?,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
