//! User repository
//!
//! Users are keyed by their Firebase uid. Registration relies on the
//! unique key to detect repeats.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use super::DbError;

/// User record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub firebase_uid: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a MySqlPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Store a new user. A uid that is already stored is a conflict.
    pub async fn register(
        &self,
        firebase_uid: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (firebase_uid, name, email)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(firebase_uid)
        .bind(name)
        .bind(email)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DbError::Conflict {
                resource: "user",
                id: firebase_uid.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by Firebase uid.
    pub async fn find_by_uid(&self, firebase_uid: &str) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, firebase_uid, name, email, created_at
            FROM users
            WHERE firebase_uid = ?
            "#,
        )
        .bind(firebase_uid)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "user",
            id: firebase_uid.to_owned(),
        })
    }
}
