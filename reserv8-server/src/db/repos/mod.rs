//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the shared pool, one short-lived repo per request
//! - Handles conflicts via constraints (no check-then-insert)
//! - Uses transactions for multi-step operations

pub mod restaurants;
pub mod availability;
pub mod bookings;
pub mod users;

pub use restaurants::{RestaurantRepo, Restaurant, RestaurantDetail, Review, SearchField};
pub use availability::{AvailabilityRepo, BookingRequest, BookingReceipt};
pub use bookings::NewBooking;
pub use users::{UserRepo, User};

use crate::models::CapacityExceeded;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("already exists: {resource} '{id}'")]
    Conflict { resource: &'static str, id: String },

    #[error(transparent)]
    Capacity(#[from] CapacityExceeded),
}

impl DbError {
    /// True when the pool could not hand out a connection at all.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Sqlx(
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_connection_errors() {
        assert!(DbError::Sqlx(sqlx::Error::PoolTimedOut).is_connection_error());
        assert!(DbError::Sqlx(sqlx::Error::PoolClosed).is_connection_error());
        assert!(!DbError::Sqlx(sqlx::Error::RowNotFound).is_connection_error());
        assert!(!DbError::NotFound {
            resource: "restaurant",
            id: "x".into()
        }
        .is_connection_error());
    }
}
