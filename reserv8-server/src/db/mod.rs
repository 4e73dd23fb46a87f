//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Bounded connection pool shared by all handlers - no Arc<Mutex<Connection>>
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Row locks inside a transaction guard the availability counter

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, spawn_keepalive};
pub use repos::*;
