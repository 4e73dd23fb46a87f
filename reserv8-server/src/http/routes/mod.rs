//! Route handlers organized by resource

pub mod health;
pub mod restaurants;
pub mod booking;
pub mod auth;
