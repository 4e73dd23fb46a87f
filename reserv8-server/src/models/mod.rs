//! Domain models with validation at construction
//!
//! Request input is turned into these types before any query runs.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod slot;
pub mod booking;
pub mod capacity;

pub use validation::ValidationError;
pub use slot::TimeSlot;
pub use booking::{BookingDate, ContactEmail, ContactPhone, CustomerName, TableCount};
pub use capacity::{AvailabilityStatus, CapacityExceeded, SlotCapacity, DEFAULT_TOTAL_TABLES};
