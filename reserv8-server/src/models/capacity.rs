//! Per-slot table capacity
//!
//! The arithmetic the booking transaction applies to a locked availability
//! row. Kept free of I/O so the invariant `0 <= booked <= total` can be
//! checked without a database.

use serde::Serialize;
use thiserror::Error;

use super::TableCount;

/// Tables a slot starts with when its availability row is first created
pub const DEFAULT_TOTAL_TABLES: i32 = 10;

/// Slots with this many tables left or fewer are reported as limited
const LIMITED_THRESHOLD: i32 = 3;

/// Counter stored in one availability row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotCapacity {
    pub total_tables: i32,
    pub booked_tables: i32,
}

/// Rejection when a slot cannot take the requested tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No tables available.")]
pub struct CapacityExceeded {
    pub requested: i32,
    pub available: i32,
}

/// Coarse availability shown next to the booking form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Limited,
    Full,
}

impl SlotCapacity {
    pub fn new(total_tables: i32, booked_tables: i32) -> Self {
        Self {
            total_tables,
            booked_tables,
        }
    }

    /// Capacity of a slot nobody has booked yet.
    pub fn fresh() -> Self {
        Self::new(DEFAULT_TOTAL_TABLES, 0)
    }

    pub fn available(&self) -> i32 {
        (self.total_tables - self.booked_tables).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.available() == 0
    }

    pub fn status(&self) -> AvailabilityStatus {
        match self.available() {
            0 => AvailabilityStatus::Full,
            n if n <= LIMITED_THRESHOLD => AvailabilityStatus::Limited,
            _ => AvailabilityStatus::Available,
        }
    }

    /// Take `tables` from the slot, or reject without changing anything.
    pub fn reserve(self, tables: TableCount) -> Result<Self, CapacityExceeded> {
        let requested = tables.get();
        if self.booked_tables + requested > self.total_tables {
            return Err(CapacityExceeded {
                requested,
                available: self.available(),
            });
        }
        Ok(Self {
            booked_tables: self.booked_tables + requested,
            ..self
        })
    }
}
