//! Table availability repository
//!
//! One row per (restaurant, date, slot) holds the slot's table counter.
//! Booking runs read-check-write on that row inside a transaction:
//!
//! 1. insert the row with the default capacity if it is missing
//!    (`ON DUPLICATE KEY` no-op, so concurrent first bookings collide on
//!    the primary key instead of racing)
//! 2. `SELECT ... FOR UPDATE` - later bookings for the key wait here
//! 3. check capacity, update the counter, append the booking, commit
//!
//! Any failure rolls the transaction back, including the row created in
//! step 1, so a rejected first booking leaves nothing behind.

use chrono::NaiveDate;
use sqlx::{MySql, MySqlPool, Transaction};

use super::bookings::{self, NewBooking};
use super::DbError;
use crate::models::{
    BookingDate, ContactEmail, ContactPhone, CustomerName, SlotCapacity, TableCount, TimeSlot,
    DEFAULT_TOTAL_TABLES,
};

/// Everything needed to take tables for one booking
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub restaurant_name: String,
    pub date: BookingDate,
    pub slot: TimeSlot,
    pub tables: TableCount,
    pub party_size: Option<i32>,
    pub customer_name: CustomerName,
    pub email: ContactEmail,
    pub phone: Option<ContactPhone>,
}

impl BookingRequest {
    fn as_new_booking(&self) -> NewBooking<'_> {
        NewBooking {
            restaurant_name: &self.restaurant_name,
            date: self.date,
            slot: self.slot,
            tables: self.tables,
            party_size: self.party_size,
            customer_name: &self.customer_name,
            email: &self.email,
            phone: self.phone.as_ref(),
        }
    }
}

/// Committed booking
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub booking_id: u64,
    /// Slot counter after this booking
    pub capacity: SlotCapacity,
}

/// Availability repository
pub struct AvailabilityRepo<'a> {
    pool: &'a MySqlPool,
}

impl<'a> AvailabilityRepo<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Current counter for a slot. A slot nobody booked reports the default capacity.
    pub async fn get(
        &self,
        restaurant_name: &str,
        date: BookingDate,
        slot: TimeSlot,
    ) -> Result<SlotCapacity, DbError> {
        let row: Option<(i32, i32)> = sqlx::query_as(
            r#"
            SELECT total_tables, booked_tables
            FROM time_slot_availability
            WHERE restaurant_name = ? AND date = ? AND time_slot = ?
            "#,
        )
        .bind(restaurant_name)
        .bind(date.as_date())
        .bind(slot.to_string())
        .fetch_optional(self.pool)
        .await?;

        Ok(row
            .map(|(total, booked)| SlotCapacity::new(total, booked))
            .unwrap_or_else(SlotCapacity::fresh))
    }

    /// Slots on a date with no tables left.
    pub async fn full_slots(
        &self,
        restaurant_name: &str,
        date: NaiveDate,
    ) -> Result<Vec<String>, DbError> {
        let slots: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT time_slot
            FROM time_slot_availability
            WHERE restaurant_name = ? AND date = ? AND booked_tables >= total_tables
            ORDER BY time_slot
            "#,
        )
        .bind(restaurant_name)
        .bind(date)
        .fetch_all(self.pool)
        .await?;

        Ok(slots.into_iter().map(|(s,)| s).collect())
    }

    /// Atomically take tables for a booking and record it.
    ///
    /// # Errors
    ///
    /// - `DbError::Capacity` when the slot cannot take the requested tables
    /// - `DbError::Sqlx` for anything the database reports
    ///
    /// In both cases nothing is written. Lock contention is not retried; a
    /// deadlock victim surfaces as `DbError::Sqlx` after rollback.
    pub async fn book(&self, request: &BookingRequest) -> Result<BookingReceipt, DbError> {
        let mut tx = self.pool.begin().await?;

        match reserve_in(&mut tx, request).await {
            Ok(receipt) => {
                tx.commit().await?;
                tracing::info!(
                    restaurant = %request.restaurant_name,
                    date = %request.date,
                    slot = %request.slot,
                    tables = request.tables.get(),
                    booked = receipt.capacity.booked_tables,
                    total = receipt.capacity.total_tables,
                    booking_id = receipt.booking_id,
                    "booking committed"
                );
                Ok(receipt)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

async fn reserve_in(
    tx: &mut Transaction<'_, MySql>,
    request: &BookingRequest,
) -> Result<BookingReceipt, DbError> {
    let slot = request.slot.to_string();

    sqlx::query(
        r#"
        INSERT INTO time_slot_availability
            (restaurant_name, date, time_slot, total_tables, booked_tables)
        VALUES (?, ?, ?, ?, 0)
        ON DUPLICATE KEY UPDATE booked_tables = booked_tables
        "#,
    )
    .bind(&request.restaurant_name)
    .bind(request.date.as_date())
    .bind(&slot)
    .bind(DEFAULT_TOTAL_TABLES)
    .execute(&mut **tx)
    .await?;

    let (total, booked): (i32, i32) = sqlx::query_as(
        r#"
        SELECT total_tables, booked_tables
        FROM time_slot_availability
        WHERE restaurant_name = ? AND date = ? AND time_slot = ?
        FOR UPDATE
        "#,
    )
    .bind(&request.restaurant_name)
    .bind(request.date.as_date())
    .bind(&slot)
    .fetch_one(&mut **tx)
    .await?;

    let current = SlotCapacity::new(total, booked);
    let updated = current.reserve(request.tables).inspect_err(|e| {
        tracing::info!(
            restaurant = %request.restaurant_name,
            date = %request.date,
            slot = %slot,
            requested = e.requested,
            available = e.available,
            "booking rejected, slot full"
        );
    })?;

    sqlx::query(
        r#"
        UPDATE time_slot_availability
        SET booked_tables = ?
        WHERE restaurant_name = ? AND date = ? AND time_slot = ?
        "#,
    )
    .bind(updated.booked_tables)
    .bind(&request.restaurant_name)
    .bind(request.date.as_date())
    .bind(&slot)
    .execute(&mut **tx)
    .await?;

    let booking_id = bookings::insert(&mut **tx, &request.as_new_booking()).await?;

    Ok(BookingReceipt {
        booking_id,
        capacity: updated,
    })
}
