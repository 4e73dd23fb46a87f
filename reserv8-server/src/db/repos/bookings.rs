//! Booking log
//!
//! Append-only; a row is written in the same transaction that takes the
//! tables from the availability counter, so every booking has capacity
//! behind it.

use sqlx::MySqlConnection;

use crate::models::{BookingDate, ContactEmail, ContactPhone, CustomerName, TableCount, TimeSlot};

/// Booking row about to be written
#[derive(Debug, Clone)]
pub struct NewBooking<'a> {
    pub restaurant_name: &'a str,
    pub date: BookingDate,
    pub slot: TimeSlot,
    pub tables: TableCount,
    pub party_size: Option<i32>,
    pub customer_name: &'a CustomerName,
    pub email: &'a ContactEmail,
    pub phone: Option<&'a ContactPhone>,
}

/// Insert a booking on an open connection, returning its id.
pub(crate) async fn insert(conn: &mut MySqlConnection, booking: &NewBooking<'_>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO bookings
            (restaurant_name, date, time_slot, tables_booked, party_size, customer_name, email, phone)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(booking.restaurant_name)
    .bind(booking.date.as_date())
    .bind(booking.slot.to_string())
    .bind(booking.tables.get())
    .bind(booking.party_size)
    .bind(booking.customer_name.as_str())
    .bind(booking.email.as_str())
    .bind(booking.phone.map(ContactPhone::as_str))
    .execute(conn)
    .await?;

    Ok(result.last_insert_id())
}
