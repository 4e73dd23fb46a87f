//! Table availability and booking endpoints
//!
//! Request fields are validated before the database is touched, so a
//! malformed booking never opens a transaction.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{AvailabilityRepo, BookingReceipt, BookingRequest, RestaurantRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiQuery};
use crate::http::server::AppState;
use crate::models::{
    AvailabilityStatus, BookingDate, ContactEmail, ContactPhone, CustomerName, TableCount,
    TimeSlot, ValidationError,
};
use crate::notify::{self, BookingConfirmation};

/// Book table request
#[derive(Debug, Deserialize)]
pub struct BookTableRequest {
    pub date: String,
    pub time: String,
    #[serde(default = "one_table")]
    pub tables: i64,
    pub email: String,
    pub name: String,
    pub people: Option<i32>,
    pub phone: Option<String>,
}

fn one_table() -> i64 {
    1
}

/// Book table response
#[derive(Debug, Serialize)]
pub struct BookTableResponse {
    pub message: &'static str,
    pub booking_id: u64,
    pub available_tables: i32,
    #[serde(rename = "emailSent")]
    pub email_sent: bool,
}

/// Availability query parameters
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Availability response
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    pub total_tables: i32,
    pub available_tables: i32,
    pub status: AvailabilityStatus,
}

/// Restaurant id as sent by the older booking form: a row id or a link fragment
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RestaurantRef {
    Id(i64),
    Link(String),
}

/// Legacy booking request
#[derive(Debug, Deserialize)]
pub struct LegacyBookingRequest {
    pub restaurant_id: RestaurantRef,
    pub date: String,
    pub time_slot: String,
    pub number_of_people: Option<i32>,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Legacy booking response
#[derive(Debug, Serialize)]
pub struct LegacyBookingResponse {
    pub message: &'static str,
    pub booking_id: u64,
    #[serde(rename = "emailSent")]
    pub email_sent: bool,
}

/// Validated booking fields, before the restaurant is resolved
struct BookingFields {
    date: BookingDate,
    slot: TimeSlot,
    tables: TableCount,
    party_size: Option<i32>,
    customer_name: CustomerName,
    email: ContactEmail,
    phone: Option<ContactPhone>,
}

impl BookingFields {
    fn into_request(self, restaurant_name: String) -> BookingRequest {
        BookingRequest {
            restaurant_name,
            date: self.date,
            slot: self.slot,
            tables: self.tables,
            party_size: self.party_size,
            customer_name: self.customer_name,
            email: self.email,
            phone: self.phone,
        }
    }
}

fn party_size(people: Option<i32>) -> Result<Option<i32>, ValidationError> {
    match people {
        Some(n) if n < 1 => Err(ValidationError::OutOfRange {
            field: "number of people",
            min: 1,
            max: i64::from(i32::MAX),
        }),
        other => Ok(other),
    }
}

/// A blank phone counts as not given.
fn phone(raw: Option<String>) -> Result<Option<ContactPhone>, ValidationError> {
    raw.as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ContactPhone::new)
        .transpose()
}

impl TryFrom<BookTableRequest> for BookingFields {
    type Error = ValidationError;

    fn try_from(req: BookTableRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            date: BookingDate::new(&req.date)?,
            slot: TimeSlot::new(&req.time)?,
            tables: TableCount::new(req.tables)?,
            party_size: party_size(req.people)?,
            customer_name: CustomerName::new(&req.name)?,
            email: ContactEmail::new(&req.email)?,
            phone: phone(req.phone)?,
        })
    }
}

/// Commit the booking, then send the confirmation.
async fn book_and_notify(
    state: &AppState,
    request: BookingRequest,
) -> Result<(BookingReceipt, bool), ApiError> {
    let receipt = AvailabilityRepo::new(&state.pool).book(&request).await?;

    let confirmation = BookingConfirmation {
        restaurant_name: request.restaurant_name,
        customer_name: request.customer_name.as_str().to_owned(),
        date: request.date,
        slot: request.slot,
        tables: request.tables,
        people: request.party_size,
    };
    let email_sent = notify::dispatch(
        state.notifier.as_ref(),
        request.email.as_str(),
        &confirmation,
        state.email_timeout,
    )
    .await;

    Ok((receipt, email_sent))
}

/// POST /restaurants/{id}/book - reserve tables for a slot
async fn book_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<BookTableRequest>,
) -> Result<Json<BookTableResponse>, ApiError> {
    let fields = BookingFields::try_from(req)?;

    let restaurant_name = RestaurantRepo::new(&state.pool).resolve_name(&id).await?;
    let (receipt, email_sent) = book_and_notify(&state, fields.into_request(restaurant_name)).await?;

    Ok(Json(BookTableResponse {
        message: "Table booked successfully",
        booking_id: receipt.booking_id,
        available_tables: receipt.capacity.available(),
        email_sent,
    }))
}

/// GET /restaurants/{id}/availability?date=&time= - tables left in a slot
async fn availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<AvailabilityParams>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let date = BookingDate::new(params.date.as_deref().unwrap_or_default())?;
    let slot = TimeSlot::new(params.time.as_deref().unwrap_or_default())?;

    let restaurant_name = RestaurantRepo::new(&state.pool).resolve_name(&id).await?;
    let capacity = AvailabilityRepo::new(&state.pool)
        .get(&restaurant_name, date, slot)
        .await?;

    Ok(Json(AvailabilityResponse {
        available: !capacity.is_full(),
        total_tables: capacity.total_tables,
        available_tables: capacity.available(),
        status: capacity.status(),
    }))
}

/// GET /restaurants/{id}/timeslots/{date} - bookable slots within operating hours
async fn timeslots(
    State(state): State<Arc<AppState>>,
    Path((id, date)): Path<(String, String)>,
) -> Result<Json<Vec<TimeSlot>>, ApiError> {
    let date = BookingDate::new(&date)?;

    let (name, open, close) = RestaurantRepo::new(&state.pool).operating_hours(&id).await?;
    let (Some(open), Some(close)) = (open, close) else {
        return Err(ApiError::not_found("Operating hours not available"));
    };

    let full = AvailabilityRepo::new(&state.pool)
        .full_slots(&name, date.as_date())
        .await?;

    let slots = TimeSlot::between(open, close)
        .into_iter()
        .filter(|slot| !full.contains(&slot.to_string()))
        .collect();

    Ok(Json(slots))
}

/// POST /bookings - booking form of the first frontend iteration
async fn create_booking(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LegacyBookingRequest>,
) -> Result<Json<LegacyBookingResponse>, ApiError> {
    let fields = BookingFields {
        date: BookingDate::new(&req.date)?,
        slot: TimeSlot::new(&req.time_slot)?,
        tables: TableCount::ONE,
        party_size: party_size(req.number_of_people)?,
        customer_name: CustomerName::new(&req.customer_name)?,
        email: ContactEmail::new(&req.email)?,
        phone: phone(req.phone)?,
    };

    let repo = RestaurantRepo::new(&state.pool);
    let restaurant = match &req.restaurant_id {
        RestaurantRef::Id(id) => repo.find_by_id(*id).await?,
        RestaurantRef::Link(link) => repo.find_by_link(link).await?,
    };

    let (receipt, email_sent) = book_and_notify(&state, fields.into_request(restaurant.name)).await?;

    Ok(Json(LegacyBookingResponse {
        message: "Booking created successfully",
        booking_id: receipt.booking_id,
        email_sent,
    }))
}

/// Booking routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/restaurants/{id}/book", post(book_table))
        .route("/restaurants/{id}/availability", get(availability))
        .route("/restaurants/{id}/timeslots/{date}", get(timeslots))
        .route("/bookings", post(create_booking))
}
