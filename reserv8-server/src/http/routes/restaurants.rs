//! Restaurant catalogue endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::db::repos::{Restaurant, RestaurantDetail, RestaurantRepo, SearchField};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// GET /restaurants - list all restaurants
async fn list_restaurants(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let restaurants = RestaurantRepo::new(&state.pool).list().await?;
    tracing::info!(count = restaurants.len(), "listed restaurants");
    Ok(Json(restaurants))
}

async fn search(
    state: &AppState,
    field: SearchField,
    term: &str,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let restaurants = RestaurantRepo::new(&state.pool).search(field, term).await?;

    if restaurants.is_empty() {
        return Err(ApiError::not_found(format!(
            "No restaurants found {}",
            field.describe(term)
        )));
    }

    tracing::info!(count = restaurants.len(), ?field, term, "restaurant search");
    Ok(Json(restaurants))
}

/// GET /restaurants/name/{name}
async fn search_by_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    search(&state, SearchField::Name, &name).await
}

/// GET /restaurants/location/{location}
async fn search_by_location(
    State(state): State<Arc<AppState>>,
    Path(location): Path<String>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    search(&state, SearchField::Location, &location).await
}

/// GET /restaurants/cuisine/{cuisine}
async fn search_by_cuisine(
    State(state): State<Arc<AppState>>,
    Path(cuisine): Path<String>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    search(&state, SearchField::Cuisine, &cuisine).await
}

/// GET /restaurants/{id} - restaurant with reviews
async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RestaurantDetail>, ApiError> {
    let detail = RestaurantRepo::new(&state.pool).detail(&id).await?;
    tracing::info!(restaurant = %detail.restaurant.name, reviews = detail.reviews.len(), "restaurant detail");
    Ok(Json(detail))
}

/// Restaurant routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/name/{name}", get(search_by_name))
        .route("/restaurants/location/{location}", get(search_by_location))
        .route("/restaurants/cuisine/{cuisine}", get(search_by_cuisine))
        .route("/restaurants/{id}", get(get_restaurant))
}
