//! Restaurant repository
//!
//! Restaurants have no stable key in the imported dataset. Clients address
//! one by a fragment of its `Links` URL; searches are substring matches.

use chrono::NaiveTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use super::DbError;

const RESTAURANT_COLUMNS: &str =
    "id, Name, Links, Cost, Collections, Cuisines, Timings, Rating, Address";

/// Restaurant record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Restaurant {
    pub id: i32,
    #[sqlx(rename = "Name")]
    #[serde(rename = "Name")]
    pub name: String,
    #[sqlx(rename = "Links")]
    #[serde(rename = "Links")]
    pub links: String,
    #[sqlx(rename = "Cost")]
    #[serde(rename = "Cost")]
    pub cost: Option<i32>,
    #[sqlx(rename = "Collections")]
    #[serde(rename = "Collections")]
    pub collections: Option<String>,
    #[sqlx(rename = "Cuisines")]
    #[serde(rename = "Cuisines")]
    pub cuisines: Option<String>,
    #[sqlx(rename = "Timings")]
    #[serde(rename = "Timings")]
    pub timings: Option<String>,
    #[sqlx(rename = "Rating")]
    #[serde(rename = "Rating")]
    pub rating: Option<f64>,
    #[sqlx(rename = "Address")]
    #[serde(rename = "Address")]
    pub address: Option<String>,
}

/// Review as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    #[serde(rename = "Reviewer")]
    pub reviewer: String,
    #[serde(rename = "Review")]
    pub review: String,
    #[serde(rename = "Rating")]
    pub rating: Option<f64>,
}

#[derive(Debug, FromRow)]
struct ReviewRow {
    #[sqlx(rename = "Reviewer")]
    reviewer: Option<String>,
    #[sqlx(rename = "Review")]
    review: String,
    #[sqlx(rename = "Rating")]
    rating: Option<f64>,
}

/// Restaurant with its reviews for the detail page
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    #[serde(rename = "Reviews")]
    pub reviews: Vec<Review>,
}

/// Column a substring search runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Location,
    Cuisine,
}

impl SearchField {
    fn column(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Location => "Address",
            Self::Cuisine => "Cuisines",
        }
    }

    /// Wording used in "No restaurants found ..." messages
    pub fn describe(self, term: &str) -> String {
        match self {
            Self::Name => format!("with name: {}", term),
            Self::Location => format!("in location: {}", term),
            Self::Cuisine => format!("for cuisine: {}", term),
        }
    }
}

/// Reviews shown when a restaurant has none recorded
pub fn default_reviews() -> Vec<Review> {
    [
        ("John D.", "Great ambiance and excellent food! The service was top-notch.", 4.5),
        ("Sarah M.", "Loved the variety in the menu. The desserts were amazing.", 4.0),
        ("Mike R.", "Good food but slightly pricey. Nice place for special occasions.", 3.5),
    ]
    .into_iter()
    .map(|(reviewer, review, rating)| Review {
        reviewer: reviewer.to_owned(),
        review: review.to_owned(),
        rating: Some(rating),
    })
    .collect()
}

/// Escape LIKE wildcards so user input only ever matches literally.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Restaurant repository
pub struct RestaurantRepo<'a> {
    pool: &'a MySqlPool,
}

impl<'a> RestaurantRepo<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// List every restaurant.
    pub async fn list(&self) -> Result<Vec<Restaurant>, DbError> {
        let query = format!("SELECT {} FROM restaurants ORDER BY id", RESTAURANT_COLUMNS);
        let restaurants = sqlx::query_as::<_, Restaurant>(&query)
            .fetch_all(self.pool)
            .await?;
        Ok(restaurants)
    }

    /// Substring search on one column. An empty result is not an error here.
    pub async fn search(&self, field: SearchField, term: &str) -> Result<Vec<Restaurant>, DbError> {
        // Safe: the column comes from the SearchField enum, never from input
        let query = format!(
            "SELECT {} FROM restaurants WHERE {} LIKE ? ORDER BY Name",
            RESTAURANT_COLUMNS,
            field.column()
        );
        let pattern = like_pattern(term);
        tracing::debug!(column = field.column(), %pattern, "restaurant search");

        let restaurants = sqlx::query_as::<_, Restaurant>(&query)
            .bind(pattern)
            .fetch_all(self.pool)
            .await?;
        Ok(restaurants)
    }

    /// Find the restaurant a client-side id refers to.
    ///
    /// Several restaurants can share a link fragment; the first by name wins
    /// so the same id always resolves to the same restaurant.
    pub async fn find_by_link(&self, link_id: &str) -> Result<Restaurant, DbError> {
        let query = format!(
            "SELECT {} FROM restaurants WHERE Links LIKE ? ORDER BY Name, id LIMIT 1",
            RESTAURANT_COLUMNS
        );
        sqlx::query_as::<_, Restaurant>(&query)
            .bind(like_pattern(link_id))
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "restaurant",
                id: link_id.to_owned(),
            })
    }

    /// Find a restaurant by its numeric row id.
    pub async fn find_by_id(&self, id: i64) -> Result<Restaurant, DbError> {
        let query = format!("SELECT {} FROM restaurants WHERE id = ?", RESTAURANT_COLUMNS);
        sqlx::query_as::<_, Restaurant>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "restaurant",
                id: id.to_string(),
            })
    }

    /// Canonical name used as the availability key.
    pub async fn resolve_name(&self, link_id: &str) -> Result<String, DbError> {
        Ok(self.find_by_link(link_id).await?.name)
    }

    /// Opening and closing time, when the dataset has them.
    pub async fn operating_hours(
        &self,
        link_id: &str,
    ) -> Result<(String, Option<NaiveTime>, Option<NaiveTime>), DbError> {
        sqlx::query_as::<_, (String, Option<NaiveTime>, Option<NaiveTime>)>(
            r#"
            SELECT Name, opening_time, closing_time
            FROM restaurants
            WHERE Links LIKE ?
            ORDER BY Name, id
            LIMIT 1
            "#,
        )
        .bind(like_pattern(link_id))
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "restaurant",
            id: link_id.to_owned(),
        })
    }

    /// Reviews recorded for a restaurant; reviewers without a name are numbered.
    pub async fn reviews_for(&self, restaurant_name: &str) -> Result<Vec<Review>, DbError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT Reviewer, Review, Rating
            FROM reviews
            WHERE Restaurant = ?
            ORDER BY id
            "#,
        )
        .bind(restaurant_name)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| Review {
                reviewer: row
                    .reviewer
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| format!("Reviewer {}", i + 1)),
                review: row.review,
                rating: row.rating,
            })
            .collect())
    }

    /// Restaurant plus reviews. Review lookup failures fall back to defaults.
    pub async fn detail(&self, link_id: &str) -> Result<RestaurantDetail, DbError> {
        let restaurant = self.find_by_link(link_id).await?;

        let reviews = match self.reviews_for(&restaurant.name).await {
            Ok(reviews) if !reviews.is_empty() => reviews,
            Ok(_) => {
                tracing::info!(restaurant = %restaurant.name, "no reviews recorded, using defaults");
                default_reviews()
            }
            Err(e) => {
                tracing::warn!(restaurant = %restaurant.name, error = %e, "review lookup failed, using defaults");
                default_reviews()
            }
        };

        Ok(RestaurantDetail { restaurant, reviews })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("pizza"), "%pizza%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn search_fields_map_to_columns() {
        assert_eq!(SearchField::Name.column(), "Name");
        assert_eq!(SearchField::Location.column(), "Address");
        assert_eq!(SearchField::Cuisine.column(), "Cuisines");
        assert_eq!(SearchField::Cuisine.describe("Thai"), "for cuisine: Thai");
    }

    #[test]
    fn three_default_reviews() {
        let reviews = default_reviews();
        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[0].reviewer, "John D.");
        assert_eq!(reviews[2].rating, Some(3.5));
    }

    #[test]
    fn detail_serializes_with_dataset_keys() {
        let detail = RestaurantDetail {
            restaurant: Restaurant {
                id: 7,
                name: "Olive Bistro".into(),
                links: "https://example.com/olive-bistro".into(),
                cost: Some(1200),
                collections: None,
                cuisines: Some("Italian, Continental".into()),
                timings: Some("12noon to 11pm".into()),
                rating: Some(4.3),
                address: Some("Road No. 36, Jubilee Hills".into()),
            },
            reviews: default_reviews(),
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["Name"], "Olive Bistro");
        assert_eq!(json["Cost"], 1200);
        assert!(json["Collections"].is_null());
        assert_eq!(json["Reviews"][1]["Reviewer"], "Sarah M.");
    }
}
