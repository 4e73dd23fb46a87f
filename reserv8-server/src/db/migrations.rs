//! Schema bootstrap
//!
//! Idempotent `CREATE TABLE IF NOT EXISTS` statements. Restaurant and
//! review columns keep the capitalised names of the imported dataset,
//! which is also how they appear in JSON responses.

use sqlx::MySqlPool;

const RESTAURANTS: &str = r#"
    CREATE TABLE IF NOT EXISTS restaurants (
        id INT AUTO_INCREMENT PRIMARY KEY,
        Name VARCHAR(255) NOT NULL,
        Links VARCHAR(512) NOT NULL,
        Cost INT NULL,
        Collections TEXT NULL,
        Cuisines VARCHAR(512) NULL,
        Timings VARCHAR(255) NULL,
        Rating DOUBLE NULL,
        Address VARCHAR(512) NULL,
        opening_time TIME NULL,
        closing_time TIME NULL,
        INDEX idx_restaurants_name (Name)
    )
"#;

const REVIEWS: &str = r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id INT AUTO_INCREMENT PRIMARY KEY,
        Restaurant VARCHAR(255) NOT NULL,
        Reviewer VARCHAR(255) NULL,
        Review TEXT NOT NULL,
        Rating DOUBLE NULL,
        INDEX idx_reviews_restaurant (Restaurant)
    )
"#;

const TIME_SLOT_AVAILABILITY: &str = r#"
    CREATE TABLE IF NOT EXISTS time_slot_availability (
        restaurant_name VARCHAR(255) NOT NULL,
        date DATE NOT NULL,
        time_slot CHAR(5) NOT NULL,
        total_tables INT NOT NULL DEFAULT 10,
        booked_tables INT NOT NULL DEFAULT 0,
        PRIMARY KEY (restaurant_name, date, time_slot),
        CONSTRAINT chk_booked_within_total
            CHECK (booked_tables >= 0 AND booked_tables <= total_tables)
    ) ENGINE = InnoDB
"#;

const BOOKINGS: &str = r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        restaurant_name VARCHAR(255) NOT NULL,
        date DATE NOT NULL,
        time_slot CHAR(5) NOT NULL,
        tables_booked INT NOT NULL,
        party_size INT NULL,
        customer_name VARCHAR(100) NOT NULL,
        email VARCHAR(254) NOT NULL,
        phone VARCHAR(32) NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        INDEX idx_bookings_slot (restaurant_name, date, time_slot)
    ) ENGINE = InnoDB
"#;

const USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        firebase_uid VARCHAR(128) NOT NULL,
        name VARCHAR(255) NULL,
        email VARCHAR(254) NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE KEY uq_users_firebase_uid (firebase_uid)
    )
"#;

/// Tables in creation order
pub const TABLES: &[(&str, &str)] = &[
    ("restaurants", RESTAURANTS),
    ("reviews", REVIEWS),
    ("time_slot_availability", TIME_SLOT_AVAILABILITY),
    ("bookings", BOOKINGS),
    ("users", USERS),
];

/// Create any missing tables
pub async fn run(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    for &(name, ddl) in TABLES {
        sqlx::query(ddl).execute(pool).await?;
        tracing::debug!(table = name, "table ready");
    }

    tracing::info!("Migrations complete");
    Ok(())
}
