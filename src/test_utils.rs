//! Shared test utilities for `TourBook`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        booking::{AmendBookingRequest, CreateBookingRequest},
        promo, tour,
    },
    entities,
    entities::recurring_schedule::Weekday,
    errors::Result,
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The reference booking date used throughout the tests: 2025-06-01, a Sunday.
#[must_use]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default()
}

/// Builds a `NaiveTime` from hours and minutes.
#[must_use]
pub fn test_time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Creates a test tour with sensible defaults.
///
/// # Defaults
/// * `group_size_limit`: 8
/// * `rate`: 50.0
/// * `duration_minutes`: 120
pub async fn create_test_tour(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::tour::Model> {
    tour::create_tour(db, name.to_string(), 8, 50.0, 120).await
}

/// Creates a test tour with a custom capacity ceiling.
pub async fn create_tour_with_capacity(
    db: &DatabaseConnection,
    name: &str,
    group_size_limit: i32,
) -> Result<entities::tour::Model> {
    tour::create_tour(db, name.to_string(), group_size_limit, 50.0, 120).await
}

/// Sets up a complete test environment with a tour offering Sunday windows at
/// 09:00 and 14:00 (covering the reference `test_date`).
/// Returns (db, tour) for common booking scenarios.
pub async fn setup_with_tour() -> Result<(DatabaseConnection, entities::tour::Model)> {
    let db = setup_test_db().await?;
    let tour = create_test_tour(&db, "Test Tour").await?;
    tour::add_recurring_window(&db, tour.id, Weekday::Sunday, test_time(9, 0), None).await?;
    tour::add_recurring_window(&db, tour.id, Weekday::Sunday, test_time(14, 0), None).await?;
    Ok((db, tour))
}

/// Builds a create-booking request for the reference date's 09:00 window with
/// no products, no promo, and a default customer.
#[must_use]
pub fn booking_request(tour_id: i64, slots: i32) -> CreateBookingRequest {
    CreateBookingRequest {
        tour_id,
        date: test_date(),
        start_time: test_time(9, 0),
        slots,
        customer_name: "Test Customer".to_string(),
        customer_email: Some("customer@example.com".to_string()),
        products: Vec::new(),
        promo_code: None,
        confirm: false,
    }
}

/// Creates a slots-only amendment against an existing booking.
pub async fn create_test_amendment(
    db: &DatabaseConnection,
    booking_id: i64,
    added_slots: i32,
) -> Result<entities::additional_booking::Model> {
    crate::core::booking::amend_booking(
        db,
        AmendBookingRequest {
            booking_id,
            added_slots,
            products: Vec::new(),
            promo_code: None,
        },
    )
    .await
}

/// Creates an active 10%-off test promo code with an optional usage limit.
pub async fn create_test_promo(
    db: &DatabaseConnection,
    code: &str,
    max_uses: Option<i32>,
) -> Result<entities::promo_code::Model> {
    let created = promo::create_promo_code(
        db,
        code,
        entities::promo_code::DiscountType::Percentage,
        10.0,
        None,
        max_uses,
    )
    .await?;

    created.ok_or_else(|| crate::errors::Error::Config {
        message: format!("Test promo '{code}' already exists"),
    })
}
