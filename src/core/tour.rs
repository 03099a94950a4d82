//! Tour catalog business logic - Handles tour lookups and catalog seeding.
//!
//! Provides functions for creating and retrieving tours along with their recurring
//! schedule windows and per-date exceptions. The booking core treats this catalog as
//! read-only input; rows are created by the management surface or by seeding.

use crate::{
    entities::{
        Tour, recurring_schedule, schedule_exception, tour,
        recurring_schedule::Weekday,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all active (non-deleted) tours, ordered alphabetically by name.
pub async fn get_all_active_tours(db: &DatabaseConnection) -> Result<Vec<tour::Model>> {
    Tour::find()
        .filter(tour::Column::IsDeleted.eq(false))
        .order_by_asc(tour::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active tour by its unique ID, returning None if missing or deleted.
pub async fn get_tour_by_id<C>(db: &C, tour_id: i64) -> Result<Option<tour::Model>>
where
    C: ConnectionTrait,
{
    Tour::find_by_id(tour_id)
        .filter(tour::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active tour by name, used by catalog seeding to avoid duplicates.
pub async fn get_tour_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<tour::Model>> {
    Tour::find()
        .filter(tour::Column::Name.eq(name))
        .filter(tour::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new tour with the specified parameters, performing input validation.
///
/// The name must be non-empty, the capacity ceiling at least one slot, and the rate
/// non-negative and finite.
pub async fn create_tour(
    db: &DatabaseConnection,
    name: String,
    group_size_limit: i32,
    rate: f64,
    duration_minutes: i32,
) -> Result<tour::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Tour name cannot be empty".to_string(),
        });
    }

    if group_size_limit < 1 {
        return Err(Error::InvalidSlots {
            slots: group_size_limit,
        });
    }

    if rate < 0.0 || !rate.is_finite() {
        return Err(Error::InvalidAmount { amount: rate });
    }

    let tour = tour::ActiveModel {
        name: Set(name.trim().to_string()),
        group_size_limit: Set(group_size_limit),
        rate: Set(rate),
        duration_minutes: Set(duration_minutes),
        is_deleted: Set(false),
        ..Default::default()
    };

    let result = tour.insert(db).await?;
    Ok(result)
}

/// Declares a recurring weekly window for a tour.
pub async fn add_recurring_window(
    db: &DatabaseConnection,
    tour_id: i64,
    weekday: Weekday,
    start_time: NaiveTime,
    capacity_override: Option<i32>,
) -> Result<recurring_schedule::Model> {
    if let Some(capacity) = capacity_override {
        if capacity < 1 {
            return Err(Error::InvalidSlots { slots: capacity });
        }
    }

    let window = recurring_schedule::ActiveModel {
        tour_id: Set(tour_id),
        weekday: Set(weekday),
        start_time: Set(start_time),
        capacity_override: Set(capacity_override),
        ..Default::default()
    };

    let result = window.insert(db).await?;
    Ok(result)
}

/// Declares a per-date schedule exception (blackout or capacity change) for a tour.
pub async fn add_schedule_exception(
    db: &DatabaseConnection,
    tour_id: i64,
    date: NaiveDate,
    is_blackout: bool,
    capacity_override: Option<i32>,
) -> Result<schedule_exception::Model> {
    if let Some(capacity) = capacity_override {
        if capacity < 1 {
            return Err(Error::InvalidSlots { slots: capacity });
        }
    }

    let exception = schedule_exception::ActiveModel {
        tour_id: Set(tour_id),
        date: Set(date),
        is_blackout: Set(is_blackout),
        capacity_override: Set(capacity_override),
        ..Default::default()
    };

    let result = exception.insert(db).await?;
    Ok(result)
}
