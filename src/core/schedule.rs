//! Schedule catalog business logic - Resolves bookable windows for a tour and date.
//!
//! Combines the tour's recurring weekly rules with any per-date exception: a blackout
//! removes every window for the date (an empty result, not an error), while a date
//! capacity override takes precedence over both per-window overrides and the tour's
//! default ceiling. Duplicate start times across recurring rows are a configuration
//! error; the catalog de-duplicates them keeping the first capacity encountered and
//! logs a data-integrity warning.

use crate::{
    entities::{
        RecurringSchedule, ScheduleException, recurring_schedule, schedule_exception, tour,
        recurring_schedule::Weekday,
    },
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, prelude::*};
use tracing::warn;

/// One bookable time window on a specific date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Start time of the window
    pub start_time: NaiveTime,
    /// Total capacity of the window, in slots
    pub capacity: i32,
}

/// Resolves the bookable windows for a tour on a calendar date.
///
/// Returns an empty list when the date is blacked out - callers render this as
/// "no availability". Fails with [`Error::TourNotFound`] for unknown or deleted tours.
pub async fn resolve_windows<C>(db: &C, tour_id: i64, date: NaiveDate) -> Result<Vec<Window>>
where
    C: ConnectionTrait,
{
    let tour = crate::core::tour::get_tour_by_id(db, tour_id)
        .await?
        .ok_or(Error::TourNotFound { tour_id })?;

    resolve_windows_for_tour(db, &tour, date).await
}

/// Resolves windows for an already-loaded tour, avoiding a second catalog read when
/// the caller holds the tour inside an open transaction.
pub async fn resolve_windows_for_tour<C>(
    db: &C,
    tour: &tour::Model,
    date: NaiveDate,
) -> Result<Vec<Window>>
where
    C: ConnectionTrait,
{
    let exception = ScheduleException::find()
        .filter(schedule_exception::Column::TourId.eq(tour.id))
        .filter(schedule_exception::Column::Date.eq(date))
        .one(db)
        .await?;

    if let Some(ref exc) = exception {
        if exc.is_blackout {
            return Ok(Vec::new());
        }
    }

    let date_capacity = exception.and_then(|exc| exc.capacity_override);
    let weekday = Weekday::from(date.weekday());

    let rows = RecurringSchedule::find()
        .filter(recurring_schedule::Column::TourId.eq(tour.id))
        .filter(recurring_schedule::Column::Weekday.eq(weekday))
        .order_by_asc(recurring_schedule::Column::StartTime)
        .all(db)
        .await?;

    let mut windows: Vec<Window> = Vec::with_capacity(rows.len());
    for row in rows {
        if windows.iter().any(|w| w.start_time == row.start_time) {
            warn!(
                tour_id = tour.id,
                %date,
                start_time = %row.start_time,
                "Duplicate recurring window start time; keeping first capacity value"
            );
            continue;
        }

        let capacity = date_capacity
            .or(row.capacity_override)
            .unwrap_or(tour.group_size_limit);

        windows.push(Window {
            start_time: row.start_time,
            capacity,
        });
    }

    Ok(windows)
}

/// Finds the window at an exact start time, the lookup used by every mutating path.
///
/// Fails with [`Error::SlotNotFound`] when `(date, start_time)` is not an offered
/// window for the tour.
pub async fn find_window<C>(
    db: &C,
    tour: &tour::Model,
    date: NaiveDate,
    start_time: NaiveTime,
) -> Result<Window>
where
    C: ConnectionTrait,
{
    resolve_windows_for_tour(db, tour, date)
        .await?
        .into_iter()
        .find(|w| w.start_time == start_time)
        .ok_or(Error::SlotNotFound {
            tour_id: tour.id,
            date,
            start_time,
        })
}
