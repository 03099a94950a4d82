//! Month-view aggregation - per-window booked/available counts for calendar pages.
//!
//! The summary is derived entirely at read time from the schedule and the live
//! booking rows, so it is always consistent with what the mutating operations
//! would decide.

use crate::{
    core::{capacity, schedule, tour},
    entities::tour as tour_entity,
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate, NaiveTime};
use sea_orm::DatabaseConnection;

/// One bookable window of one tour on one date, with its live occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSummary {
    /// Tour the window belongs to
    pub tour_id: i64,
    /// Calendar date of the window
    pub date: NaiveDate,
    /// Start time of the window
    pub start_time: NaiveTime,
    /// Slots currently held by active bookings and amendments
    pub booked: i32,
    /// Slots still bookable, floored at zero
    pub available: i32,
}

/// Builds the month view: every offered window of every day of the month, for one
/// tour or for all active tours, ordered by date then start time.
///
/// Blackout dates contribute no windows. Days with no recurring schedule for
/// their weekday are simply absent from the result.
pub async fn month_summary(
    db: &DatabaseConnection,
    tour_id: Option<i64>,
    year: i32,
    month: u32,
) -> Result<Vec<SlotSummary>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(Error::InvalidDate {
        message: format!("no such month: {year}-{month:02}"),
    })?;

    let tours: Vec<tour_entity::Model> = match tour_id {
        Some(id) => {
            let found = tour::get_tour_by_id(db, id)
                .await?
                .ok_or(Error::TourNotFound { tour_id: id })?;
            vec![found]
        }
        None => tour::get_all_active_tours(db).await?,
    };

    let mut summaries = Vec::new();
    let mut date = first;
    while date.month() == month {
        for t in &tours {
            for window in schedule::resolve_windows_for_tour(db, t, date).await? {
                let booked = capacity::consumed(db, t.id, date, window.start_time).await?;
                let available =
                    capacity::remaining_in_window(window.capacity, booked, t.id, date, window.start_time);
                summaries.push(SlotSummary {
                    tour_id: t.id,
                    date,
                    start_time: window.start_time,
                    booked,
                    available,
                });
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    Ok(summaries)
}
