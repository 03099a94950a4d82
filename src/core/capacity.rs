//! Capacity ledger business logic - Read-time aggregation of slot consumption.
//!
//! Capacity is computed, never stored: consumption for a `(tour_id, date, start_time)`
//! key is re-aggregated from the booking and amendment rows on every read. Cancelling
//! a booking therefore frees its capacity (and that of its linked amendments) without
//! any explicit release bookkeeping, at the cost of re-reading the rows each time.
//! All mutation happens through the booking reconciler; this module is pure reads.

use crate::{
    entities::{
        AdditionalBooking, Booking, additional_booking, booking,
        booking::BookingStatus,
    },
    errors::Result,
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::prelude::*;
use tracing::error;

/// Statuses under which a booking's slots count against its capacity key.
const ACTIVE_STATUSES: [BookingStatus; 3] = [
    BookingStatus::Pending,
    BookingStatus::Confirmed,
    BookingStatus::Rescheduled,
];

/// Computes the total slots consumed for a capacity key.
///
/// Sums `slots` over all active bookings with the key, plus `added_slots` over all
/// non-cancelled amendments whose parent booking matches. Amendments of cancelled
/// parents are excluded automatically because the parent no longer matches.
pub async fn consumed<C>(
    db: &C,
    tour_id: i64,
    date: NaiveDate,
    start_time: NaiveTime,
) -> Result<i32>
where
    C: ConnectionTrait,
{
    consumed_excluding(db, tour_id, date, start_time, None).await
}

/// Computes consumed slots for a key while ignoring one booking's contribution.
///
/// The reschedule path uses this to validate the target key without counting the
/// booking being moved (its amendments are excluded with it, since they hang off the
/// excluded parent).
pub async fn consumed_excluding<C>(
    db: &C,
    tour_id: i64,
    date: NaiveDate,
    start_time: NaiveTime,
    exclude_booking_id: Option<i64>,
) -> Result<i32>
where
    C: ConnectionTrait,
{
    let mut query = Booking::find()
        .filter(booking::Column::TourId.eq(tour_id))
        .filter(booking::Column::Date.eq(date))
        .filter(booking::Column::StartTime.eq(start_time))
        .filter(booking::Column::Status.is_in(ACTIVE_STATUSES));

    if let Some(excluded) = exclude_booking_id {
        query = query.filter(booking::Column::Id.ne(excluded));
    }

    let bookings = query.all(db).await?;
    let booked: i32 = bookings.iter().map(|b| b.slots).sum();

    let parent_ids: Vec<i64> = bookings.iter().map(|b| b.id).collect();
    let amended: i32 = if parent_ids.is_empty() {
        0
    } else {
        AdditionalBooking::find()
            .filter(additional_booking::Column::BookingId.is_in(parent_ids))
            .filter(additional_booking::Column::IsCancelled.eq(false))
            .all(db)
            .await?
            .iter()
            .map(|a| a.added_slots)
            .sum()
    };

    Ok(booked + amended)
}

/// Computes remaining capacity against a known window capacity, clamped at zero.
///
/// A consumption figure above the window's capacity means the atomicity guarantee was
/// broken upstream; it is logged loudly and the result clamps to zero so reads stay
/// usable while the breach is investigated.
pub fn remaining_in_window(
    capacity: i32,
    consumed_slots: i32,
    tour_id: i64,
    date: NaiveDate,
    start_time: NaiveTime,
) -> i32 {
    if consumed_slots > capacity {
        error!(
            tour_id,
            %date,
            %start_time,
            capacity,
            consumed = consumed_slots,
            "Capacity invariant breached: consumed exceeds window capacity"
        );
    }
    (capacity - consumed_slots).max(0)
}

/// Answers "how many slots remain" for a tour, date, and start time.
///
/// Fails with `SlotNotFound` when the key is not an offered window. This is the read
/// behind the availability endpoint; mutating paths re-run the same computation
/// inside their own transaction rather than trusting this value.
pub async fn remaining<C>(
    db: &C,
    tour_id: i64,
    date: NaiveDate,
    start_time: NaiveTime,
) -> Result<i32>
where
    C: ConnectionTrait,
{
    let tour = crate::core::tour::get_tour_by_id(db, tour_id)
        .await?
        .ok_or(crate::errors::Error::TourNotFound { tour_id })?;
    let window = crate::core::schedule::find_window(db, &tour, date, start_time).await?;
    let consumed_slots = consumed(db, tour_id, date, start_time).await?;

    Ok(remaining_in_window(
        window.capacity,
        consumed_slots,
        tour_id,
        date,
        start_time,
    ))
}
