//! Booking reconciliation business logic - The lifecycle state machine and every
//! capacity-mutating operation.
//!
//! Create, reschedule, cancel, and amend all run as single atomic units: each opens
//! one database transaction, re-checks capacity (and promo usage) inside it, and
//! commits or rolls back as a whole. Two concurrent requests for the last seat of a
//! window are serialized by the store, so exactly one succeeds. Transient lock
//! conflicts are retried a bounded number of times before surfacing as `Busy`.

use crate::{
    core::{capacity, pricing, pricing::ProductLine, promo, schedule},
    entities::{
        AdditionalBooking, Booking, additional_booking, booking, booking_product,
        booking::{BookingStatus, PaymentStatus},
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, warn};

/// Upper bound on internal retries for transient store conflicts.
const MAX_TXN_RETRIES: u32 = 3;

/// Everything needed to create a booking.
#[derive(Debug, Clone)]
pub struct CreateBookingRequest {
    /// Tour being booked
    pub tour_id: i64,
    /// Calendar date of the requested window
    pub date: NaiveDate,
    /// Start time of the requested window
    pub start_time: NaiveTime,
    /// Seats requested (>= 1)
    pub slots: i32,
    /// Name of the booking customer
    pub customer_name: String,
    /// Contact email of the booking customer
    pub customer_email: Option<String>,
    /// Product line items to snapshot into the booking
    pub products: Vec<ProductLine>,
    /// Promo code to validate and apply, if any
    pub promo_code: Option<String>,
    /// Persist as confirmed instead of pending (calling flow needs no payment step)
    pub confirm: bool,
}

/// Everything needed to amend an existing booking.
#[derive(Debug, Clone)]
pub struct AmendBookingRequest {
    /// Parent booking to extend
    pub booking_id: i64,
    /// Extra seats to add against the parent's capacity key (0 = product-only)
    pub added_slots: i32,
    /// Product line items to snapshot into the amendment
    pub products: Vec<ProductLine>,
    /// Promo code applied to the amendment's own price, if any
    pub promo_code: Option<String>,
}

/// Whether a database error is a transient lock/contention failure worth retrying.
fn is_transient(err: &DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("busy")
}

/// Creates a booking as one atomic unit: window lookup, capacity re-check, promo
/// reservation, pricing, and persistence all inside a single transaction.
///
/// Slot-count validation happens before any transaction opens. A capacity shortfall
/// is returned as [`Error::InsufficientCapacity`], never silently clamped; a promo
/// failure aborts the whole booking. Transient conflicts are retried up to
/// [`MAX_TXN_RETRIES`] times, then surfaced as [`Error::Busy`].
pub async fn create_booking(
    db: &DatabaseConnection,
    request: CreateBookingRequest,
) -> Result<booking::Model> {
    if request.slots < 1 {
        return Err(Error::InvalidSlots {
            slots: request.slots,
        });
    }

    let mut attempts = 0;
    loop {
        match try_create_booking(db, &request).await {
            Err(Error::Database(err)) if is_transient(&err) => {
                attempts += 1;
                if attempts >= MAX_TXN_RETRIES {
                    warn!(attempts, tour_id = request.tour_id, "Create kept conflicting");
                    return Err(Error::Busy);
                }
            }
            other => return other,
        }
    }
}

async fn try_create_booking(
    db: &DatabaseConnection,
    request: &CreateBookingRequest,
) -> Result<booking::Model> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let tour = crate::core::tour::get_tour_by_id(&txn, request.tour_id)
        .await?
        .ok_or(Error::TourNotFound {
            tour_id: request.tour_id,
        })?;

    let window =
        schedule::find_window(&txn, &tour, request.date, request.start_time).await?;

    let used =
        capacity::consumed(&txn, request.tour_id, request.date, request.start_time).await?;
    if used > window.capacity {
        return Err(Error::InvariantViolation {
            message: format!(
                "window {} {} of tour {} holds {used} slots against capacity {}",
                request.date, request.start_time, request.tour_id, window.capacity
            ),
        });
    }

    let remaining = window.capacity - used;
    if remaining < request.slots {
        return Err(Error::InsufficientCapacity {
            requested: request.slots,
            remaining,
        });
    }

    let applied_promo = match &request.promo_code {
        Some(code) => {
            let promo = promo::validate_promo(&txn, code, now).await?;
            promo::reserve_promo_use(&txn, &promo).await?;
            Some(promo)
        }
        None => None,
    };

    let quote = pricing::quote(
        tour.rate,
        request.slots,
        &request.products,
        applied_promo.as_ref(),
    );

    let status = if request.confirm {
        BookingStatus::Confirmed
    } else {
        BookingStatus::Pending
    };

    let model = booking::ActiveModel {
        tour_id: Set(request.tour_id),
        date: Set(request.date),
        start_time: Set(request.start_time),
        slots: Set(request.slots),
        status: Set(status),
        payment_status: Set(PaymentStatus::Pending),
        promo_code_id: Set(applied_promo.as_ref().map(|p| p.id)),
        customer_name: Set(request.customer_name.clone()),
        customer_email: Set(request.customer_email.clone()),
        total_price: Set(quote.total),
        created_at: Set(now),
        ..Default::default()
    };
    let created = model.insert(&txn).await?;

    insert_product_lines(&txn, Some(created.id), None, &request.products).await?;

    txn.commit().await?;

    info!(
        booking_id = created.id,
        tour_id = created.tour_id,
        date = %created.date,
        start_time = %created.start_time,
        slots = created.slots,
        total = created.total_price,
        "Created booking"
    );

    Ok(created)
}

/// Moves a booking to a new date/time atomically across both capacity keys.
///
/// The booking's own slots and all its active amendments move together; the target
/// window is re-validated with the booking's current contribution excluded. If the
/// target lacks capacity the operation fails and the source booking is left
/// completely unchanged.
pub async fn reschedule_booking(
    db: &DatabaseConnection,
    booking_id: i64,
    new_date: NaiveDate,
    new_start_time: NaiveTime,
) -> Result<booking::Model> {
    let mut attempts = 0;
    loop {
        match try_reschedule_booking(db, booking_id, new_date, new_start_time).await {
            Err(Error::Database(err)) if is_transient(&err) => {
                attempts += 1;
                if attempts >= MAX_TXN_RETRIES {
                    warn!(attempts, booking_id, "Reschedule kept conflicting");
                    return Err(Error::Busy);
                }
            }
            other => return other,
        }
    }
}

async fn try_reschedule_booking(
    db: &DatabaseConnection,
    booking_id: i64,
    new_date: NaiveDate,
    new_start_time: NaiveTime,
) -> Result<booking::Model> {
    let txn = db.begin().await?;

    let existing = Booking::find_by_id(booking_id)
        .one(&txn)
        .await?
        .ok_or(Error::BookingNotFound { booking_id })?;

    if !existing.status.holds_capacity() {
        return Err(Error::InvalidTransition {
            booking_id,
            status: existing.status,
            action: "reschedule",
        });
    }

    let tour = crate::core::tour::get_tour_by_id(&txn, existing.tour_id)
        .await?
        .ok_or(Error::TourNotFound {
            tour_id: existing.tour_id,
        })?;

    let window = schedule::find_window(&txn, &tour, new_date, new_start_time).await?;

    // Amendments ride along with the parent, so the whole block must fit.
    let moved_slots = existing.slots + active_amendment_slots(&txn, existing.id).await?;

    let used = capacity::consumed_excluding(
        &txn,
        existing.tour_id,
        new_date,
        new_start_time,
        Some(existing.id),
    )
    .await?;

    let remaining = window.capacity - used;
    if remaining < moved_slots {
        return Err(Error::InsufficientCapacity {
            requested: moved_slots,
            remaining: remaining.max(0),
        });
    }

    let old_date = existing.date;
    let old_start_time = existing.start_time;

    let mut active: booking::ActiveModel = existing.into();
    active.date = Set(new_date);
    active.start_time = Set(new_start_time);
    active.status = Set(BookingStatus::Rescheduled);
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    info!(
        booking_id = updated.id,
        from_date = %old_date,
        from_time = %old_start_time,
        to_date = %updated.date,
        to_time = %updated.start_time,
        moved_slots,
        "Rescheduled booking"
    );

    Ok(updated)
}

/// Cancels a booking; its capacity (and that of its linked amendments) is freed
/// implicitly because cancelled bookings drop out of the read-time aggregation.
pub async fn cancel_booking(db: &DatabaseConnection, booking_id: i64) -> Result<booking::Model> {
    let existing = Booking::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or(Error::BookingNotFound { booking_id })?;

    if existing.status.is_terminal() {
        return Err(Error::InvalidTransition {
            booking_id,
            status: existing.status,
            action: "cancel",
        });
    }

    let mut active: booking::ActiveModel = existing.into();
    active.status = Set(BookingStatus::Cancelled);
    let updated = active.update(db).await?;

    info!(booking_id = updated.id, "Cancelled booking");
    Ok(updated)
}

/// Adds slots and/or products to an existing booking against its current capacity
/// key, with the same atomicity as create.
///
/// The amendment is priced and paid independently; the parent booking's own `slots`
/// field is never mutated.
pub async fn amend_booking(
    db: &DatabaseConnection,
    request: AmendBookingRequest,
) -> Result<additional_booking::Model> {
    if request.added_slots < 0 || (request.added_slots == 0 && request.products.is_empty()) {
        return Err(Error::InvalidSlots {
            slots: request.added_slots,
        });
    }

    let mut attempts = 0;
    loop {
        match try_amend_booking(db, &request).await {
            Err(Error::Database(err)) if is_transient(&err) => {
                attempts += 1;
                if attempts >= MAX_TXN_RETRIES {
                    warn!(attempts, booking_id = request.booking_id, "Amend kept conflicting");
                    return Err(Error::Busy);
                }
            }
            other => return other,
        }
    }
}

async fn try_amend_booking(
    db: &DatabaseConnection,
    request: &AmendBookingRequest,
) -> Result<additional_booking::Model> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let parent = Booking::find_by_id(request.booking_id)
        .one(&txn)
        .await?
        .ok_or(Error::BookingNotFound {
            booking_id: request.booking_id,
        })?;

    if !parent.status.holds_capacity() {
        return Err(Error::InvalidTransition {
            booking_id: parent.id,
            status: parent.status,
            action: "amend",
        });
    }

    let tour = crate::core::tour::get_tour_by_id(&txn, parent.tour_id)
        .await?
        .ok_or(Error::TourNotFound {
            tour_id: parent.tour_id,
        })?;

    if request.added_slots > 0 {
        let window = schedule::find_window(&txn, &tour, parent.date, parent.start_time).await?;
        let used = capacity::consumed(&txn, parent.tour_id, parent.date, parent.start_time).await?;
        let remaining = window.capacity - used;
        if remaining < request.added_slots {
            return Err(Error::InsufficientCapacity {
                requested: request.added_slots,
                remaining: remaining.max(0),
            });
        }
    }

    let applied_promo = match &request.promo_code {
        Some(code) => {
            let promo = promo::validate_promo(&txn, code, now).await?;
            promo::reserve_promo_use(&txn, &promo).await?;
            Some(promo)
        }
        None => None,
    };

    let quote = pricing::quote(
        tour.rate,
        request.added_slots,
        &request.products,
        applied_promo.as_ref(),
    );

    let model = additional_booking::ActiveModel {
        booking_id: Set(parent.id),
        added_slots: Set(request.added_slots),
        promo_code_id: Set(applied_promo.as_ref().map(|p| p.id)),
        payment_status: Set(PaymentStatus::Pending),
        is_cancelled: Set(false),
        total_price: Set(quote.total),
        created_at: Set(now),
        ..Default::default()
    };
    let created = model.insert(&txn).await?;

    insert_product_lines(&txn, None, Some(created.id), &request.products).await?;

    txn.commit().await?;

    info!(
        additional_booking_id = created.id,
        booking_id = created.booking_id,
        added_slots = created.added_slots,
        total = created.total_price,
        "Amended booking"
    );

    Ok(created)
}

/// Voids an amendment, freeing its `added_slots` from the parent's capacity key.
pub async fn cancel_amendment(
    db: &DatabaseConnection,
    additional_booking_id: i64,
) -> Result<additional_booking::Model> {
    let existing = AdditionalBooking::find_by_id(additional_booking_id)
        .one(db)
        .await?
        .ok_or(Error::AmendmentNotFound {
            additional_booking_id,
        })?;

    if existing.is_cancelled {
        return Err(Error::InvalidTransition {
            booking_id: existing.booking_id,
            status: BookingStatus::Cancelled,
            action: "cancel amendment",
        });
    }

    let mut active: additional_booking::ActiveModel = existing.into();
    active.is_cancelled = Set(true);
    let updated = active.update(db).await?;

    info!(
        additional_booking_id = updated.id,
        booking_id = updated.booking_id,
        "Cancelled amendment"
    );
    Ok(updated)
}

/// Confirms a pending or rescheduled booking.
pub async fn confirm_booking(db: &DatabaseConnection, booking_id: i64) -> Result<booking::Model> {
    transition(
        db,
        booking_id,
        &[BookingStatus::Pending, BookingStatus::Rescheduled],
        BookingStatus::Confirmed,
        "confirm",
    )
    .await
}

/// Records post-hoc that a confirmed booking's session took place.
pub async fn mark_completed(db: &DatabaseConnection, booking_id: i64) -> Result<booking::Model> {
    transition(
        db,
        booking_id,
        &[BookingStatus::Confirmed],
        BookingStatus::Completed,
        "complete",
    )
    .await
}

/// Records post-hoc that a confirmed booking's customer never arrived.
pub async fn mark_no_show(db: &DatabaseConnection, booking_id: i64) -> Result<booking::Model> {
    transition(
        db,
        booking_id,
        &[BookingStatus::Confirmed],
        BookingStatus::NoShow,
        "mark no-show",
    )
    .await
}

async fn transition(
    db: &DatabaseConnection,
    booking_id: i64,
    allowed_from: &[BookingStatus],
    to: BookingStatus,
    action: &'static str,
) -> Result<booking::Model> {
    let existing = Booking::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or(Error::BookingNotFound { booking_id })?;

    if !allowed_from.contains(&existing.status) {
        return Err(Error::InvalidTransition {
            booking_id,
            status: existing.status,
            action,
        });
    }

    let mut active: booking::ActiveModel = existing.into();
    active.status = Set(to);
    let updated = active.update(db).await?;

    info!(booking_id = updated.id, status = ?updated.status, "Booking status updated");
    Ok(updated)
}

/// Records the payment state fed by the payment channel. Payment state never drives
/// capacity accounting.
pub async fn update_payment_status(
    db: &DatabaseConnection,
    booking_id: i64,
    payment_status: PaymentStatus,
) -> Result<booking::Model> {
    let existing = Booking::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or(Error::BookingNotFound { booking_id })?;

    let mut active: booking::ActiveModel = existing.into();
    active.payment_status = Set(payment_status);
    let updated = active.update(db).await?;

    info!(
        booking_id = updated.id,
        payment_status = ?updated.payment_status,
        "Booking payment status updated"
    );
    Ok(updated)
}

/// Records the payment state of an amendment's own payment sub-record.
pub async fn update_amendment_payment_status(
    db: &DatabaseConnection,
    additional_booking_id: i64,
    payment_status: PaymentStatus,
) -> Result<additional_booking::Model> {
    let existing = AdditionalBooking::find_by_id(additional_booking_id)
        .one(db)
        .await?
        .ok_or(Error::AmendmentNotFound {
            additional_booking_id,
        })?;

    let mut active: additional_booking::ActiveModel = existing.into();
    active.payment_status = Set(payment_status);
    let updated = active.update(db).await?;

    info!(
        additional_booking_id = updated.id,
        payment_status = ?updated.payment_status,
        "Amendment payment status updated"
    );
    Ok(updated)
}

/// Retrieves a booking by its unique ID.
pub async fn get_booking_by_id(
    db: &DatabaseConnection,
    booking_id: i64,
) -> Result<Option<booking::Model>> {
    Booking::find_by_id(booking_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all bookings for a tour and date, newest first.
pub async fn get_bookings_for_tour_date(
    db: &DatabaseConnection,
    tour_id: i64,
    date: NaiveDate,
) -> Result<Vec<booking::Model>> {
    Booking::find()
        .filter(booking::Column::TourId.eq(tour_id))
        .filter(booking::Column::Date.eq(date))
        .order_by_desc(booking::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all amendments linked to a booking, oldest first.
pub async fn get_amendments_for_booking(
    db: &DatabaseConnection,
    booking_id: i64,
) -> Result<Vec<additional_booking::Model>> {
    AdditionalBooking::find()
        .filter(additional_booking::Column::BookingId.eq(booking_id))
        .order_by_asc(additional_booking::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sums the `added_slots` of a booking's non-cancelled amendments.
async fn active_amendment_slots<C>(db: &C, booking_id: i64) -> Result<i32>
where
    C: ConnectionTrait,
{
    let amendments = AdditionalBooking::find()
        .filter(additional_booking::Column::BookingId.eq(booking_id))
        .filter(additional_booking::Column::IsCancelled.eq(false))
        .all(db)
        .await?;

    Ok(amendments.iter().map(|a| a.added_slots).sum())
}

/// Snapshots product lines into the `booking_products` table for either a booking
/// or an amendment.
async fn insert_product_lines<C>(
    db: &C,
    booking_id: Option<i64>,
    additional_booking_id: Option<i64>,
    products: &[ProductLine],
) -> Result<()>
where
    C: ConnectionTrait,
{
    for line in products {
        let model = booking_product::ActiveModel {
            booking_id: Set(booking_id),
            additional_booking_id: Set(additional_booking_id),
            name: Set(line.name.clone()),
            unit_price: Set(line.unit_price),
            quantity: Set(line.quantity),
            ..Default::default()
        };
        model.insert(db).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::capacity::{consumed, remaining};
    use crate::entities::{BookingProduct, PromoCode, recurring_schedule::Weekday};
    use crate::test_utils::{
        booking_request, create_test_amendment, create_test_promo, create_tour_with_capacity,
        setup_with_tour, test_date, test_time,
    };

    #[tokio::test]
    async fn test_create_booking_happy_path() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let created = create_booking(&db, booking_request(tour.id, 2)).await?;

        assert_eq!(created.tour_id, tour.id);
        assert_eq!(created.slots, 2);
        assert_eq!(created.status, BookingStatus::Pending);
        assert_eq!(created.payment_status, PaymentStatus::Pending);
        assert_eq!(created.total_price, 100.0);
        assert!(created.promo_code_id.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_confirmed_when_requested() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let mut request = booking_request(tour.id, 1);
        request.confirm = true;
        let created = create_booking(&db, request).await?;
        assert_eq!(created.status, BookingStatus::Confirmed);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_snapshots_products() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let mut request = booking_request(tour.id, 1);
        request.products = vec![ProductLine {
            name: "Photo Package".to_string(),
            unit_price: 10.0,
            quantity: 2,
        }];
        let created = create_booking(&db, request).await?;
        assert_eq!(created.total_price, 70.0);

        let lines = BookingProduct::find()
            .filter(booking_product::Column::BookingId.eq(created.id))
            .all(&db)
            .await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Photo Package");
        assert_eq!(lines[0].unit_price, 10.0);
        assert_eq!(lines[0].quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_rejects_invalid_slots_before_any_query() -> Result<()> {
        // A mock connection proves validation happens before any transaction opens
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Sqlite).into_connection();

        let result = create_booking(&db, booking_request(1, 0)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidSlots { slots: 0 }));

        let result = create_booking(&db, booking_request(1, -3)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidSlots { slots: -3 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_rejects_unoffered_window() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let mut request = booking_request(tour.id, 1);
        request.start_time = test_time(11, 0);
        let result = create_booking(&db, request).await;
        assert!(matches!(result.unwrap_err(), Error::SlotNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_capacity_scenario_from_month_view() -> Result<()> {
        // Tour capacity 4; one 3-slot booking exists => remaining 1;
        // a 2-slot request fails, a 1-slot request succeeds, remaining hits 0.
        let db = crate::test_utils::setup_test_db().await?;
        let tour = create_tour_with_capacity(&db, "Small Boat", 4).await?;
        crate::core::tour::add_recurring_window(
            &db,
            tour.id,
            Weekday::Sunday,
            test_time(9, 0),
            None,
        )
        .await?;

        let mut first = booking_request(tour.id, 3);
        first.confirm = true;
        create_booking(&db, first).await?;
        assert_eq!(remaining(&db, tour.id, test_date(), test_time(9, 0)).await?, 1);

        let rejected = create_booking(&db, booking_request(tour.id, 2)).await;
        assert!(matches!(
            rejected.unwrap_err(),
            Error::InsufficientCapacity {
                requested: 2,
                remaining: 1
            }
        ));

        create_booking(&db, booking_request(tour.id, 1)).await?;
        assert_eq!(remaining(&db, tour.id, test_date(), test_time(9, 0)).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_applies_promo() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;
        let promo = create_test_promo(&db, "SAVE10", Some(5)).await?;

        let mut request = booking_request(tour.id, 2);
        request.promo_code = Some("save10".to_string());
        let created = create_booking(&db, request).await?;

        // rate 50 x 2 slots = 100, minus 10%
        assert_eq!(created.total_price, 90.0);
        assert_eq!(created.promo_code_id, Some(promo.id));

        let reloaded = PromoCode::find_by_id(promo.id).one(&db).await?.unwrap();
        assert_eq!(reloaded.times_used, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_promo_failure_aborts_whole_booking() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;
        let promo = create_test_promo(&db, "ONCE", Some(1)).await?;
        crate::core::promo::reserve_promo_use(&db, &promo).await?;

        let mut request = booking_request(tour.id, 2);
        request.promo_code = Some("ONCE".to_string());
        let result = create_booking(&db, request).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::PromoUsageExceeded { .. }
        ));

        // No partial commit: no booking row, no capacity consumed
        assert!(get_bookings_for_tour_date(&db, tour.id, test_date()).await?.is_empty());
        assert_eq!(consumed(&db, tour.id, test_date(), test_time(9, 0)).await?, 0);

        let reloaded = PromoCode::find_by_id(promo.id).one(&db).await?.unwrap();
        assert_eq!(reloaded.times_used, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_frees_capacity() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let before = remaining(&db, tour.id, test_date(), test_time(9, 0)).await?;
        let created = create_booking(&db, booking_request(tour.id, 3)).await?;
        cancel_booking(&db, created.id).await?;

        let after = remaining(&db, tour.id, test_date(), test_time(9, 0)).await?;
        assert_eq!(before, after);

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_terminal_booking_is_rejected() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let created = create_booking(&db, booking_request(tour.id, 1)).await?;
        cancel_booking(&db, created.id).await?;

        let again = cancel_booking(&db, created.id).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::InvalidTransition {
                status: BookingStatus::Cancelled,
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_reschedule_moves_capacity_between_keys() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let created = create_booking(&db, booking_request(tour.id, 3)).await?;
        create_test_amendment(&db, created.id, 1).await?;

        let updated =
            reschedule_booking(&db, created.id, test_date(), test_time(14, 0)).await?;
        assert_eq!(updated.status, BookingStatus::Rescheduled);
        assert_eq!(updated.start_time, test_time(14, 0));

        // Slots and amendment moved together
        assert_eq!(consumed(&db, tour.id, test_date(), test_time(9, 0)).await?, 0);
        assert_eq!(consumed(&db, tour.id, test_date(), test_time(14, 0)).await?, 4);

        Ok(())
    }

    #[tokio::test]
    async fn test_reschedule_failure_leaves_source_untouched() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        // Fill the 14:00 window completely (test tour capacity is 8)
        let mut filler = booking_request(tour.id, 8);
        filler.start_time = test_time(14, 0);
        create_booking(&db, filler).await?;

        let created = create_booking(&db, booking_request(tour.id, 3)).await?;
        let result = reschedule_booking(&db, created.id, test_date(), test_time(14, 0)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientCapacity { requested: 3, .. }
        ));

        // Round trip: attempt-and-fail leaves state identical to before the attempt
        let reloaded = get_booking_by_id(&db, created.id).await?.unwrap();
        assert_eq!(reloaded.status, BookingStatus::Pending);
        assert_eq!(reloaded.date, test_date());
        assert_eq!(reloaded.start_time, test_time(9, 0));
        assert_eq!(consumed(&db, tour.id, test_date(), test_time(9, 0)).await?, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_reschedule_to_unoffered_window_is_rejected() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;
        let created = create_booking(&db, booking_request(tour.id, 1)).await?;

        let result = reschedule_booking(&db, created.id, test_date(), test_time(16, 0)).await;
        assert!(matches!(result.unwrap_err(), Error::SlotNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_reschedule_cancelled_booking_is_rejected() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;
        let created = create_booking(&db, booking_request(tour.id, 1)).await?;
        cancel_booking(&db, created.id).await?;

        let result = reschedule_booking(&db, created.id, test_date(), test_time(14, 0)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition {
                action: "reschedule",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_amend_leaves_parent_slots_unmodified() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let parent = create_booking(&db, booking_request(tour.id, 2)).await?;
        let amendment = create_test_amendment(&db, parent.id, 2).await?;

        assert_eq!(amendment.added_slots, 2);
        assert_eq!(amendment.total_price, 100.0);
        assert_eq!(amendment.payment_status, PaymentStatus::Pending);

        let reloaded = get_booking_by_id(&db, parent.id).await?.unwrap();
        assert_eq!(reloaded.slots, 2);
        assert_eq!(consumed(&db, tour.id, test_date(), test_time(9, 0)).await?, 4);

        Ok(())
    }

    #[tokio::test]
    async fn test_amend_cancelled_parent_is_rejected() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let parent = create_booking(&db, booking_request(tour.id, 2)).await?;
        cancel_booking(&db, parent.id).await?;

        let result = create_test_amendment(&db, parent.id, 1).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition { action: "amend", .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_amend_respects_window_capacity() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let parent = create_booking(&db, booking_request(tour.id, 6)).await?;
        let result = create_test_amendment(&db, parent.id, 3).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientCapacity {
                requested: 3,
                remaining: 2
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_amend_product_only_with_promo() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;
        create_test_promo(&db, "SAVE10", None).await?;

        let parent = create_booking(&db, booking_request(tour.id, 1)).await?;
        let amendment = amend_booking(
            &db,
            AmendBookingRequest {
                booking_id: parent.id,
                added_slots: 0,
                products: vec![ProductLine {
                    name: "Lunch".to_string(),
                    unit_price: 20.0,
                    quantity: 1,
                }],
                promo_code: Some("SAVE10".to_string()),
            },
        )
        .await?;

        // 20 minus 10%
        assert_eq!(amendment.total_price, 18.0);
        // Product-only amendments consume no extra capacity
        assert_eq!(consumed(&db, tour.id, test_date(), test_time(9, 0)).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_amendment_is_rejected() -> Result<()> {
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Sqlite).into_connection();

        let result = amend_booking(
            &db,
            AmendBookingRequest {
                booking_id: 1,
                added_slots: 0,
                products: Vec::new(),
                promo_code: None,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidSlots { slots: 0 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_amendment_frees_its_slots() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let parent = create_booking(&db, booking_request(tour.id, 2)).await?;
        let amendment = create_test_amendment(&db, parent.id, 2).await?;
        assert_eq!(consumed(&db, tour.id, test_date(), test_time(9, 0)).await?, 4);

        cancel_amendment(&db, amendment.id).await?;
        assert_eq!(consumed(&db, tour.id, test_date(), test_time(9, 0)).await?, 2);

        let again = cancel_amendment(&db, amendment.id).await;
        assert!(matches!(again.unwrap_err(), Error::InvalidTransition { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let created = create_booking(&db, booking_request(tour.id, 1)).await?;
        let confirmed = confirm_booking(&db, created.id).await?;
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        let completed = mark_completed(&db, created.id).await?;
        assert_eq!(completed.status, BookingStatus::Completed);

        // Terminal bookings accept no further transitions
        let result = confirm_booking(&db, created.id).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidTransition { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_rescheduled_booking_can_be_confirmed_again() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let created = create_booking(&db, booking_request(tour.id, 1)).await?;
        reschedule_booking(&db, created.id, test_date(), test_time(14, 0)).await?;

        let confirmed = confirm_booking(&db, created.id).await?;
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        Ok(())
    }

    #[tokio::test]
    async fn test_no_show_requires_confirmed() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let created = create_booking(&db, booking_request(tour.id, 1)).await?;
        let result = mark_no_show(&db, created.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition {
                status: BookingStatus::Pending,
                ..
            }
        ));

        confirm_booking(&db, created.id).await?;
        let marked = mark_no_show(&db, created.id).await?;
        assert_eq!(marked.status, BookingStatus::NoShow);

        // No-show holds no capacity
        assert_eq!(consumed(&db, tour.id, test_date(), test_time(9, 0)).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_status_updates_do_not_touch_capacity() -> Result<()> {
        let (db, tour) = setup_with_tour().await?;

        let created = create_booking(&db, booking_request(tour.id, 2)).await?;
        let paid = update_payment_status(&db, created.id, PaymentStatus::Paid).await?;
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(consumed(&db, tour.id, test_date(), test_time(9, 0)).await?, 2);

        let amendment = create_test_amendment(&db, created.id, 1).await?;
        let refunding =
            update_amendment_payment_status(&db, amendment.id, PaymentStatus::Refunding).await?;
        assert_eq!(refunding.payment_status, PaymentStatus::Refunding);

        Ok(())
    }
}
