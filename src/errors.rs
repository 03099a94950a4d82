//! Unified error types for the booking core.
//!
//! Every operation returns a typed outcome from this enum - capacity shortfalls and
//! promo rejections are expected results of normal contention, not system failures,
//! and the caller (UI/API layer) translates them into user messages.

use crate::entities::booking::BookingStatus;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Unified error type for all booking-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or validation problem
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Slot count must be at least 1
    #[error("Invalid slot count: {slots}")]
    InvalidSlots {
        /// The rejected slot count
        slots: i32,
    },

    /// Monetary amount is negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Calendar arguments are out of range (e.g. month outside 1-12)
    #[error("Invalid date arguments: {message}")]
    InvalidDate {
        /// Description of the rejected arguments
        message: String,
    },

    /// No active tour with the given id
    #[error("Tour {tour_id} not found")]
    TourNotFound {
        /// The missing tour id
        tour_id: i64,
    },

    /// No booking with the given id
    #[error("Booking {booking_id} not found")]
    BookingNotFound {
        /// The missing booking id
        booking_id: i64,
    },

    /// No additional booking with the given id
    #[error("Additional booking {additional_booking_id} not found")]
    AmendmentNotFound {
        /// The missing additional-booking id
        additional_booking_id: i64,
    },

    /// The requested date/time is not an offered window for the tour
    #[error("Tour {tour_id} has no bookable window at {date} {start_time}")]
    SlotNotFound {
        /// Tour whose schedule was consulted
        tour_id: i64,
        /// Requested calendar date
        date: NaiveDate,
        /// Requested window start time
        start_time: NaiveTime,
    },

    /// The window cannot hold the requested slots
    #[error("Insufficient capacity: requested {requested} slots, {remaining} remaining")]
    InsufficientCapacity {
        /// Slots the caller asked for
        requested: i32,
        /// Slots actually left in the window
        remaining: i32,
    },

    /// The booking's current status does not permit the operation
    #[error("Cannot {action} booking {booking_id} in status {status:?}")]
    InvalidTransition {
        /// Booking the operation targeted
        booking_id: i64,
        /// Status the booking was found in
        status: BookingStatus,
        /// Operation that was attempted
        action: &'static str,
    },

    /// Promo code does not exist
    #[error("Promo code '{code}' not found")]
    PromoNotFound {
        /// The code as supplied (normalized)
        code: String,
    },

    /// Promo code has been deactivated
    #[error("Promo code '{code}' is inactive")]
    PromoInactive {
        /// The rejected code
        code: String,
    },

    /// Promo code expired before `now`
    #[error("Promo code '{code}' has expired")]
    PromoExpired {
        /// The rejected code
        code: String,
    },

    /// Promo code usage limit exhausted
    #[error("Promo code '{code}' has reached its usage limit")]
    PromoUsageExceeded {
        /// The rejected code
        code: String,
    },

    /// Transient store contention that outlasted the internal retry bound
    #[error("The booking store is busy; retry the operation")]
    Busy,

    /// A state the atomicity guarantees should make impossible
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// Description of the broken invariant
        message: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
