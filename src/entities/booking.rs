//! Booking entity - The unit of reservation against a capacity window.
//!
//! A booking consumes `slots` seats for its `(tour_id, date, start_time)` key while
//! its status is pending, confirmed, or rescheduled; cancelled and no-show bookings
//! contribute nothing. Capacity consumption is always recomputed from these rows at
//! read time rather than kept in a separate counter.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking.
///
/// Transitions: pending/confirmed -> rescheduled -> (confirmed again under the new
/// key); any non-terminal -> cancelled; confirmed -> completed | no_show.
/// Cancelled, completed, and no_show are terminal.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created, awaiting confirmation/payment; holds capacity
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Confirmed; holds capacity
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Moved to a new date/time; holds capacity under the new key
    #[sea_orm(string_value = "rescheduled")]
    Rescheduled,
    /// Cancelled; terminal, holds no capacity
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// The session took place; terminal, recorded post-hoc
    #[sea_orm(string_value = "completed")]
    Completed,
    /// The customer never arrived; terminal, recorded post-hoc
    #[sea_orm(string_value = "no_show")]
    NoShow,
}

impl BookingStatus {
    /// Whether a booking in this status contributes its slots to capacity consumption.
    #[must_use]
    pub const fn holds_capacity(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Rescheduled)
    }

    /// Whether this status permits no further lifecycle transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed | Self::NoShow)
    }
}

/// Payment state of a booking or amendment, fed by the payment-status channel.
///
/// The core records this state only; it never drives capacity accounting.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting payment
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Payment captured
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Payment attempt failed
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Payment cancelled before capture
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Refund in flight
    #[sea_orm(string_value = "refunding")]
    Refunding,
    /// Fully refunded
    #[sea_orm(string_value = "refunded")]
    Refunded,
    /// Partially refunded
    #[sea_orm(string_value = "partial_refund")]
    PartialRefund,
}

/// Booking database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    /// Unique identifier for the booking
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the tour being booked
    pub tour_id: i64,
    /// Calendar date of the booked window
    pub date: Date,
    /// Start time of the booked window
    pub start_time: Time,
    /// Seats consumed by this booking (>= 1)
    pub slots: i32,
    /// Lifecycle status; determines whether the booking holds capacity
    pub status: BookingStatus,
    /// Payment state recorded from the payment channel
    pub payment_status: PaymentStatus,
    /// Promo code applied at creation, if any
    pub promo_code_id: Option<i64>,
    /// Name of the booking customer
    pub customer_name: String,
    /// Contact email of the booking customer
    pub customer_email: Option<String>,
    /// Final price committed at creation (rate and products snapshotted)
    pub total_price: f64,
    /// When the booking was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Booking and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each booking belongs to one tour
    #[sea_orm(
        belongs_to = "super::tour::Entity",
        from = "Column::TourId",
        to = "super::tour::Column::Id"
    )]
    Tour,
    /// Each booking may reference one promo code
    #[sea_orm(
        belongs_to = "super::promo_code::Entity",
        from = "Column::PromoCodeId",
        to = "super::promo_code::Column::Id"
    )]
    PromoCode,
    /// One booking has many additional bookings (amendments)
    #[sea_orm(has_many = "super::additional_booking::Entity")]
    AdditionalBookings,
    /// One booking has many product line snapshots
    #[sea_orm(has_many = "super::booking_product::Entity")]
    Products,
}

impl Related<super::tour::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tour.def()
    }
}

impl Related<super::promo_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PromoCode.def()
    }
}

impl Related<super::additional_booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdditionalBookings.def()
    }
}

impl Related<super::booking_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
