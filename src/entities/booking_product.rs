//! Booking product entity - A product line item snapshotted into a booking.
//!
//! Products are copied by value (name, unit price, quantity) at the moment a booking
//! or amendment is committed, so later catalog price changes never alter historical
//! bookings. Exactly one of `booking_id` / `additional_booking_id` is set.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Booking product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking_products")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent booking, when the line belongs to an original booking
    pub booking_id: Option<i64>,
    /// Parent amendment, when the line belongs to an additional booking
    pub additional_booking_id: Option<i64>,
    /// Product name at the time of booking
    pub name: String,
    /// Unit price at the time of booking, in dollars
    pub unit_price: f64,
    /// Number of units purchased
    pub quantity: i32,
}

/// Defines relationships between BookingProduct and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Line items may belong to a booking
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
    /// Line items may belong to an additional booking
    #[sea_orm(
        belongs_to = "super::additional_booking::Entity",
        from = "Column::AdditionalBookingId",
        to = "super::additional_booking::Column::Id"
    )]
    AdditionalBooking,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::additional_booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdditionalBooking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
