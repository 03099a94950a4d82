//! Additional booking entity - An amendment to an existing booking.
//!
//! An amendment adds slots and/or products to a confirmed booking without opening a
//! fresh capacity key: its `added_slots` count against the parent's
//! `(tour_id, date, start_time)` window and move together with the parent on
//! reschedule. Each amendment is priced and paid independently of the parent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::booking::PaymentStatus;

/// Additional booking database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "additional_bookings")]
pub struct Model {
    /// Unique identifier for the amendment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the parent booking this amendment extends
    pub booking_id: i64,
    /// Extra seats added to the parent's capacity key (0 for product-only amendments)
    pub added_slots: i32,
    /// Promo code applied to this amendment, if any
    pub promo_code_id: Option<i64>,
    /// Payment state of this amendment's own payment sub-record
    pub payment_status: PaymentStatus,
    /// If true, the amendment is voided and its slots are freed
    pub is_cancelled: bool,
    /// Price committed for this amendment alone
    pub total_price: f64,
    /// When the amendment was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between AdditionalBooking and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each amendment belongs to one parent booking
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
    /// One amendment has many product line snapshots
    #[sea_orm(has_many = "super::booking_product::Entity")]
    Products,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::booking_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
