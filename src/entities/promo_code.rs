//! Promo code entity - A discount voucher with a shared, contended usage counter.
//!
//! Codes are stored upper-cased so lookups are case-insensitive. `times_used` is only
//! ever advanced through the promo ledger's guarded atomic increment, which is what
//! keeps it from exceeding a set `max_uses` under concurrent bookings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a promo code's `discount_value` is interpreted.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the eligible subtotal
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// `discount_value` is a dollar amount, capped at the eligible subtotal
    #[sea_orm(string_value = "fixed_amount")]
    FixedAmount,
}

/// Promo code database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promo_codes")]
pub struct Model {
    /// Unique identifier for the promo code
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The code itself, unique and stored upper-cased
    #[sea_orm(unique)]
    pub code: String,
    /// Whether the discount is a percentage or a fixed amount
    pub discount_type: DiscountType,
    /// Discount magnitude, interpreted per `discount_type`
    pub discount_value: f64,
    /// Instant after which the code is no longer valid, None = never expires
    pub expires_at: Option<DateTimeUtc>,
    /// Maximum redemptions; None or <= 0 means unlimited
    pub max_uses: Option<i32>,
    /// Redemptions so far; monotonic, advanced exactly once per booking/amendment
    pub times_used: i32,
    /// Whether the code is currently enabled
    pub is_active: bool,
}

/// Defines relationships between PromoCode and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One promo code may be referenced by many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the usage limit is exhausted. None or non-positive `max_uses` never
    /// limits redemption.
    #[must_use]
    pub fn usage_exhausted(&self) -> bool {
        match self.max_uses {
            Some(max) if max > 0 => self.times_used >= max,
            _ => false,
        }
    }
}
