//! Tour entity - Represents a bookable tour or rental offering.
//!
//! Each tour carries a per-window capacity ceiling (`group_size_limit`), a per-slot
//! `rate`, and a duration. From the booking core's perspective tours are read-only:
//! rate changes never retroactively alter confirmed bookings because prices are
//! snapshotted into bookings at commit time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tour database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tours")]
pub struct Model {
    /// Unique identifier for the tour
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name of the tour (e.g., "Harbour Kayak", "City Walk")
    pub name: String,
    /// Default capacity ceiling per time window, in slots
    pub group_size_limit: i32,
    /// Price per slot in dollars
    pub rate: f64,
    /// Duration of one session in minutes
    pub duration_minutes: i32,
    /// Soft delete flag - if true, tour is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between Tour and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One tour has many recurring weekly schedule windows
    #[sea_orm(has_many = "super::recurring_schedule::Entity")]
    RecurringSchedules,
    /// One tour has many per-date schedule exceptions
    #[sea_orm(has_many = "super::schedule_exception::Entity")]
    ScheduleExceptions,
    /// One tour has many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::recurring_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringSchedules.def()
    }
}

impl Related<super::schedule_exception::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleExceptions.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
