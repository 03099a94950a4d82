//! Schedule exception entity - Per-date override of a tour's recurring schedule.
//!
//! When a row exists for `(tour_id, date)` it takes precedence over the recurring
//! weekly rules: a blackout removes every window for the date, while a capacity
//! override changes the capacity of every window offered that date.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Schedule exception database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schedule_exceptions")]
pub struct Model {
    /// Unique identifier for the exception
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the tour the exception applies to
    pub tour_id: i64,
    /// Calendar date the exception covers
    pub date: Date,
    /// If true, the tour offers no windows at all on this date
    pub is_blackout: bool,
    /// Capacity applied to every window on this date, when not a blackout
    pub capacity_override: Option<i32>,
}

/// Defines relationships between ScheduleException and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each exception belongs to one tour
    #[sea_orm(
        belongs_to = "super::tour::Entity",
        from = "Column::TourId",
        to = "super::tour::Column::Id"
    )]
    Tour,
}

impl Related<super::tour::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tour.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
