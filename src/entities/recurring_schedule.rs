//! Recurring schedule entity - One bookable time window on a weekly rhythm.
//!
//! Each row declares that a tour runs at `start_time` on every `weekday`, optionally
//! overriding the tour's default capacity for that window. Multiple rows per weekday
//! are allowed (distinct start times); duplicate start times are a configuration
//! error that the schedule catalog de-duplicates with a warning.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Day of the week a recurring window applies to, stored as a symbolic string.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    /// Monday
    #[sea_orm(string_value = "monday")]
    Monday,
    /// Tuesday
    #[sea_orm(string_value = "tuesday")]
    Tuesday,
    /// Wednesday
    #[sea_orm(string_value = "wednesday")]
    Wednesday,
    /// Thursday
    #[sea_orm(string_value = "thursday")]
    Thursday,
    /// Friday
    #[sea_orm(string_value = "friday")]
    Friday,
    /// Saturday
    #[sea_orm(string_value = "saturday")]
    Saturday,
    /// Sunday
    #[sea_orm(string_value = "sunday")]
    Sunday,
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// Recurring schedule database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_schedules")]
pub struct Model {
    /// Unique identifier for the schedule row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the tour this window belongs to
    pub tour_id: i64,
    /// Day of the week the window recurs on
    pub weekday: Weekday,
    /// Start time of the window
    pub start_time: Time,
    /// Capacity for this window, if different from the tour's `group_size_limit`
    pub capacity_override: Option<i32>,
}

/// Defines relationships between RecurringSchedule and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each schedule row belongs to one tour
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
