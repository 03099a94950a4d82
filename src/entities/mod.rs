//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod additional_booking;
pub mod booking;
pub mod booking_product;
pub mod promo_code;
pub mod recurring_schedule;
pub mod schedule_exception;
pub mod tour;

// Re-export specific types to avoid conflicts
pub use additional_booking::{
    Column as AdditionalBookingColumn, Entity as AdditionalBooking,
    Model as AdditionalBookingModel,
};
pub use booking::{Column as BookingColumn, Entity as Booking, Model as BookingModel};
pub use booking_product::{
    Column as BookingProductColumn, Entity as BookingProduct, Model as BookingProductModel,
};
pub use promo_code::{Column as PromoCodeColumn, Entity as PromoCode, Model as PromoCodeModel};
pub use recurring_schedule::{
    Column as RecurringScheduleColumn, Entity as RecurringSchedule,
    Model as RecurringScheduleModel,
};
pub use schedule_exception::{
    Column as ScheduleExceptionColumn, Entity as ScheduleException,
    Model as ScheduleExceptionModel,
};
pub use tour::{Column as TourColumn, Entity as Tour, Model as TourModel};
