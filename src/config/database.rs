//! Database configuration module for `TourBook`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary
//! tables based on the entity definitions. The module uses `SeaORM`'s
//! `Schema::create_table_from_entity` method to automatically generate SQL statements
//! from the entity models, ensuring that the database schema matches the Rust struct
//! definitions without requiring manual SQL.

use crate::entities::{
    AdditionalBooking, Booking, BookingProduct, PromoCode, RecurringSchedule, ScheduleException,
    Tour,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/tourbook.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
/// This function handles connection errors and provides a clean interface for database
/// access throughout the application.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from
/// entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper
/// SQL statements for table creation, ensuring the database schema matches the Rust
/// struct definitions. It creates tables for tours, schedules, exceptions, bookings,
/// amendments, product snapshots, and promo codes.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Referenced tables first so foreign keys resolve
    let tour_table = schema.create_table_from_entity(Tour);
    let recurring_schedule_table = schema.create_table_from_entity(RecurringSchedule);
    let schedule_exception_table = schema.create_table_from_entity(ScheduleException);
    let promo_code_table = schema.create_table_from_entity(PromoCode);
    let booking_table = schema.create_table_from_entity(Booking);
    let additional_booking_table = schema.create_table_from_entity(AdditionalBooking);
    let booking_product_table = schema.create_table_from_entity(BookingProduct);

    db.execute(builder.build(&tour_table)).await?;
    db.execute(builder.build(&recurring_schedule_table)).await?;
    db.execute(builder.build(&schedule_exception_table)).await?;
    db.execute(builder.build(&promo_code_table)).await?;
    db.execute(builder.build(&booking_table)).await?;
    db.execute(builder.build(&additional_booking_table)).await?;
    db.execute(builder.build(&booking_product_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        booking::Model as BookingModel, promo_code::Model as PromoCodeModel,
        recurring_schedule::Model as RecurringScheduleModel, tour::Model as TourModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<TourModel> = Tour::find().limit(1).all(&db).await?;
        let _: Vec<RecurringScheduleModel> = RecurringSchedule::find().limit(1).all(&db).await?;
        let _: Vec<BookingModel> = Booking::find().limit(1).all(&db).await?;
        let _: Vec<PromoCodeModel> = PromoCode::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_connection_in_memory() -> Result<()> {
        // Use in-memory database for testing to avoid touching an on-disk file
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<TourModel> = Tour::find().limit(1).all(&db).await?;
        Ok(())
    }
}
