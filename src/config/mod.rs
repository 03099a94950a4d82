/// Database configuration and connection management
pub mod database;

/// Seed catalog loading from config.toml (tours, schedules, promo codes)
pub mod catalog;
