//! Seed catalog loading from config.toml
//!
//! This module provides functionality to load the initial tour catalog (tours,
//! recurring schedule windows, promo codes) from a TOML configuration file. The
//! catalog defined in config.toml is used to seed the database on first run or when
//! entries are missing; existing rows are never overwritten.

use crate::core;
use crate::entities::{promo_code::DiscountType, recurring_schedule::Weekday};
use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    /// List of tours to seed
    #[serde(default)]
    pub tours: Vec<TourConfig>,
    /// List of promo codes to seed
    #[serde(default)]
    pub promo_codes: Vec<PromoCodeConfig>,
}

/// Configuration for a single tour and its recurring windows
#[derive(Debug, Deserialize, Clone)]
pub struct TourConfig {
    /// Name of the tour
    pub name: String,
    /// Default capacity ceiling per window, in slots
    pub group_size_limit: i32,
    /// Price per slot
    pub rate: f64,
    /// Session duration in minutes
    pub duration_minutes: i32,
    /// Recurring weekly windows
    #[serde(default)]
    pub windows: Vec<WindowConfig>,
}

/// Configuration for a group of recurring windows on one weekday
#[derive(Debug, Deserialize, Clone)]
pub struct WindowConfig {
    /// Day of the week the windows recur on
    pub weekday: Weekday,
    /// Start times in `HH:MM` form
    pub start_times: Vec<String>,
    /// Capacity for these windows, if different from the tour default
    pub capacity: Option<i32>,
}

/// Configuration for a single promo code
#[derive(Debug, Deserialize, Clone)]
pub struct PromoCodeConfig {
    /// The code customers type in
    pub code: String,
    /// Percentage or fixed amount
    pub discount_type: DiscountType,
    /// Discount magnitude, interpreted per `discount_type`
    pub discount_value: f64,
    /// RFC 3339 expiry instant, omitted = never expires
    pub expires_at: Option<String>,
    /// Maximum redemptions, omitted or 0 = unlimited
    pub max_uses: Option<i32>,
}

/// Loads the seed catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the seed catalog from the default location (./config.toml)
pub fn load_default_config() -> Result<CatalogConfig> {
    load_config("config.toml")
}

/// Parses a `HH:MM` (or `HH:MM:SS`) start time from the config file.
fn parse_start_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| Error::Config {
            message: format!("Invalid start time '{raw}': {e}"),
        })
}

/// Parses an RFC 3339 expiry instant from the config file.
fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Config {
            message: format!("Invalid expires_at '{raw}': {e}"),
        })
}

/// Seeds the database with any catalog entries that do not already exist.
///
/// Tours are matched by name and promo codes by (normalized) code; rows already in
/// the database are left untouched so redeploys never clobber live data.
pub async fn seed_catalog(db: &DatabaseConnection, config: &CatalogConfig) -> Result<()> {
    for tour_config in &config.tours {
        if core::tour::get_tour_by_name(db, &tour_config.name).await?.is_some() {
            continue;
        }

        let tour = core::tour::create_tour(
            db,
            tour_config.name.clone(),
            tour_config.group_size_limit,
            tour_config.rate,
            tour_config.duration_minutes,
        )
        .await?;

        for window in &tour_config.windows {
            for raw_time in &window.start_times {
                let start_time = parse_start_time(raw_time)?;
                core::tour::add_recurring_window(
                    db,
                    tour.id,
                    window.weekday,
                    start_time,
                    window.capacity,
                )
                .await?;
            }
        }

        info!(tour = %tour.name, id = tour.id, "Seeded tour from catalog config");
    }

    for promo_config in &config.promo_codes {
        let expires_at = promo_config
            .expires_at
            .as_deref()
            .map(parse_expiry)
            .transpose()?;

        let created = core::promo::create_promo_code(
            db,
            &promo_config.code,
            promo_config.discount_type,
            promo_config.discount_value,
            expires_at,
            promo_config.max_uses,
        )
        .await?;

        if let Some(promo) = created {
            info!(code = %promo.code, id = promo.id, "Seeded promo code from catalog config");
        }
    }

    Ok(())
}
