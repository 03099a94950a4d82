//! Core business logic for the booking engine.
//!
//! Every module here is framework-agnostic: functions take a database connection (or
//! an open transaction via `ConnectionTrait`) and return typed results. The API/UI
//! layer is a consumer of these functions and owns all presentation concerns.

/// Booking reconciliation - create, reschedule, cancel, amend; the lifecycle state machine
pub mod booking;
/// Capacity ledger - read-time aggregation of per-window slot consumption
pub mod capacity;
/// Pricing calculator - pure composition of rate, product lines, and discount
pub mod pricing;
/// Promo ledger - validation and exactly-once usage reservation
pub mod promo;
/// Schedule catalog - resolves bookable windows from recurring rules and exceptions
pub mod schedule;
/// Calendar aggregation for month-view rendering
pub mod summary;
/// Tour catalog reads and seeding helpers
pub mod tour;
