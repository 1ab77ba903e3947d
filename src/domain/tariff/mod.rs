//! Tariff aggregate
//!
//! Contains the fee schedule, fee breakdown, and billable-duration rounding.

pub mod model;

pub use model::{billable_hours, FeeBreakdown, FeeSchedule};
