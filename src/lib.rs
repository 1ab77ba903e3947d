//! # Parking Lot Service
//!
//! Assigns arriving vehicles to the nearest eligible slot, tracks occupancy,
//! and prices each stay on exit.
//!
//! ## Architecture
//!
//! - **domain**: Slots, vehicles, size classes and the fee schedule
//! - **application**: Allocation, the lot controller, clocks and the shared service
//! - **config**: TOML configuration for layout, tariff and logging
//! - **logging**: Tracing subscriber setup
//! - **support**: Error types

pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod support;

pub use application::{Lot, ParkingService, Receipt};
pub use config::{default_config_path, AppConfig};
pub use domain::{FeeSchedule, LotError, LotResult, SizeClass, Vehicle, VehicleId};
pub use logging::init_tracing;
pub use support::errors::ConfigError;
