//! Application services

mod parking;

pub use parking::{ParkingService, SharedParkingService};
