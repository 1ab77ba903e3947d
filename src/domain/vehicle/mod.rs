//! Vehicle aggregate
//!
//! Contains the Vehicle entity, its stable identifier, and the session and
//! stay records the lot keeps per vehicle.

pub mod model;

pub use model::{ParkingSession, StayRecord, Vehicle, VehicleId};
