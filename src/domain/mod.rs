pub mod slot;
pub mod tariff;
pub mod vehicle;

// Re-export commonly used types
pub use slot::{SizeClass, Slot, SlotId, SlotRegistry};
pub use tariff::{billable_hours, FeeBreakdown, FeeSchedule};
pub use vehicle::{ParkingSession, StayRecord, Vehicle, VehicleId};

// Re-export errors from support for convenience
pub use crate::support::errors::{LotError, LotResult};
