pub mod allocator;
pub mod clock;
pub mod lot;
pub mod services;

// Re-export key types for convenience
pub use allocator::find_nearest_slot;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use lot::{ClassOccupancy, Lot, Occupancy, Receipt};
pub use services::{ParkingService, SharedParkingService};
