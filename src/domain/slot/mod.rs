//! Slot aggregate
//!
//! Contains the Slot entity, size classes, and the registry that owns
//! occupancy for a whole lot.

pub mod model;
pub mod registry;

pub use model::{SizeClass, Slot, SlotId};
pub use registry::SlotRegistry;
