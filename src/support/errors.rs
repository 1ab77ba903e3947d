use thiserror::Error;

use crate::domain::{SizeClass, VehicleId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotError {
    #[error("No available slot for {class} vehicle at entry point {entry_point}")]
    NoAvailableSlot { class: SizeClass, entry_point: usize },

    #[error("Vehicle {0} is already parked")]
    AlreadyParked(VehicleId),

    #[error("Vehicle {0} is not parked")]
    NotParked(VehicleId),

    #[error("Entry point {entry_point} out of range (lot has {entry_points})")]
    EntryPointOutOfRange {
        entry_point: usize,
        entry_points: usize,
    },

    #[error("Exit of vehicle {vehicle_id} precedes its entry")]
    InvalidStay { vehicle_id: VehicleId },

    #[error("Invalid lot configuration: {0}")]
    Construction(String),
}

impl LotError {
    /// Whether the lot rejected the request for lack of capacity rather than
    /// because the caller broke a precondition.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, LotError::NoAvailableSlot { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Layout(#[from] LotError),
}

/// Result type for lot operations
pub type LotResult<T> = Result<T, LotError>;
