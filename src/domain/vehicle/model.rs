//! Vehicle domain entity and per-vehicle parking records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::slot::{SizeClass, SlotId};

/// Stable vehicle identifier (plate number or similar)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A vehicle arriving at the lot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub class: SizeClass,
}

impl Vehicle {
    pub fn new(id: impl Into<VehicleId>, class: SizeClass) -> Self {
        Self {
            id: id.into(),
            class,
        }
    }
}

/// An active stay: the vehicle is bound to `slot_id` since `entered_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkingSession {
    pub vehicle_id: VehicleId,
    pub vehicle_class: SizeClass,
    pub slot_id: SlotId,
    pub slot_class: SizeClass,
    pub entry_point: usize,
    pub entered_at: DateTime<Utc>,
}

impl ParkingSession {
    /// Close the session, producing the record of the finished stay
    pub fn close(&self, exited_at: DateTime<Utc>) -> StayRecord {
        StayRecord {
            entered_at: self.entered_at,
            exited_at,
        }
    }
}

/// A finished stay, remembered after the vehicle leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StayRecord {
    pub entered_at: DateTime<Utc>,
    pub exited_at: DateTime<Utc>,
}

impl StayRecord {
    /// Whether a new entry at `entered_at` falls within `grace` of this exit
    pub fn is_continued_by(&self, entered_at: DateTime<Utc>, grace: chrono::Duration) -> bool {
        entered_at - self.exited_at <= grace
    }
}

// ── Tests ──────────────────────────────────────────────────────
