//! Slot domain entity

use serde::{Deserialize, Serialize};

/// Size category shared by slots and vehicles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub const ALL: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

    /// Whether a vehicle of this class may use a slot of `slot` class.
    ///
    /// Small vehicles fit anywhere, medium vehicles need a medium or large
    /// slot, large vehicles need a large slot.
    pub fn fits_in(self, slot: SizeClass) -> bool {
        match self {
            Self::Small => true,
            Self::Medium => matches!(slot, Self::Medium | Self::Large),
            Self::Large => matches!(slot, Self::Large),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "small" | "s" | "sp" => Some(Self::Small),
            "medium" | "m" | "mp" => Some(Self::Medium),
            "large" | "l" | "lp" => Some(Self::Large),
            _ => None,
        }
    }
}

impl std::fmt::Display for SizeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small => write!(f, "Small"),
            Self::Medium => write!(f, "Medium"),
            Self::Large => write!(f, "Large"),
        }
    }
}

/// Position of a slot in the lot's construction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub usize);

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single parking slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub id: SlotId,
    pub class: SizeClass,
    /// Distance from each entry point, indexed by entry point
    distances: Vec<u32>,
    occupied: bool,
}

impl Slot {
    pub fn new(id: SlotId, class: SizeClass, distances: Vec<u32>) -> Self {
        Self {
            id,
            class,
            distances,
            occupied: false,
        }
    }

    pub fn distance_from(&self, entry_point: usize) -> Option<u32> {
        self.distances.get(entry_point).copied()
    }

    pub fn distances(&self) -> &[u32] {
        &self.distances
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn is_free(&self) -> bool {
        !self.occupied
    }

    /// Free and able to take a vehicle of `vehicle` class
    pub fn accepts(&self, vehicle: SizeClass) -> bool {
        self.is_free() && vehicle.fits_in(self.class)
    }

    pub(crate) fn set_occupied(&mut self, occupied: bool) {
        self.occupied = occupied;
    }
}

// ── Tests ──────────────────────────────────────────────────────
