//! Parking service — shared entry point for park/unpark requests

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::info;

use crate::application::clock::{SharedClock, SystemClock};
use crate::application::lot::{Lot, Occupancy, Receipt};
use crate::domain::{FeeBreakdown, LotResult, ParkingSession, SizeClass, SlotId, Vehicle, VehicleId};

/// Service for parking operations.
///
/// All requests for one lot are serialized behind a single lock, so slot
/// flags and per-vehicle records always change together.
pub struct ParkingService {
    lot: Mutex<Lot>,
    clock: SharedClock,
}

/// Shared, reference-counted parking service
pub type SharedParkingService = Arc<ParkingService>;

impl ParkingService {
    pub fn new(lot: Lot, clock: SharedClock) -> Self {
        Self {
            lot: Mutex::new(lot),
            clock,
        }
    }

    /// Service stamped by the wall clock
    pub fn with_system_clock(lot: Lot) -> Self {
        Self::new(lot, Arc::new(SystemClock))
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared(self) -> SharedParkingService {
        Arc::new(self)
    }

    pub async fn park(&self, vehicle: &Vehicle, entry_point: usize) -> LotResult<ParkingSession> {
        let now = self.clock.now();
        self.park_at(vehicle, entry_point, now).await
    }

    pub async fn park_at(
        &self,
        vehicle: &Vehicle,
        entry_point: usize,
        at: DateTime<Utc>,
    ) -> LotResult<ParkingSession> {
        self.lot.lock().await.park(vehicle, entry_point, at)
    }

    pub async fn unpark(&self, vehicle_id: &VehicleId) -> LotResult<Receipt> {
        let now = self.clock.now();
        self.unpark_at(vehicle_id, now).await
    }

    pub async fn unpark_at(&self, vehicle_id: &VehicleId, at: DateTime<Utc>) -> LotResult<Receipt> {
        self.lot.lock().await.unpark(vehicle_id, at)
    }

    /// Slot the vehicle would get right now, without parking it
    pub async fn preview_slot(&self, class: SizeClass, entry_point: usize) -> LotResult<Option<SlotId>> {
        let lot = self.lot.lock().await;
        Ok(lot.find_nearest_slot(class, entry_point)?.map(|slot| slot.id))
    }

    pub async fn session(&self, vehicle_id: &VehicleId) -> Option<ParkingSession> {
        self.lot.lock().await.session(vehicle_id).cloned()
    }

    pub async fn occupancy(&self) -> Occupancy {
        self.lot.lock().await.occupancy()
    }

    /// Fee the lot would charge for `hours` in a slot of `class`
    pub async fn quote(&self, class: SizeClass, hours: u32) -> FeeBreakdown {
        let breakdown = self
            .lot
            .lock()
            .await
            .fee_schedule()
            .calculate_breakdown(class, hours);
        info!(%class, hours, total = breakdown.total, "Fee quoted");
        breakdown
    }

    /// Run `f` against the lot while holding the lock
    pub async fn with_lot<R>(&self, f: impl FnOnce(&Lot) -> R) -> R {
        let lot = self.lot.lock().await;
        f(&lot)
    }
}
