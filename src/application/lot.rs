//! Lot controller — park/unpark lifecycle over a slot registry

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::allocator;
use crate::domain::{
    billable_hours, FeeSchedule, LotError, LotResult, ParkingSession, SizeClass, Slot, SlotId,
    SlotRegistry, StayRecord, Vehicle, VehicleId,
};

/// Outcome of a finished stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub vehicle_id: VehicleId,
    pub slot_id: SlotId,
    pub slot_class: SizeClass,
    pub entered_at: DateTime<Utc>,
    pub exited_at: DateTime<Utc>,
    /// Billable hours of this stay alone
    pub stay_hours: u32,
    /// Hours the fee was computed over (includes the previous stay when continuous)
    pub charged_hours: u32,
    pub fee: u64,
    /// The stay continued the vehicle's previous one
    pub continuous: bool,
}

/// Slot counts for one size class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassOccupancy {
    pub total: usize,
    pub occupied: usize,
}

impl ClassOccupancy {
    pub fn free(&self) -> usize {
        self.total - self.occupied
    }
}

/// Point-in-time view of slot usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub small: ClassOccupancy,
    pub medium: ClassOccupancy,
    pub large: ClassOccupancy,
    pub active_vehicles: usize,
}

impl Occupancy {
    pub fn for_class(&self, class: SizeClass) -> ClassOccupancy {
        match class {
            SizeClass::Small => self.small,
            SizeClass::Medium => self.medium,
            SizeClass::Large => self.large,
        }
    }

    pub fn total(&self) -> usize {
        self.small.total + self.medium.total + self.large.total
    }

    pub fn occupied(&self) -> usize {
        self.small.occupied + self.medium.occupied + self.large.occupied
    }
}

/// A parking lot: fixed slots, active sessions, and last-stay memory.
///
/// Time is never read here; callers pass the instant of every park and
/// unpark.
#[derive(Debug, Clone)]
pub struct Lot {
    registry: SlotRegistry,
    schedule: FeeSchedule,
    sessions: HashMap<VehicleId, ParkingSession>,
    last_stays: HashMap<VehicleId, StayRecord>,
}

impl Lot {
    /// Build a lot from a distance matrix (one row per slot, one column per
    /// entry point) and the class of each slot.
    pub fn new(
        entry_points: usize,
        distances: Vec<Vec<u32>>,
        classes: Vec<SizeClass>,
        schedule: FeeSchedule,
    ) -> LotResult<Self> {
        let registry = SlotRegistry::new(entry_points, distances, classes)?;
        Self::from_registry(registry, schedule)
    }

    pub fn from_registry(registry: SlotRegistry, schedule: FeeSchedule) -> LotResult<Self> {
        schedule.validate()?;
        info!(
            slots = registry.len(),
            entry_points = registry.entry_points(),
            "Parking lot initialized"
        );
        Ok(Self {
            registry,
            schedule,
            sessions: HashMap::new(),
            last_stays: HashMap::new(),
        })
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn entry_points(&self) -> usize {
        self.registry.entry_points()
    }

    pub fn slots(&self) -> &[Slot] {
        self.registry.slots()
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.registry.get(id)
    }

    pub fn fee_schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    pub fn is_parked(&self, vehicle_id: &VehicleId) -> bool {
        self.sessions.contains_key(vehicle_id)
    }

    pub fn session(&self, vehicle_id: &VehicleId) -> Option<&ParkingSession> {
        self.sessions.get(vehicle_id)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn free_count(&self) -> usize {
        self.registry.free_count()
    }

    pub fn last_exit(&self, vehicle_id: &VehicleId) -> Option<DateTime<Utc>> {
        self.last_stays.get(vehicle_id).map(|stay| stay.exited_at)
    }

    pub fn occupancy(&self) -> Occupancy {
        let mut occupancy = Occupancy {
            small: ClassOccupancy::default(),
            medium: ClassOccupancy::default(),
            large: ClassOccupancy::default(),
            active_vehicles: self.sessions.len(),
        };
        for slot in self.registry.slots() {
            let counts = match slot.class {
                SizeClass::Small => &mut occupancy.small,
                SizeClass::Medium => &mut occupancy.medium,
                SizeClass::Large => &mut occupancy.large,
            };
            counts.total += 1;
            if slot.is_occupied() {
                counts.occupied += 1;
            }
        }
        occupancy
    }

    /// Nearest free slot for `class` from `entry_point`, without reserving it
    pub fn find_nearest_slot(
        &self,
        class: SizeClass,
        entry_point: usize,
    ) -> LotResult<Option<&Slot>> {
        self.check_entry_point(entry_point)?;
        Ok(allocator::find_nearest_slot(&self.registry, class, entry_point))
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Park `vehicle` in the nearest eligible slot from `entry_point`.
    ///
    /// Nothing changes when this fails.
    pub fn park(
        &mut self,
        vehicle: &Vehicle,
        entry_point: usize,
        at: DateTime<Utc>,
    ) -> LotResult<ParkingSession> {
        if self.sessions.contains_key(&vehicle.id) {
            return Err(LotError::AlreadyParked(vehicle.id.clone()));
        }

        let (slot_id, slot_class) = match self.find_nearest_slot(vehicle.class, entry_point)? {
            Some(slot) => (slot.id, slot.class),
            None => {
                warn!(
                    vehicle_id = %vehicle.id,
                    class = %vehicle.class,
                    entry_point,
                    "No available slot"
                );
                return Err(LotError::NoAvailableSlot {
                    class: vehicle.class,
                    entry_point,
                });
            }
        };

        self.registry.occupy(slot_id);

        let session = ParkingSession {
            vehicle_id: vehicle.id.clone(),
            vehicle_class: vehicle.class,
            slot_id,
            slot_class,
            entry_point,
            entered_at: at,
        };
        self.sessions.insert(vehicle.id.clone(), session.clone());

        info!(
            vehicle_id = %vehicle.id,
            slot_id = slot_id.0,
            %slot_class,
            entry_point,
            entered_at = %at,
            "Vehicle parked"
        );

        Ok(session)
    }

    /// Release the vehicle's slot and compute the fee for the stay.
    ///
    /// When the vehicle re-entered within the grace period of its last
    /// recorded exit, the fee covers both stays and the recorded exit is
    /// left untouched. Otherwise this exit becomes the recorded one.
    pub fn unpark(&mut self, vehicle_id: &VehicleId, at: DateTime<Utc>) -> LotResult<Receipt> {
        let (session, stay_hours) = match self.sessions.entry(vehicle_id.clone()) {
            Entry::Occupied(entry) => {
                let stay_hours = billable_hours(entry.get().entered_at, at).ok_or_else(|| {
                    LotError::InvalidStay {
                        vehicle_id: vehicle_id.clone(),
                    }
                })?;
                (entry.remove(), stay_hours)
            }
            Entry::Vacant(_) => return Err(LotError::NotParked(vehicle_id.clone())),
        };
        self.registry.release(session.slot_id);

        let previous = self
            .last_stays
            .get(vehicle_id)
            .filter(|stay| stay.is_continued_by(session.entered_at, self.schedule.continuous_grace()))
            .copied();

        let (charged_hours, continuous) = match previous {
            Some(stay) => {
                let previous_hours = billable_hours(stay.entered_at, stay.exited_at).unwrap_or(0);
                (stay_hours.saturating_add(previous_hours), true)
            }
            None => {
                self.last_stays
                    .insert(vehicle_id.clone(), session.close(at));
                (stay_hours, false)
            }
        };

        let fee = self.schedule.calculate_fee(session.slot_class, charged_hours);

        info!(
            vehicle_id = %vehicle_id,
            slot_id = session.slot_id.0,
            stay_hours,
            charged_hours,
            continuous,
            fee,
            currency = self.schedule.currency.as_str(),
            "Vehicle unparked"
        );

        Ok(Receipt {
            vehicle_id: vehicle_id.clone(),
            slot_id: session.slot_id,
            slot_class: session.slot_class,
            entered_at: session.entered_at,
            exited_at: at,
            stay_hours,
            charged_hours,
            fee,
            continuous,
        })
    }

    fn check_entry_point(&self, entry_point: usize) -> LotResult<()> {
        let entry_points = self.registry.entry_points();
        if entry_point >= entry_points {
            return Err(LotError::EntryPointOutOfRange {
                entry_point,
                entry_points,
            });
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    /// Three entry points, slots: 0 Small, 1 Large, 2 Medium
    fn demo_lot() -> Lot {
        Lot::new(
            3,
            vec![vec![1, 4, 5], vec![3, 2, 3], vec![2, 1, 4]],
            vec![SizeClass::Small, SizeClass::Large, SizeClass::Medium],
            FeeSchedule::default(),
        )
        .unwrap()
    }

    fn small_car() -> Vehicle {
        Vehicle::new("S-001", SizeClass::Small)
    }

    #[test]
    fn park_then_unpark_one_hour_costs_flat_fee() {
        let mut lot = demo_lot();
        let car = small_car();

        let session = lot.park(&car, 0, t0()).unwrap();
        assert_eq!(session.slot_id, SlotId(0));
        assert!(lot.slot(SlotId(0)).unwrap().is_occupied());
        assert!(lot.is_parked(&car.id));

        let receipt = lot.unpark(&car.id, t0() + Duration::hours(1)).unwrap();
        assert_eq!(receipt.fee, 40);
        assert_eq!(receipt.stay_hours, 1);
        assert!(!receipt.continuous);
        assert!(lot.slot(SlotId(0)).unwrap().is_free());
        assert!(!lot.is_parked(&car.id));
        assert_eq!(lot.active_count(), 0);
        assert_eq!(lot.last_exit(&car.id), Some(t0() + Duration::hours(1)));
    }

    #[test]
    fn park_binds_nearest_eligible_slot() {
        let mut lot = demo_lot();
        let van = Vehicle::new("M-001", SizeClass::Medium);
        let session = lot.park(&van, 0, t0()).unwrap();
        assert_eq!(session.slot_id, SlotId(2));
        assert_eq!(session.slot_class, SizeClass::Medium);
        assert_eq!(lot.session(&van.id).unwrap().entered_at, t0());
    }

    #[test]
    fn no_available_slot_leaves_lot_unchanged() {
        let mut lot = demo_lot();
        lot.park(&Vehicle::new("L-001", SizeClass::Large), 1, t0()).unwrap();
        let before = lot.occupancy();

        let truck = Vehicle::new("L-002", SizeClass::Large);
        let err = lot.park(&truck, 1, t0()).unwrap_err();
        assert_eq!(
            err,
            LotError::NoAvailableSlot {
                class: SizeClass::Large,
                entry_point: 1
            }
        );
        assert!(err.is_allocation_failure());
        assert_eq!(lot.occupancy(), before);
        assert!(!lot.is_parked(&truck.id));
    }

    #[test]
    fn parking_twice_is_rejected() {
        let mut lot = demo_lot();
        let car = small_car();
        lot.park(&car, 0, t0()).unwrap();
        let err = lot.park(&car, 1, t0()).unwrap_err();
        assert_eq!(err, LotError::AlreadyParked(car.id.clone()));
        assert_eq!(lot.free_count(), 2);
    }

    #[test]
    fn unpark_without_park_is_rejected() {
        let mut lot = demo_lot();
        let err = lot.unpark(&VehicleId::new("ghost"), t0()).unwrap_err();
        assert_eq!(err, LotError::NotParked(VehicleId::new("ghost")));
    }

    #[test]
    fn unpark_twice_does_not_double_free() {
        let mut lot = demo_lot();
        let car = small_car();
        lot.park(&car, 0, t0()).unwrap();
        lot.unpark(&car.id, t0() + Duration::hours(2)).unwrap();

        let other = Vehicle::new("S-002", SizeClass::Small);
        lot.park(&other, 0, t0() + Duration::hours(3)).unwrap();

        assert!(lot.unpark(&car.id, t0() + Duration::hours(4)).is_err());
        assert!(lot.slot(SlotId(0)).unwrap().is_occupied());
    }

    #[test]
    fn exit_before_entry_is_rejected_without_side_effects() {
        let mut lot = demo_lot();
        let car = small_car();
        lot.park(&car, 0, t0()).unwrap();
        let err = lot.unpark(&car.id, t0() - Duration::minutes(5)).unwrap_err();
        assert!(matches!(err, LotError::InvalidStay { .. }));
        assert!(lot.is_parked(&car.id));
        assert!(lot.slot(SlotId(0)).unwrap().is_occupied());
    }

    #[test]
    fn entry_point_out_of_range_is_rejected() {
        let mut lot = demo_lot();
        let err = lot.park(&small_car(), 3, t0()).unwrap_err();
        assert_eq!(
            err,
            LotError::EntryPointOutOfRange {
                entry_point: 3,
                entry_points: 3
            }
        );
        assert_eq!(lot.free_count(), 3);
    }

    #[test]
    fn mismatched_dimensions_fail_construction() {
        let err = Lot::new(
            2,
            vec![vec![1, 2], vec![3, 4]],
            vec![SizeClass::Small],
            FeeSchedule::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LotError::Construction(_)));
    }

    #[test]
    fn fee_uses_slot_class_not_vehicle_class() {
        let mut lot = demo_lot();
        let car = small_car();
        // Entry 2 puts a small car in the large slot
        let session = lot.park(&car, 2, t0()).unwrap();
        assert_eq!(session.slot_class, SizeClass::Large);
        let receipt = lot.unpark(&car.id, t0() + Duration::hours(4)).unwrap();
        assert_eq!(receipt.fee, 140);
    }

    #[test]
    fn reentry_within_grace_charges_combined_duration() {
        let mut lot = demo_lot();
        let car = small_car();

        // First stay: 2 hours
        lot.park(&car, 0, t0()).unwrap();
        let first = lot.unpark(&car.id, t0() + Duration::hours(2)).unwrap();
        assert_eq!(first.fee, 40);

        // Back 30 minutes later, out 90 minutes after that
        let second_entry = t0() + Duration::minutes(150);
        lot.park(&car, 0, second_entry).unwrap();
        let second = lot.unpark(&car.id, second_entry + Duration::minutes(90)).unwrap();

        assert!(second.continuous);
        assert_eq!(second.stay_hours, 2);
        assert_eq!(second.charged_hours, 4);
        // 40 + 1 * 20, not the 40 the second stay alone would cost
        assert_eq!(second.fee, 60);
        assert!(lot.slot(SlotId(0)).unwrap().is_free());
    }

    #[test]
    fn continuous_stay_keeps_previous_exit_record() {
        let mut lot = demo_lot();
        let car = small_car();
        let first_exit = t0() + Duration::hours(1);

        lot.park(&car, 0, t0()).unwrap();
        lot.unpark(&car.id, first_exit).unwrap();

        lot.park(&car, 0, first_exit + Duration::minutes(20)).unwrap();
        lot.unpark(&car.id, first_exit + Duration::hours(2)).unwrap();

        assert_eq!(lot.last_exit(&car.id), Some(first_exit));
        assert!(!lot.is_parked(&car.id));
    }

    #[test]
    fn third_stay_is_measured_against_first_exit() {
        let mut lot = demo_lot();
        let car = small_car();
        let first_exit = t0() + Duration::hours(2);

        lot.park(&car, 0, t0()).unwrap();
        lot.unpark(&car.id, first_exit).unwrap();

        // Second stay continues the first
        let second_entry = first_exit + Duration::minutes(30);
        let second_exit = second_entry + Duration::hours(2);
        lot.park(&car, 0, second_entry).unwrap();
        assert!(lot.unpark(&car.id, second_exit).unwrap().continuous);

        // Ten minutes after the second exit, but 2h40 after the recorded one
        let third_entry = second_exit + Duration::minutes(10);
        lot.park(&car, 0, third_entry).unwrap();
        let third = lot.unpark(&car.id, third_entry + Duration::hours(4)).unwrap();

        assert!(!third.continuous);
        assert_eq!(third.charged_hours, 4);
        assert_eq!(third.fee, 60);
        assert_eq!(lot.last_exit(&car.id), Some(third_entry + Duration::hours(4)));
    }

    #[test]
    fn invalid_schedule_fails_construction() {
        let schedule = FeeSchedule {
            continuous_grace_minutes: i64::MAX,
            ..FeeSchedule::default()
        };
        let err = Lot::new(1, vec![vec![1]], vec![SizeClass::Small], schedule).unwrap_err();
        assert!(matches!(err, LotError::Construction(_)));
    }

    #[test]
    fn reentry_after_grace_is_billed_alone() {
        let mut lot = demo_lot();
        let car = small_car();

        lot.park(&car, 0, t0()).unwrap();
        lot.unpark(&car.id, t0() + Duration::hours(3)).unwrap();

        let second_entry = t0() + Duration::hours(5);
        lot.park(&car, 0, second_entry).unwrap();
        let receipt = lot.unpark(&car.id, second_entry + Duration::hours(4)).unwrap();

        assert!(!receipt.continuous);
        assert_eq!(receipt.charged_hours, 4);
        assert_eq!(receipt.fee, 60);
        assert_eq!(lot.last_exit(&car.id), Some(second_entry + Duration::hours(4)));
    }

    #[test]
    fn grace_period_follows_schedule() {
        let schedule = FeeSchedule {
            continuous_grace_minutes: 10,
            ..FeeSchedule::default()
        };
        let mut lot = Lot::new(1, vec![vec![1]], vec![SizeClass::Small], schedule).unwrap();
        let car = small_car();

        lot.park(&car, 0, t0()).unwrap();
        lot.unpark(&car.id, t0() + Duration::hours(3)).unwrap();

        let second_entry = t0() + Duration::minutes(200);
        lot.park(&car, 0, second_entry).unwrap();
        let receipt = lot.unpark(&car.id, second_entry + Duration::hours(1)).unwrap();
        assert!(!receipt.continuous);
    }

    #[test]
    fn occupancy_counts_per_class() {
        let mut lot = demo_lot();
        lot.park(&Vehicle::new("M-1", SizeClass::Medium), 1, t0()).unwrap();
        let occupancy = lot.occupancy();
        assert_eq!(occupancy.total(), 3);
        assert_eq!(occupancy.occupied(), 1);
        assert_eq!(occupancy.for_class(SizeClass::Medium).occupied, 1);
        assert_eq!(occupancy.for_class(SizeClass::Large).free(), 1);
        assert_eq!(occupancy.active_vehicles, 1);
    }

    #[test]
    fn receipt_serializes_for_harness_output() {
        let mut lot = demo_lot();
        let car = small_car();
        lot.park(&car, 0, t0()).unwrap();
        let receipt = lot.unpark(&car.id, t0() + Duration::minutes(30)).unwrap();

        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["vehicle_id"], "S-001");
        assert_eq!(json["slot_id"], 0);
        assert_eq!(json["slot_class"], "small");
        assert_eq!(json["fee"], 40);
        assert_eq!(json["continuous"], false);
    }

    #[test]
    fn find_nearest_slot_does_not_reserve() {
        let lot = demo_lot();
        let slot = lot.find_nearest_slot(SizeClass::Small, 1).unwrap().unwrap();
        assert_eq!(slot.id, SlotId(2));
        assert_eq!(lot.free_count(), 3);
        assert!(lot.find_nearest_slot(SizeClass::Small, 7).is_err());
    }
}
