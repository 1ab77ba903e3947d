//! Nearest-slot allocation

use tracing::debug;

use crate::domain::{SizeClass, Slot, SlotRegistry};

/// Nearest free slot that can take a vehicle of `class`, measured from
/// `entry_point`.
///
/// Ties go to the slot constructed first, so identical registry state
/// always yields the same slot. Returns `None` when nothing fits or when
/// `entry_point` is outside the lot.
pub fn find_nearest_slot(
    registry: &SlotRegistry,
    class: SizeClass,
    entry_point: usize,
) -> Option<&Slot> {
    let nearest = registry
        .free_matching(move |slot| class.fits_in(slot.class))
        .filter_map(|slot| slot.distance_from(entry_point).map(|d| (d, slot)))
        .min_by_key(|(distance, slot)| (*distance, slot.id))
        .map(|(_, slot)| slot);

    match nearest {
        Some(slot) => debug!(
            %class,
            entry_point,
            slot_id = slot.id.0,
            slot_class = %slot.class,
            "Nearest eligible slot found"
        ),
        None => debug!(%class, entry_point, "No eligible free slot"),
    }

    nearest
}

// ── Tests ──────────────────────────────────────────────────────
