//! Slot registry — owns every slot of a lot and its occupancy flag

use tracing::warn;

use super::model::{SizeClass, Slot, SlotId};
use crate::support::errors::{LotError, LotResult};

/// Fixed, ordered collection of slots.
///
/// Slots are created once and never removed; the only mutation is toggling
/// a slot between free and occupied through [`occupy`](Self::occupy) and
/// [`release`](Self::release).
#[derive(Debug, Clone)]
pub struct SlotRegistry {
    entry_points: usize,
    slots: Vec<Slot>,
}

impl SlotRegistry {
    /// Build the registry from a distance matrix (one row per slot, one
    /// column per entry point) and a class per slot.
    pub fn new(
        entry_points: usize,
        distances: Vec<Vec<u32>>,
        classes: Vec<SizeClass>,
    ) -> LotResult<Self> {
        if entry_points == 0 {
            return Err(LotError::Construction(
                "lot needs at least one entry point".to_string(),
            ));
        }
        if classes.is_empty() {
            return Err(LotError::Construction("lot needs at least one slot".to_string()));
        }
        if distances.len() != classes.len() {
            return Err(LotError::Construction(format!(
                "{} distance rows for {} slot classes",
                distances.len(),
                classes.len()
            )));
        }
        if let Some((index, row)) = distances
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != entry_points)
        {
            return Err(LotError::Construction(format!(
                "slot {} has {} distances, expected {}",
                index,
                row.len(),
                entry_points
            )));
        }

        let slots = distances
            .into_iter()
            .zip(classes)
            .enumerate()
            .map(|(index, (row, class))| Slot::new(SlotId(index), class, row))
            .collect();

        Ok(Self {
            entry_points,
            slots,
        })
    }

    pub fn entry_points(&self) -> usize {
        self.entry_points
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Free slots satisfying `predicate`, in slot order
    pub fn free_matching<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Slot> + 'a
    where
        P: Fn(&Slot) -> bool + 'a,
    {
        self.slots
            .iter()
            .filter(move |slot| slot.is_free() && predicate(*slot))
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_free()).count()
    }

    /// Mark a slot occupied
    pub fn occupy(&mut self, id: SlotId) {
        self.toggle(id, true);
    }

    /// Mark a slot free
    pub fn release(&mut self, id: SlotId) {
        self.toggle(id, false);
    }

    fn toggle(&mut self, id: SlotId, occupied: bool) {
        match self.slots.get_mut(id.0) {
            Some(slot) => {
                if slot.is_occupied() == occupied {
                    warn!(slot_id = id.0, occupied, "Slot already in requested state");
                }
                slot.set_occupied(occupied);
            }
            None => warn!(slot_id = id.0, "Attempted to toggle unknown slot"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
