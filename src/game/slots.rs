//! Per-slot entitlement and motion state table
//!
//! Each slot holds at most one [`SlotRecord`]. The entitlement and its motion
//! state share the record, so one can never exist without the other.

use super::{ItemId, Slot};

/// Active extra-jump purchase for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlement {
    /// Extra (non-ground) jumps allowed between landings
    pub extra_jump_limit: u32,
    /// Shop item backing the entitlement
    pub item_id: ItemId,
}

impl Entitlement {
    pub fn new(extra_jump_limit: u32, item_id: ItemId) -> Self {
        Self {
            extra_jump_limit,
            item_id,
        }
    }
}

/// Previous-tick snapshot plus the extra jumps consumed since the last landing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionState {
    pub last_grounded: bool,
    pub last_jump_pressed: bool,
    pub extra_jumps_used: u32,
}

impl MotionState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct SlotRecord {
    pub entitlement: Entitlement,
    pub motion: MotionState,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("Slot {slot} is outside the player table (capacity {capacity})")]
    OutOfRange { slot: Slot, capacity: usize },
}

/// Fixed-capacity arena of slot records, indexed by player slot
pub struct JumpTable {
    slots: Vec<Option<SlotRecord>>,
    active: usize,
}

impl JumpTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            active: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots with an active entitlement
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Install or replace the entitlement for a slot, starting from fresh motion state.
    /// Returns the entitlement it replaced, if any.
    pub fn grant(
        &mut self,
        slot: Slot,
        entitlement: Entitlement,
    ) -> Result<Option<Entitlement>, SlotError> {
        let capacity = self.capacity();
        let cell = self
            .slots
            .get_mut(slot.0)
            .ok_or(SlotError::OutOfRange { slot, capacity })?;

        let previous = cell.replace(SlotRecord {
            entitlement,
            motion: MotionState::default(),
        });

        if previous.is_none() {
            self.active += 1;
        }

        Ok(previous.map(|record| record.entitlement))
    }

    /// Remove the entitlement and its motion state. Unknown slots are ignored.
    pub fn revoke(&mut self, slot: Slot) -> Option<Entitlement> {
        let removed = self.slots.get_mut(slot.0).and_then(Option::take);
        if removed.is_some() {
            self.active -= 1;
        }
        removed.map(|record| record.entitlement)
    }

    pub fn is_active(&self, slot: Slot) -> bool {
        matches!(self.slots.get(slot.0), Some(Some(_)))
    }

    /// Re-baseline motion state, e.g. on respawn. Returns the current entitlement
    /// when the slot is active.
    pub fn reset_motion(&mut self, slot: Slot) -> Option<Entitlement> {
        let record = self.record_mut(slot)?;
        record.motion.reset();
        Some(record.entitlement)
    }

    pub fn record_mut(&mut self, slot: Slot) -> Option<&mut SlotRecord> {
        self.slots.get_mut(slot.0).and_then(Option::as_mut)
    }
}

#[cfg(test)]
impl JumpTable {
    pub fn entitlement(&self, slot: Slot) -> Option<&Entitlement> {
        self.record(slot).map(|record| &record.entitlement)
    }

    pub fn motion(&self, slot: Slot) -> Option<&MotionState> {
        self.record(slot).map(|record| &record.motion)
    }

    fn record(&self, slot: Slot) -> Option<&SlotRecord> {
        self.slots.get(slot.0).and_then(Option::as_ref)
    }
}
