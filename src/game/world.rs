//! Simulation environment boundary and an in-memory implementation

use std::collections::BTreeMap;

use serde::Serialize;

use super::{MotionSample, Slot};

/// Connected player as listed by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerInfo {
    pub slot: Slot,
    pub is_bot: bool,
    pub alive: bool,
}

/// Host simulation the tick driver reads from and writes to
pub trait World {
    /// All currently connected players
    fn players(&self) -> Vec<PlayerInfo>;

    /// Current ground/button state, or `None` when the player's pawn can't be resolved
    fn sample(&self, slot: Slot) -> Option<MotionSample>;

    /// Overwrite the vertical velocity component of the player's pawn
    fn set_vertical_velocity(&mut self, slot: Slot, velocity: f32);
}

/// Per-player state kept by [`HeadlessWorld`]
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessPlayer {
    pub is_bot: bool,
    pub alive: bool,
    pub pawn_available: bool,
    pub grounded: bool,
    pub jump_pressed: bool,
    pub vertical_velocity: f32,
}

impl HeadlessPlayer {
    fn new(is_bot: bool) -> Self {
        Self {
            is_bot,
            alive: true,
            pawn_available: true,
            grounded: true,
            jump_pressed: false,
            vertical_velocity: 0.0,
        }
    }
}

/// World without physics: inputs are set from outside, velocity writes are recorded
#[derive(Debug, Default)]
pub struct HeadlessWorld {
    players: BTreeMap<Slot, HeadlessPlayer>,
}

impl HeadlessWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a player, replacing whatever occupied the slot
    pub fn connect(&mut self, slot: Slot, is_bot: bool) {
        self.players.insert(slot, HeadlessPlayer::new(is_bot));
    }

    pub fn disconnect(&mut self, slot: Slot) -> bool {
        self.players.remove(&slot).is_some()
    }

    pub fn player(&self, slot: Slot) -> Option<&HeadlessPlayer> {
        self.players.get(&slot)
    }

    pub fn set_input(&mut self, slot: Slot, sample: MotionSample) -> bool {
        self.update(slot, |player| {
            player.grounded = sample.grounded;
            player.jump_pressed = sample.jump_pressed;
            if sample.grounded {
                player.vertical_velocity = 0.0;
            }
        })
    }

    pub fn set_alive(&mut self, slot: Slot, alive: bool) -> bool {
        self.update(slot, |player| player.alive = alive)
    }

    pub fn set_pawn_available(&mut self, slot: Slot, available: bool) -> bool {
        self.update(slot, |player| player.pawn_available = available)
    }

    fn update(&mut self, slot: Slot, f: impl FnOnce(&mut HeadlessPlayer)) -> bool {
        match self.players.get_mut(&slot) {
            Some(player) => {
                f(player);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
impl HeadlessWorld {
    pub fn vertical_velocity(&self, slot: Slot) -> Option<f32> {
        self.players.get(&slot).map(|p| p.vertical_velocity)
    }
}

impl World for HeadlessWorld {
    fn players(&self) -> Vec<PlayerInfo> {
        self.players
            .iter()
            .map(|(slot, p)| PlayerInfo {
                slot: *slot,
                is_bot: p.is_bot,
                alive: p.alive,
            })
            .collect()
    }

    fn sample(&self, slot: Slot) -> Option<MotionSample> {
        self.players
            .get(&slot)
            .filter(|p| p.pawn_available)
            .map(|p| MotionSample::new(p.grounded, p.jump_pressed))
    }

    fn set_vertical_velocity(&mut self, slot: Slot, velocity: f32) {
        if let Some(player) = self.players.get_mut(&slot) {
            if player.pawn_available {
                player.vertical_velocity = velocity;
            }
        }
    }
}
