//! Jump simulation modules

pub mod driver;
pub mod engine;
pub mod plugin;
pub mod slots;
pub mod world;

pub use plugin::{JumpsPlugin, PluginEvent, PluginHandle};
pub use world::{HeadlessWorld, World};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable per-connection player index assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(pub usize);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Economy-side identifier of a registered shop item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ground contact and jump button observed for one player on the current tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionSample {
    pub grounded: bool,
    pub jump_pressed: bool,
}

impl MotionSample {
    pub fn new(grounded: bool, jump_pressed: bool) -> Self {
        Self {
            grounded,
            jump_pressed,
        }
    }
}
