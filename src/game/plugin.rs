//! Plugin runtime: event queue and the per-tick loop

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use crate::config::Config;
use crate::store::catalog::{Catalog, CatalogError};
use crate::store::shop::{ShopCallbacks, ShopEvent, ToggleState};
use crate::util::time::tick_duration;

use super::driver::{TickDriver, TickReport};
use super::slots::{Entitlement, JumpTable, SlotError};
use super::world::World;
use super::{ItemId, Slot};

/// Anything that changes a slot's entitlement or motion state from outside the tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginEvent {
    Shop(ShopEvent),
    Disconnect(Slot),
    Spawn(Slot),
}

/// Why a grant was not installed
#[derive(Debug, thiserror::Error)]
pub enum GrantError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Slot(#[from] SlotError),
}

/// Cloneable handle for feeding events to a running plugin
#[derive(Clone)]
pub struct PluginHandle {
    events_tx: mpsc::UnboundedSender<PluginEvent>,
    active: Arc<AtomicUsize>,
    tick: Arc<AtomicU64>,
}

impl PluginHandle {
    /// Callback set to wire into the economy service
    pub fn callbacks(&self) -> ShopCallbacks {
        ShopCallbacks::new(self.events_tx.clone())
    }

    pub fn disconnect(&self, slot: Slot) -> bool {
        self.send(PluginEvent::Disconnect(slot))
    }

    pub fn spawn(&self, slot: Slot) -> bool {
        self.send(PluginEvent::Spawn(slot))
    }

    fn send(&self, event: PluginEvent) -> bool {
        match self.events_tx.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                warn!(?event, "Jumps plugin stopped, event dropped");
                false
            }
        }
    }

    /// Slots with an active entitlement, as of the last processed tick
    pub fn active_entitlements(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Ticks completed so far
    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }
}

/// The extra-jumps plugin. Owns the slot table; events are applied only between ticks.
pub struct JumpsPlugin {
    table: JumpTable,
    catalog: Arc<Catalog>,
    driver: TickDriver,
    tick_rate: u32,
    tick: u64,
    events_rx: mpsc::UnboundedReceiver<PluginEvent>,
    active: Arc<AtomicUsize>,
    tick_counter: Arc<AtomicU64>,
}

impl JumpsPlugin {
    pub fn new(config: &Config, catalog: Arc<Catalog>) -> (Self, PluginHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicUsize::new(0));
        let tick_counter = Arc::new(AtomicU64::new(0));

        let handle = PluginHandle {
            events_tx,
            active: active.clone(),
            tick: tick_counter.clone(),
        };

        let plugin = Self {
            table: JumpTable::new(config.max_players),
            catalog,
            driver: TickDriver::new(config.jump_impulse),
            tick_rate: config.tick_rate,
            tick: 0,
            events_rx,
            active,
            tick_counter,
        };

        (plugin, handle)
    }

    /// Run the tick loop until `shutdown` resolves
    pub async fn run<W, F>(mut self, world: Arc<Mutex<W>>, shutdown: F)
    where
        W: World + Send,
        F: Future<Output = ()>,
    {
        info!(
            tick_rate = self.tick_rate,
            slots = self.table.capacity(),
            "Jumps plugin started"
        );

        let mut tick_interval = interval(tick_duration(self.tick_rate));
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tick_interval.tick() => self.step(&world),
            }
        }

        info!(tick = self.tick, "Jumps plugin stopped");
    }

    fn step<W: World>(&mut self, world: &Mutex<W>) {
        let mut world = world.lock();
        let report = self.on_tick(&mut *world);
        if report.impulses > 0 || report.skipped_unavailable > 0 {
            trace!(tick = self.tick, ?report, "Tick");
        }
    }

    /// Apply queued events, then run the driver once
    pub fn on_tick<W: World>(&mut self, world: &mut W) -> TickReport {
        self.process_events();

        let report = self.driver.run(&mut self.table, world);

        self.tick += 1;
        self.tick_counter.store(self.tick, Ordering::Relaxed);
        report
    }

    /// Drain the event queue. Each event is applied in full before the next.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }
        self.active
            .store(self.table.active_count(), Ordering::Relaxed);
    }

    fn apply(&mut self, event: PluginEvent) {
        match event {
            PluginEvent::Shop(ShopEvent::Buy {
                slot,
                item_id,
                unique_name,
            }) => self.grant(slot, item_id, &unique_name),
            PluginEvent::Shop(ShopEvent::Toggle {
                slot,
                item_id,
                unique_name,
                state: ToggleState::On,
            }) => self.grant(slot, item_id, &unique_name),
            PluginEvent::Shop(ShopEvent::Toggle {
                slot,
                unique_name,
                state: ToggleState::Off,
                ..
            })
            | PluginEvent::Shop(ShopEvent::Sell {
                slot, unique_name, ..
            }) => {
                if self.table.revoke(slot).is_some() {
                    info!(slot = %slot, unique_name = %unique_name, "Extra jumps revoked");
                }
            }
            PluginEvent::Disconnect(slot) => {
                if self.table.revoke(slot).is_some() {
                    debug!(slot = %slot, "Extra jumps cleared on disconnect");
                }
            }
            PluginEvent::Spawn(slot) => {
                if let Some(entitlement) = self.table.reset_motion(slot) {
                    debug!(
                        slot = %slot,
                        limit = entitlement.extra_jump_limit,
                        "Motion state reset on spawn"
                    );
                }
            }
        }
    }

    fn grant(&mut self, slot: Slot, item_id: ItemId, unique_name: &str) {
        match self.try_grant(slot, item_id, unique_name) {
            Ok(limit) => {
                info!(slot = %slot, unique_name, item_id = %item_id, limit, "Extra jumps granted");
            }
            Err(e) => {
                error!(slot = %slot, unique_name, error = %e, "Extra-jump grant rejected");
            }
        }
    }

    /// Validate the catalog entry before touching the table, so a bad entry
    /// leaves any prior entitlement in place
    fn try_grant(&mut self, slot: Slot, item_id: ItemId, unique_name: &str) -> Result<u32, GrantError> {
        let limit = self.catalog.lookup(unique_name)?;
        self.table.grant(slot, Entitlement::new(limit, item_id))?;
        Ok(limit)
    }
}

#[cfg(test)]
impl JumpsPlugin {
    pub fn table(&self) -> &JumpTable {
        &self.table
    }
}
