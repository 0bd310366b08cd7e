//! Economy service boundary: item registration and buy/sell/toggle callbacks

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::CategoryConfig;
use crate::game::{ItemId, PluginEvent, Slot};

use super::catalog::Catalog;

/// Item as registered with the economy service
#[derive(Debug, Clone, Serialize)]
pub struct ItemRegistration {
    pub unique_name: String,
    pub display_name: String,
    pub category: String,
    pub price: i64,
    pub sell_price: i64,
    pub duration: i64,
}

/// Toggle state reported by the economy service (0 = off, 1 = on)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ToggleState {
    Off,
    On,
}

impl TryFrom<u8> for ToggleState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            other => Err(format!("invalid toggle state {other}, expected 0 or 1")),
        }
    }
}

impl From<ToggleState> for u8 {
    fn from(state: ToggleState) -> Self {
        match state {
            ToggleState::Off => 0,
            ToggleState::On => 1,
        }
    }
}

/// Callback delivered by the economy service for one of our items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopEvent {
    Buy {
        slot: Slot,
        item_id: ItemId,
        unique_name: String,
    },
    Sell {
        slot: Slot,
        item_id: ItemId,
        unique_name: String,
    },
    Toggle {
        slot: Slot,
        item_id: ItemId,
        unique_name: String,
        state: ToggleState,
    },
}

/// Callback set wired to every registered item. Events are queued for the plugin
/// and applied at the start of its next tick.
#[derive(Debug, Clone)]
pub struct ShopCallbacks {
    events_tx: mpsc::UnboundedSender<PluginEvent>,
}

impl ShopCallbacks {
    pub fn new(events_tx: mpsc::UnboundedSender<PluginEvent>) -> Self {
        Self { events_tx }
    }

    pub fn on_buy(&self, slot: Slot, item_id: ItemId, unique_name: &str) {
        self.send(ShopEvent::Buy {
            slot,
            item_id,
            unique_name: unique_name.to_string(),
        });
    }

    pub fn on_sell(&self, slot: Slot, item_id: ItemId, unique_name: &str) {
        self.send(ShopEvent::Sell {
            slot,
            item_id,
            unique_name: unique_name.to_string(),
        });
    }

    pub fn on_toggle(&self, slot: Slot, item_id: ItemId, unique_name: &str, state: ToggleState) {
        self.send(ShopEvent::Toggle {
            slot,
            item_id,
            unique_name: unique_name.to_string(),
            state,
        });
    }

    fn send(&self, event: ShopEvent) {
        if self.events_tx.send(PluginEvent::Shop(event)).is_err() {
            warn!("Jumps plugin stopped, shop event dropped");
        }
    }
}

/// External shop the catalog is registered with
pub trait EconomyService {
    fn create_category(&self, unique_name: &str, display_name: &str);

    fn add_item(
        &self,
        item: ItemRegistration,
    ) -> impl Future<Output = Result<ItemId, ShopError>> + Send;

    fn set_item_callbacks(&self, item_id: ItemId, callbacks: ShopCallbacks);
}

/// Catalog item that made it into the shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredItem {
    pub unique_name: String,
    pub item_id: ItemId,
    pub jumps: u32,
}

/// Register every usable catalog item, one at a time. Each item's callbacks are
/// wired before the next item is added.
///
/// Items land in the configured category unless they name their own; such
/// categories are created the first time an item needs them.
pub async fn register_catalog<E: EconomyService>(
    economy: &E,
    catalog: &Catalog,
    category: &CategoryConfig,
    callbacks: &ShopCallbacks,
) -> Vec<RegisteredItem> {
    economy.create_category(&category.unique_name, &category.display_name);
    let mut categories = HashSet::from([category.unique_name.as_str()]);

    let mut registered = Vec::new();
    for (unique_name, item, jumps) in catalog.registration_order() {
        let item_category = item.category.as_deref().unwrap_or(category.unique_name.as_str());
        if categories.insert(item_category) {
            economy.create_category(item_category, item_category);
            debug!(category = item_category, unique_name, "Shop category created for item");
        }

        let registration = ItemRegistration {
            unique_name: unique_name.to_string(),
            display_name: item.display_name(unique_name).to_string(),
            category: item_category.to_string(),
            price: item.price,
            sell_price: item.sell_price,
            duration: item.duration,
        };

        match economy.add_item(registration).await {
            Ok(item_id) => {
                economy.set_item_callbacks(item_id, callbacks.clone());
                info!(unique_name, item_id = %item_id, jumps, "Shop item registered");
                registered.push(RegisteredItem {
                    unique_name: unique_name.to_string(),
                    item_id,
                    jumps,
                });
            }
            Err(e) => {
                error!(unique_name, error = %e, "Failed to register shop item");
            }
        }
    }

    registered
}

struct LocalItem {
    registration: ItemRegistration,
    callbacks: Option<ShopCallbacks>,
}

#[derive(Default)]
struct LocalShopInner {
    categories: DashMap<String, String>,
    items: DashMap<ItemId, LocalItem>,
    by_name: DashMap<String, ItemId>,
    next_id: AtomicI32,
}

/// In-process economy service. Purchases made through it fire the registered callbacks.
#[derive(Clone, Default)]
pub struct LocalShop {
    inner: Arc<LocalShopInner>,
}

impl LocalShop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_id(&self, unique_name: &str) -> Option<ItemId> {
        self.inner.by_name.get(unique_name).map(|id| *id.value())
    }

    pub fn category(&self, unique_name: &str) -> Option<String> {
        self.inner
            .categories
            .get(unique_name)
            .map(|c| c.value().clone())
    }

    /// Registered items ordered by item id
    pub fn items(&self) -> Vec<(ItemId, ItemRegistration)> {
        let mut items: Vec<(ItemId, ItemRegistration)> = self
            .inner
            .items
            .iter()
            .map(|entry| (*entry.key(), entry.value().registration.clone()))
            .collect();
        items.sort_by_key(|(id, _)| id.0);
        items
    }

    pub fn buy(&self, slot: Slot, unique_name: &str) -> Result<ItemId, ShopError> {
        let (item_id, callbacks) = self.resolve(unique_name)?;
        callbacks.on_buy(slot, item_id, unique_name);
        Ok(item_id)
    }

    pub fn sell(&self, slot: Slot, unique_name: &str) -> Result<ItemId, ShopError> {
        let (item_id, callbacks) = self.resolve(unique_name)?;
        callbacks.on_sell(slot, item_id, unique_name);
        Ok(item_id)
    }

    pub fn toggle(
        &self,
        slot: Slot,
        unique_name: &str,
        state: ToggleState,
    ) -> Result<ItemId, ShopError> {
        let (item_id, callbacks) = self.resolve(unique_name)?;
        callbacks.on_toggle(slot, item_id, unique_name, state);
        Ok(item_id)
    }

    fn resolve(&self, unique_name: &str) -> Result<(ItemId, ShopCallbacks), ShopError> {
        let item_id = self
            .item_id(unique_name)
            .ok_or_else(|| ShopError::UnknownItem(unique_name.to_string()))?;

        let callbacks = self
            .inner
            .items
            .get(&item_id)
            .and_then(|item| item.callbacks.clone())
            .ok_or_else(|| ShopError::NoCallbacks(unique_name.to_string()))?;

        Ok((item_id, callbacks))
    }
}

impl EconomyService for LocalShop {
    fn create_category(&self, unique_name: &str, display_name: &str) {
        self.inner
            .categories
            .insert(unique_name.to_string(), display_name.to_string());
    }

    fn add_item(
        &self,
        item: ItemRegistration,
    ) -> impl Future<Output = Result<ItemId, ShopError>> + Send {
        let inner = self.inner.clone();
        async move {
            if !inner.categories.contains_key(&item.category) {
                return Err(ShopError::UnknownCategory(item.category));
            }
            if inner.by_name.contains_key(&item.unique_name) {
                return Err(ShopError::Duplicate(item.unique_name));
            }

            let item_id = ItemId(inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
            inner.by_name.insert(item.unique_name.clone(), item_id);
            inner.items.insert(
                item_id,
                LocalItem {
                    registration: item,
                    callbacks: None,
                },
            );
            Ok(item_id)
        }
    }

    fn set_item_callbacks(&self, item_id: ItemId, callbacks: ShopCallbacks) {
        if let Some(mut item) = self.inner.items.get_mut(&item_id) {
            item.callbacks = Some(callbacks);
        }
    }
}

/// Economy service errors
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("Item {0} is not registered")]
    UnknownItem(String),

    #[error("Item {0} has no callbacks")]
    NoCallbacks(String),

    #[error("Item {0} is already registered")]
    Duplicate(String),

    #[error("Category {0} does not exist")]
    UnknownCategory(String),
}
