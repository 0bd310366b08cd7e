//! Application state shared across routes

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::game::{HeadlessWorld, PluginHandle};
use crate::store::{Catalog, LocalShop};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub shop: LocalShop,
    pub world: Arc<Mutex<HeadlessWorld>>,
    pub plugin: PluginHandle,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<Catalog>,
        shop: LocalShop,
        world: Arc<Mutex<HeadlessWorld>>,
        plugin: PluginHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            catalog,
            shop,
            world,
            plugin,
        }
    }
}
