//! Shop Jumps - extra mid-air jumps sold through the in-game shop
//!
//! This is the host entry point. It:
//! - loads the item catalog and registers it with the economy service
//! - runs the per-tick jump plugin against the simulation world
//! - serves the admin HTTP surface used to drive purchases and player input

mod app;
mod config;
mod game;
mod http;
mod store;
mod util;

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::Config;
use crate::game::{HeadlessWorld, JumpsPlugin};
use crate::http::build_router;
use crate::store::{register_catalog, Catalog, LocalShop};
use crate::util::time::init_server_time;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);
    init_server_time();

    info!("Starting Shop Jumps host");
    info!("Server address: {}", config.server_addr);

    let catalog = Arc::new(Catalog::load_or_empty(&config.catalog_path)?);
    if catalog.is_empty() {
        warn!(path = %config.catalog_path.display(), "Catalog has no items, extra jumps cannot be bought");
    } else {
        info!(entries = catalog.len(), "Catalog loaded");
    }
    let (plugin, handle) = JumpsPlugin::new(&config, catalog.clone());

    // Items must be fully registered before the tick loop starts
    let shop = LocalShop::new();
    let registered = register_catalog(&shop, &catalog, &config.category, &handle.callbacks()).await;
    info!(
        category = %config.category.unique_name,
        items = registered.len(),
        "Catalog registered"
    );

    let world = Arc::new(Mutex::new(HeadlessWorld::new()));
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let tick_task = tokio::spawn(plugin.run(world.clone(), async {
        let _ = stop_rx.await;
    }));

    let state = AppState::new(config.clone(), catalog, shop, world, handle);
    let router = build_router(state);

    let addr: SocketAddr = config.server_addr;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop ticking only after the HTTP side has drained
    let _ = stop_tx.send(());
    tick_task.await?;
    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
