//! HTTP route definitions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::app::AppState;
use crate::game::world::HeadlessPlayer;
use crate::game::{ItemId, MotionSample, Slot, World};
use crate::store::shop::{ShopError, ToggleState};
use crate::util::time::uptime_secs;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let shop_routes = Router::new()
        .route("/shop/buy", post(buy_handler))
        .route("/shop/sell", post(sell_handler))
        .route("/shop/toggle", post(toggle_handler));

    let player_routes = Router::new()
        .route("/players/:slot", get(player_handler))
        .route("/players/:slot/connect", post(connect_handler))
        .route("/players/:slot/disconnect", post(disconnect_handler))
        .route("/players/:slot/spawn", post(spawn_handler))
        .route("/players/:slot/death", post(death_handler))
        .route("/players/:slot/input", post(input_handler))
        .route("/players/:slot/pawn", post(pawn_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/catalog", get(catalog_handler))
        .merge(shop_routes)
        .merge(player_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    tick: u64,
    active_entitlements: usize,
    connected_players: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected_players = state.world.lock().players().len();

    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        tick: state.plugin.tick(),
        active_entitlements: state.plugin.active_entitlements(),
        connected_players,
    })
}

// ============================================================================
// Catalog endpoint
// ============================================================================

#[derive(Serialize)]
struct CatalogResponse {
    category: String,
    items: Vec<CatalogEntry>,
}

#[derive(Serialize)]
struct CatalogEntry {
    item_id: ItemId,
    unique_name: String,
    display_name: String,
    category: String,
    category_name: Option<String>,
    price: i64,
    sell_price: i64,
    duration: i64,
    jumps: Option<u32>,
}

async fn catalog_handler(State(state): State<AppState>) -> Json<CatalogResponse> {
    let items = state
        .shop
        .items()
        .into_iter()
        .map(|(item_id, item)| CatalogEntry {
            item_id,
            jumps: state.catalog.lookup(&item.unique_name).ok(),
            category_name: state.shop.category(&item.category),
            category: item.category,
            unique_name: item.unique_name,
            display_name: item.display_name,
            price: item.price,
            sell_price: item.sell_price,
            duration: item.duration,
        })
        .collect();

    Json(CatalogResponse {
        category: state.config.category.unique_name.clone(),
        items,
    })
}

// ============================================================================
// Shop endpoints
// ============================================================================

#[derive(Deserialize)]
struct ShopRequest {
    slot: Slot,
    unique_name: String,
}

#[derive(Deserialize)]
struct ToggleRequest {
    slot: Slot,
    unique_name: String,
    state: ToggleState,
}

#[derive(Serialize)]
struct ShopResponse {
    item_id: ItemId,
    status: &'static str,
}

fn accepted(item_id: ItemId) -> (StatusCode, Json<ShopResponse>) {
    (
        StatusCode::ACCEPTED,
        Json(ShopResponse {
            item_id,
            status: "queued",
        }),
    )
}

async fn buy_handler(
    State(state): State<AppState>,
    Json(req): Json<ShopRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_slot(&state, req.slot)?;
    let item_id = state.shop.buy(req.slot, &req.unique_name)?;
    Ok(accepted(item_id))
}

async fn sell_handler(
    State(state): State<AppState>,
    Json(req): Json<ShopRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_slot(&state, req.slot)?;
    let item_id = state.shop.sell(req.slot, &req.unique_name)?;
    Ok(accepted(item_id))
}

async fn toggle_handler(
    State(state): State<AppState>,
    Json(req): Json<ToggleRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_slot(&state, req.slot)?;
    let item_id = state.shop.toggle(req.slot, &req.unique_name, req.state)?;
    Ok(accepted(item_id))
}

// ============================================================================
// Player endpoints
// ============================================================================

#[derive(Deserialize, Default)]
struct ConnectRequest {
    #[serde(default)]
    bot: bool,
}

async fn player_handler(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
) -> Result<Json<HeadlessPlayer>, AppError> {
    let world = state.world.lock();
    world
        .player(Slot(slot))
        .cloned()
        .map(Json)
        .ok_or_else(|| not_connected(Slot(slot)))
}

async fn connect_handler(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
    body: Option<Json<ConnectRequest>>,
) -> Result<StatusCode, AppError> {
    let slot = Slot(slot);
    check_slot(&state, slot)?;
    let req = body.map(|Json(req)| req).unwrap_or_default();

    state.world.lock().connect(slot, req.bot);
    Ok(StatusCode::NO_CONTENT)
}

async fn disconnect_handler(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
) -> Result<StatusCode, AppError> {
    let slot = Slot(slot);
    let was_connected = state.world.lock().disconnect(slot);
    state.plugin.disconnect(slot);

    if was_connected {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_connected(slot))
    }
}

async fn spawn_handler(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
) -> Result<StatusCode, AppError> {
    let slot = Slot(slot);
    // The spawn event must be queued before the tick loop can see the player alive
    let mut world = state.world.lock();
    if !world.set_alive(slot, true) {
        return Err(not_connected(slot));
    }
    state.plugin.spawn(slot);
    Ok(StatusCode::NO_CONTENT)
}

async fn death_handler(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
) -> Result<StatusCode, AppError> {
    let slot = Slot(slot);
    if state.world.lock().set_alive(slot, false) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_connected(slot))
    }
}

async fn input_handler(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
    Json(sample): Json<MotionSample>,
) -> Result<StatusCode, AppError> {
    let slot = Slot(slot);
    if state.world.lock().set_input(slot, sample) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_connected(slot))
    }
}

#[derive(Deserialize)]
struct PawnRequest {
    available: bool,
}

async fn pawn_handler(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
    Json(req): Json<PawnRequest>,
) -> Result<StatusCode, AppError> {
    let slot = Slot(slot);
    if state.world.lock().set_pawn_available(slot, req.available) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_connected(slot))
    }
}

fn check_slot(state: &AppState, slot: Slot) -> Result<(), AppError> {
    if slot.0 >= state.config.max_players {
        return Err(AppError::BadRequest(format!(
            "Slot {} is outside 0..{}",
            slot, state.config.max_players
        )));
    }
    Ok(())
}

fn not_connected(slot: Slot) -> AppError {
    AppError::NotFound(format!("No player in slot {}", slot))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<ShopError> for AppError {
    fn from(e: ShopError) -> Self {
        match e {
            ShopError::UnknownItem(_) => AppError::NotFound(e.to_string()),
            ShopError::NoCallbacks(_) | ShopError::Duplicate(_) => {
                AppError::Conflict(e.to_string())
            }
            ShopError::UnknownCategory(_) => AppError::BadRequest(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
