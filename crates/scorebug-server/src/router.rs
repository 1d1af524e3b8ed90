//! Axum router for the control channel.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the control router.
///
/// - `GET /` -- WebSocket control channel, or a status page for browsers
/// - `GET /ws` -- WebSocket control channel
/// - `GET /health` -- liveness and uptime
/// - `GET /api/game` -- current game state
/// - `POST /api/command` -- run one text command
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(ws::root))
        .route("/ws", get(ws::ws_control))
        .route("/health", get(handlers::health))
        .route("/api/game", get(handlers::get_game))
        .route("/api/command", post(handlers::post_command))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
