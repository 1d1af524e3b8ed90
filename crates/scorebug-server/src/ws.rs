//! WebSocket control channel.
//!
//! Each text frame is one command (see [`scorebug_core::intent`]). The
//! reply is the resulting game state as JSON, or the error as plain text.
//! Commands from all clients go through the same engine, one at a time.

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use scorebug_core::{GameSession, GameState, Intent};
use tracing::{debug, info, warn};

use crate::error::ControlError;
use crate::handlers;
use crate::state::AppState;

/// Parse and execute one command.
///
/// # Errors
///
/// Returns [`ControlError::Intent`] if the command is not understood. The
/// game state is unchanged in that case.
pub async fn run_command(session: &GameSession, text: &str) -> Result<GameState, ControlError> {
    let intent: Intent = text.parse()?;
    debug!(?intent, "control command");
    Ok(session.execute(intent).await)
}

/// Execute one command and render the reply frame.
pub async fn reply(session: &GameSession, text: &str) -> String {
    let rendered = match run_command(session, text).await {
        Ok(state) => serde_json::to_string(&state).map_err(ControlError::from),
        Err(e) => Err(e),
    };
    rendered.unwrap_or_else(|e| {
        warn!(command = text, error = %e, "control command rejected");
        e.to_string()
    })
}

/// `GET /`: the control channel for WebSocket clients, the status page
/// for everyone else.
pub async fn root(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    state: State<Arc<AppState>>,
) -> Response {
    match upgrade {
        Ok(ws) => ws_control(ws, state).await.into_response(),
        Err(_) => handlers::index(state).await.into_response(),
    }
}

/// `GET /ws`: upgrade to the control channel.
pub async fn ws_control(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!("control client connected");

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = reply(&state.session, text.as_str()).await;
                if socket.send(Message::Text(response.into())).await.is_err() {
                    debug!("control client disconnected (send failed)");
                    return;
                }
            }
            Ok(Message::Ping(data)) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    debug!("control client disconnected (pong failed)");
                    return;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                // Binary and pong frames carry no commands.
            }
            Err(e) => {
                debug!("WebSocket error: {e}");
                return;
            }
        }
    }

    info!("control client disconnected");
}
