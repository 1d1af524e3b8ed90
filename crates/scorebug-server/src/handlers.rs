//! HTTP endpoint handlers for the control server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page (non-WebSocket clients) |
//! | `GET` | `/health` | Liveness and uptime |
//! | `GET` | `/api/game` | Current game state |
//! | `POST` | `/api/command` | Run one text command |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use scorebug_core::{GameState, Side};

use crate::error::ControlError;
use crate::state::AppState;
use crate::ws::run_command;

/// Serve a minimal HTML page with the score and links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let game = state.engine().snapshot().await;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Scorebug</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; }}
        td {{ padding: 0.25rem 1rem 0.25rem 0; }}
        a {{ color: #58a6ff; }}
    </style>
</head>
<body>
    <h1>Scorebug</h1>
    <table>
        <tr><td>Home</td><td>{home}</td></tr>
        <tr><td>Away</td><td>{away}</td></tr>
        <tr><td>Quarter</td><td>{quarter}</td></tr>
        <tr><td>Game clock</td><td>{clock}</td></tr>
        <tr><td>Down</td><td>{down}</td></tr>
    </table>
    <p>Control channel: WebSocket on <code>/</code> or <code>/ws</code>.</p>
    <p><a href="/api/game">/api/game</a> &middot; <a href="/health">/health</a></p>
</body>
</html>"#,
        home = game.points(Side::Home),
        away = game.points(Side::Away),
        quarter = game.quarter_ordinal(),
        clock = game.game_clock_display(),
        down = html_escape(&game.down_and_distance()),
    ))
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Liveness and uptime.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds();
    Json(serde_json::json!({
        "status": "ok",
        "startedAt": state.started_at.to_rfc3339(),
        "uptimeSeconds": uptime,
    }))
}

/// The current game state. Does not sync.
pub async fn get_game(State(state): State<Arc<AppState>>) -> Json<GameState> {
    Json(state.engine().snapshot().await)
}

/// Run the command in the request body.
///
/// # Errors
///
/// Returns `400` with a JSON error body if the command is rejected.
pub async fn post_command(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<GameState>, ControlError> {
    Ok(Json(run_command(&state.session, &body).await?))
}
