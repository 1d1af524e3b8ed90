//! Shared application state for the control server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use scorebug_core::{GameEngine, GameSession};

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// The running game.
    pub session: GameSession,
    /// When the server started.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wrap a session.
    pub fn new(session: GameSession) -> Self {
        Self {
            session,
            started_at: Utc::now(),
        }
    }

    /// The engine behind the session.
    pub const fn engine(&self) -> &Arc<GameEngine> {
        self.session.engine()
    }
}
