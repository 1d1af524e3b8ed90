//! Input adapters and process wiring for the Scorebug overlay engine.
//!
//! - [`feed`] -- UDP listener for the scoreboard controller, with the
//!   [`schauf`] vendor decoder.
//! - [`ws`], [`handlers`], [`router`], [`server`] -- the axum control
//!   server: WebSocket text commands plus a small JSON API.
//! - [`config`] -- the JSON start-up configuration.
//! - [`error`] -- Error types.
//!
//! The binary picks one input adapter by [`ListenMode`]; both drive the
//! same [`GameSession`](scorebug_core::GameSession).

pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod router;
pub mod schauf;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{AppConfig, ConfigError, ListenMode};
pub use error::{AppError, ControlError, FeedError};
pub use feed::{FeedPlugin, bind_feed, run_feed_listener};
pub use router::build_router;
pub use server::{ServerError, bind_control, serve_control};
pub use state::AppState;
