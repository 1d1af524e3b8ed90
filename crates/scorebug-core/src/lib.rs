//! Game state engine for the Scorebug broadcast overlay.
//!
//! This crate owns the single authoritative record of an American-football
//! game and everything that mutates it:
//!
//! - [`state`] -- The canonical [`GameState`] record with its derived
//!   renderings (ordinals, clock display, timeout glyphs).
//! - [`engine`] -- [`GameEngine`], the serialized mutation path. Every
//!   operation validates, mutates, re-renders, and syncs exactly once.
//! - [`clock`] -- Play clock and game clock drivers that tick the engine on
//!   a fixed cadence.
//! - [`sync`] -- The overlay and remote capability traits and the
//!   [`SyncDispatcher`] that fans state out to both.
//! - [`feed`] -- The normalized snapshot delivered by a scoreboard feed.
//! - [`intent`] -- Typed operator intents and their text command grammar.
//! - [`session`] -- [`GameSession`], which routes intents to the engine and
//!   the clock drivers.
//! - [`config`] -- Engine defaults (clock lengths, tick cadence, colours).
//!
//! [`GameState`]: state::GameState
//! [`GameEngine`]: engine::GameEngine
//! [`SyncDispatcher`]: sync::SyncDispatcher
//! [`GameSession`]: session::GameSession

pub mod clock;
pub mod config;
pub mod engine;
pub mod feed;
pub mod intent;
pub mod session;
pub mod state;
pub mod sync;

pub use clock::{ClockDriver, ClockKind};
pub use config::{ColorConfig, GameConfig};
pub use engine::GameEngine;
pub use feed::FeedSnapshot;
pub use intent::{ClockCommand, Intent, IntentError};
pub use session::GameSession;
pub use state::{GameState, LastPlay, PlayType, Possession, Side, StateError, TeamPair};
pub use sync::{
    OverlayCall, OverlayItem, OverlayTarget, RemoteAction, RemoteTarget, SyncDispatcher,
    SyncError, SyncReport, TargetOutcome,
};
