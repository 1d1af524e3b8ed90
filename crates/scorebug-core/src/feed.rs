//! Normalized scoreboard feed snapshot.
//!
//! Vendor decoders turn their wire format into a [`FeedSnapshot`]; the
//! engine replaces the matching fields of the game state in one step and
//! syncs once. Timeouts arrive already converted to the number remaining.

use crate::state::{Possession, TeamPair};

/// Full replacement of the feed-controlled part of the game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// Points per side.
    pub points: TeamPair<u32>,
    /// Timeouts remaining per side.
    pub timeouts: TeamPair<u8>,
    /// Game clock as displayed by the controller (`MM:SS`).
    pub game_clock: String,
    /// Play clock seconds.
    pub play_clock: i64,
    /// Quarter number.
    pub quarter: u8,
    /// Down number.
    pub down: u8,
    /// Yards to go.
    pub distance: String,
    /// Signed yard line.
    pub ball_on: i32,
    /// Team with the ball.
    pub possession: Possession,
}
