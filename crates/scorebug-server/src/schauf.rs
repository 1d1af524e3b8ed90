//! Decoder for the Schauf S-MOTION scoreboard controller.
//!
//! The controller sends one JSON document per UDP packet:
//!
//! ```json
//! {
//!   "home": { "points": 14, "timeouts": 1 },
//!   "away": { "points": 7, "timeouts": 0 },
//!   "quarter": 2, "down": 3, "distance": 4,
//!   "ball_on": -35, "possession": 0,
//!   "clock": { "game": "08:12", "play": 25, "state": 1 }
//! }
//! ```
//!
//! `timeouts` counts timeouts *used*; the engine stores timeouts remaining.

use scorebug_core::state::MAX_TIMEOUTS;
use scorebug_core::{FeedSnapshot, Possession, TeamPair};
use serde::Deserialize;

/// One team's block of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SchaufTeam {
    /// Points scored.
    pub points: u32,
    /// Timeouts used.
    #[serde(default)]
    pub timeouts: u8,
}

/// Clock block of a packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchaufClock {
    /// Game clock as displayed (`MM:SS`).
    pub game: String,
    /// Play clock seconds.
    pub play: i64,
    /// Whether the controller's game clock is running.
    #[serde(default)]
    pub state: u8,
}

/// Distance as sent by the controller: usually yards, sometimes text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SchaufDistance {
    /// Yards to go.
    Yards(i64),
    /// Free text, e.g. `Goal`.
    Text(String),
}

impl std::fmt::Display for SchaufDistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yards(yards) => write!(f, "{yards}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A decoded Schauf packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchaufPacket {
    /// Home team.
    pub home: SchaufTeam,
    /// Away team.
    pub away: SchaufTeam,
    /// Quarter number.
    pub quarter: u8,
    /// Down number.
    pub down: u8,
    /// Yards to go.
    pub distance: SchaufDistance,
    /// Signed yard line.
    pub ball_on: i32,
    /// `-1` none, `0` home, `1` away.
    pub possession: i8,
    /// Clocks.
    pub clock: SchaufClock,
}

impl SchaufPacket {
    /// Parse a raw packet.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the packet is not a valid Schauf document.
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Convert to the engine's feed snapshot.
    pub fn into_snapshot(self) -> FeedSnapshot {
        FeedSnapshot {
            points: TeamPair::new(self.home.points, self.away.points),
            timeouts: TeamPair::new(
                remaining_timeouts(self.home.timeouts),
                remaining_timeouts(self.away.timeouts),
            ),
            game_clock: self.clock.game,
            play_clock: self.clock.play,
            quarter: self.quarter,
            down: self.down,
            distance: self.distance.to_string(),
            ball_on: self.ball_on,
            possession: Possession::from_code(self.possession),
        }
    }
}

/// Timeouts remaining given timeouts used.
pub const fn remaining_timeouts(used: u8) -> u8 {
    MAX_TIMEOUTS.saturating_sub(used)
}
