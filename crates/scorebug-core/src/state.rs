//! The canonical game record.
//!
//! [`GameState`] holds every numeric source of truth for the game together
//! with its rendered forms. Fields are private: each setter updates the
//! source and re-renders the matching derived field in the same call, so a
//! rendering can never drift from the number it was computed from.
//!
//! # Design Principles
//!
//! - Derived fields (ordinals, clock display, timeout glyphs) are pure
//!   functions of their source. The renderers can be called any number of
//!   times without side effects beyond refreshing the derived field.
//! - Points and timeouts are clamped by construction: points saturate at
//!   zero, timeouts stay within `0..=3`.
//! - The game clock is stored in whole seconds. The `MM:SS` display is
//!   derived from it and never parsed back except when a scoreboard feed
//!   delivers only a display string.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::GameConfig;

/// Maximum number of timeouts a team holds per half.
pub const MAX_TIMEOUTS: u8 = 3;

/// Errors raised while interpreting raw values as game state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The text does not name a team.
    #[error("unknown side: {0}")]
    UnknownSide(String),

    /// The text does not name a scoring play.
    #[error("unknown play type: {0}")]
    UnknownPlayType(String),

    /// A clock display string is not in `MM:SS` form.
    #[error("invalid clock display {0:?}: expected MM:SS")]
    InvalidClock(String),
}

// ---------------------------------------------------------------------------
// Side, play type, possession
// ---------------------------------------------------------------------------

/// One of the two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The home team.
    Home,
    /// The away (guest) team.
    Away,
}

impl Side {
    /// Lowercase name used in JSON and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "away" | "guest" => Ok(Self::Away),
            _ => Err(StateError::UnknownSide(s.to_owned())),
        }
    }
}

/// A scoring play and its point value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayType {
    /// Six points.
    Touchdown,
    /// Three points.
    FieldGoal,
    /// Two points for the defence.
    Safety,
    /// One-point conversion after a touchdown.
    Pat,
    /// Two-point conversion after a touchdown.
    TwoPoint,
    /// No score. Used as the initial undo record.
    None,
}

impl PlayType {
    /// Points awarded for this play.
    pub const fn points(self) -> u32 {
        match self {
            Self::Touchdown => 6,
            Self::FieldGoal => 3,
            Self::Safety | Self::TwoPoint => 2,
            Self::Pat => 1,
            Self::None => 0,
        }
    }
}

impl FromStr for PlayType {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "touchdown" => Ok(Self::Touchdown),
            "fieldgoal" => Ok(Self::FieldGoal),
            "safety" => Ok(Self::Safety),
            "pat" => Ok(Self::Pat),
            "twopoint" => Ok(Self::TwoPoint),
            "none" => Ok(Self::None),
            _ => Err(StateError::UnknownPlayType(s.to_owned())),
        }
    }
}

/// Which team controls the ball, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Possession {
    /// Nobody, e.g. between plays.
    #[default]
    None,
    /// The home team.
    Home,
    /// The away team.
    Away,
}

impl Possession {
    /// Decode the scoreboard controller's `-1 | 0 | 1` encoding.
    ///
    /// Unknown codes are treated as no possession.
    pub const fn from_code(code: i8) -> Self {
        match code {
            0 => Self::Home,
            1 => Self::Away,
            _ => Self::None,
        }
    }
}

impl FromStr for Possession {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(Self::None);
        }
        match s.parse::<Side>()? {
            Side::Home => Ok(Self::Home),
            Side::Away => Ok(Self::Away),
        }
    }
}

/// A value held once per team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamPair<T> {
    /// Home team value.
    pub home: T,
    /// Away team value.
    pub away: T,
}

impl<T> TeamPair<T> {
    /// Build a pair from both values.
    pub const fn new(home: T, away: T) -> Self {
        Self { home, away }
    }

    /// Borrow the value for one side.
    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Mutably borrow the value for one side.
    pub const fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}

/// The single-level undo buffer for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPlay {
    /// The team that scored.
    pub side: Side,
    /// What they scored with.
    pub play_type: PlayType,
}

impl Default for LastPlay {
    fn default() -> Self {
        Self {
            side: Side::Home,
            play_type: PlayType::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pure renderers
// ---------------------------------------------------------------------------

/// Ordinal label for a quarter or down.
///
/// Only `1..=4` have labels; anything else renders blank.
pub const fn ordinal(n: u8) -> &'static str {
    match n {
        1 => "1st",
        2 => "2nd",
        3 => "3rd",
        4 => "4th",
        _ => "",
    }
}

/// One `_` mark per remaining timeout, separated by single spaces.
pub fn timeout_glyphs(remaining: u8) -> String {
    vec!["_"; usize::from(remaining)].join(" ")
}

/// Render whole seconds as `MM:SS`. Negative input renders as `00:00`.
pub fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse an `MM:SS` display string back into whole seconds.
pub fn parse_clock(display: &str) -> Result<i64, StateError> {
    let invalid = || StateError::InvalidClock(display.to_owned());
    let (minutes, seconds) = display.trim().split_once(':').ok_or_else(invalid)?;
    let minutes: i64 = minutes.parse().map_err(|_err| invalid())?;
    let seconds: i64 = seconds.parse().map_err(|_err| invalid())?;
    if minutes < 0 || !(0..60).contains(&seconds) {
        return Err(invalid());
    }
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(invalid)
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The authoritative game record.
///
/// Serializes to the JSON document echoed back on the control channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    points: TeamPair<u32>,
    game_clock_seconds: i64,
    game_clock: String,
    play_clock: i64,
    quarter: u8,
    quarter_ordinal: &'static str,
    down: u8,
    down_ordinal: &'static str,
    distance: String,
    ball_on: i32,
    possession: Possession,
    timeouts: TeamPair<u8>,
    timeout_glyphs: TeamPair<String>,
}

impl GameState {
    /// Build the kickoff state: zero scores, full timeouts, first quarter,
    /// first and ten at midfield, clocks at their configured lengths.
    pub fn new(config: &GameConfig) -> Self {
        let mut state = Self {
            points: TeamPair::new(0, 0),
            game_clock_seconds: config.game_clock_seconds.max(0),
            game_clock: String::new(),
            play_clock: config.play_clock_seconds,
            quarter: 1,
            quarter_ordinal: "",
            down: 1,
            down_ordinal: "",
            distance: String::from("10"),
            ball_on: 50,
            possession: Possession::None,
            timeouts: TeamPair::new(MAX_TIMEOUTS, MAX_TIMEOUTS),
            timeout_glyphs: TeamPair::default(),
        };
        state.render_game_clock();
        state.render_quarter_ordinal();
        state.render_down_ordinal();
        state.render_timeout_glyphs();
        state
    }

    // -----------------------------------------------------------------------
    // Renderers
    // -----------------------------------------------------------------------

    /// Refresh the quarter label from the quarter number.
    pub const fn render_quarter_ordinal(&mut self) {
        self.quarter_ordinal = ordinal(self.quarter);
    }

    /// Refresh the down label from the down number.
    pub const fn render_down_ordinal(&mut self) {
        self.down_ordinal = ordinal(self.down);
    }

    /// Refresh both teams' timeout glyphs from their counts.
    pub fn render_timeout_glyphs(&mut self) {
        self.timeout_glyphs = TeamPair::new(
            timeout_glyphs(self.timeouts.home),
            timeout_glyphs(self.timeouts.away),
        );
    }

    /// Refresh the `MM:SS` display from the remaining seconds.
    pub fn render_game_clock(&mut self) {
        self.game_clock = format_clock(self.game_clock_seconds);
    }

    // -----------------------------------------------------------------------
    // Points
    // -----------------------------------------------------------------------

    /// Current points for one side.
    pub const fn points(&self, side: Side) -> u32 {
        *self.points.get(side)
    }

    /// Add points to one side.
    pub const fn add_points(&mut self, side: Side, points: u32) {
        let current = self.points.get_mut(side);
        *current = current.saturating_add(points);
    }

    /// Remove points from one side, stopping at zero.
    pub const fn remove_points(&mut self, side: Side, points: u32) {
        let current = self.points.get_mut(side);
        *current = current.saturating_sub(points);
    }

    /// Overwrite one side's points.
    pub const fn set_points(&mut self, side: Side, points: u32) {
        *self.points.get_mut(side) = points;
    }

    // -----------------------------------------------------------------------
    // Clocks
    // -----------------------------------------------------------------------

    /// Remaining game clock in whole seconds.
    pub const fn game_clock_seconds(&self) -> i64 {
        self.game_clock_seconds
    }

    /// The `MM:SS` game clock display.
    pub fn game_clock_display(&self) -> &str {
        &self.game_clock
    }

    /// Set the remaining game clock. Negative values are floored at zero.
    pub fn set_game_clock_seconds(&mut self, seconds: i64) {
        self.game_clock_seconds = seconds.max(0);
        self.render_game_clock();
    }

    /// Set the game clock from an `MM:SS` display string.
    ///
    /// The state is left untouched when the string cannot be parsed.
    pub fn set_game_clock_display(&mut self, display: &str) -> Result<(), StateError> {
        let seconds = parse_clock(display)?;
        self.set_game_clock_seconds(seconds);
        Ok(())
    }

    /// Remove one second from the game clock.
    ///
    /// Returns `false` without changing anything when the clock is already
    /// at zero.
    pub fn tick_game_clock(&mut self) -> bool {
        if self.game_clock_seconds <= 0 {
            return false;
        }
        self.set_game_clock_seconds(self.game_clock_seconds.saturating_sub(1));
        true
    }

    /// Remaining play clock in seconds. May be negative.
    pub const fn play_clock(&self) -> i64 {
        self.play_clock
    }

    /// Overwrite the play clock.
    pub const fn set_play_clock(&mut self, seconds: i64) {
        self.play_clock = seconds;
    }

    /// Remove `step` seconds from the play clock. No floor is applied.
    pub const fn tick_play_clock(&mut self, step: i64) {
        self.play_clock = self.play_clock.saturating_sub(step);
    }

    // -----------------------------------------------------------------------
    // Quarter, down, distance
    // -----------------------------------------------------------------------

    /// Current quarter, `1..=4`.
    pub const fn quarter(&self) -> u8 {
        self.quarter
    }

    /// Label for the current quarter.
    pub const fn quarter_ordinal(&self) -> &'static str {
        self.quarter_ordinal
    }

    /// Move to the next quarter, wrapping from the 4th back to the 1st.
    pub const fn advance_quarter(&mut self) {
        self.quarter = if self.quarter >= 4 { 1 } else { self.quarter + 1 };
        self.render_quarter_ordinal();
    }

    /// Set the quarter, clamped into `1..=4`.
    pub fn set_quarter(&mut self, quarter: u8) {
        self.quarter = quarter.clamp(1, 4);
        self.render_quarter_ordinal();
    }

    /// Current down number. Not range-checked.
    pub const fn down(&self) -> u8 {
        self.down
    }

    /// Label for the current down; blank outside `1..=4`.
    pub const fn down_ordinal(&self) -> &'static str {
        self.down_ordinal
    }

    /// Set the down. Values outside `1..=4` are kept as-is and render blank.
    pub const fn set_down(&mut self, down: u8) {
        self.down = down;
        self.render_down_ordinal();
    }

    /// Yards to go, as entered.
    pub fn distance(&self) -> &str {
        &self.distance
    }

    /// Replace the distance text verbatim.
    pub fn set_distance(&mut self, distance: impl Into<String>) {
        self.distance = distance.into();
    }

    /// Composite `"<down> & <distance>"` text for the overlay.
    pub fn down_and_distance(&self) -> String {
        format!("{} & {}", self.down_ordinal, self.distance)
    }

    // -----------------------------------------------------------------------
    // Field position and possession
    // -----------------------------------------------------------------------

    /// Signed yard line the ball rests on.
    pub const fn ball_on(&self) -> i32 {
        self.ball_on
    }

    /// Set the ball position.
    pub const fn set_ball_on(&mut self, ball_on: i32) {
        self.ball_on = ball_on;
    }

    /// Which side of the field the line of scrimmage is on.
    ///
    /// A negative yard line belongs to the home team; zero and positive
    /// belong to the away team.
    pub const fn los_side(&self) -> Side {
        if self.ball_on < 0 { Side::Home } else { Side::Away }
    }

    /// Current possession.
    pub const fn possession(&self) -> Possession {
        self.possession
    }

    /// Set the possession.
    pub const fn set_possession(&mut self, possession: Possession) {
        self.possession = possession;
    }

    // -----------------------------------------------------------------------
    // Timeouts
    // -----------------------------------------------------------------------

    /// Remaining timeouts for one side.
    pub const fn timeouts(&self, side: Side) -> u8 {
        *self.timeouts.get(side)
    }

    /// Rendered timeout glyphs for one side.
    pub fn timeout_glyphs(&self, side: Side) -> &str {
        self.timeout_glyphs.get(side)
    }

    /// Set one side's remaining timeouts, clamped into `0..=3`.
    pub fn set_timeouts(&mut self, side: Side, remaining: u8) {
        *self.timeouts.get_mut(side) = remaining.min(MAX_TIMEOUTS);
        self.render_timeout_glyphs();
    }

    /// Shift one side's remaining timeouts by `delta`, clamped into `0..=3`.
    pub fn adjust_timeouts(&mut self, side: Side, delta: i8) {
        let current = self.timeouts(side);
        let adjusted = current.saturating_add_signed(delta).min(MAX_TIMEOUTS);
        self.set_timeouts(side, adjusted);
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}
