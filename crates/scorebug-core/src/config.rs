//! Engine-level configuration.
//!
//! These structs are embedded in the server's JSON configuration file. Every
//! field has a default matching a regulation game so a missing section is
//! never an error.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// Clock lengths and tick cadence for the game engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Game clock length in seconds, used at start-up and on reset.
    #[serde(default = "default_game_clock_seconds")]
    pub game_clock_seconds: i64,

    /// Play clock length in seconds, used at start-up and on reset.
    #[serde(default = "default_play_clock_seconds")]
    pub play_clock_seconds: i64,

    /// Milliseconds between play clock ticks.
    #[serde(default = "default_play_clock_interval_ms")]
    pub play_clock_interval_ms: u64,

    /// Seconds removed from the play clock on each tick.
    #[serde(default = "default_play_clock_step")]
    pub play_clock_step: i64,

    /// Milliseconds between game clock ticks.
    #[serde(default = "default_game_clock_interval_ms")]
    pub game_clock_interval_ms: u64,
}

impl GameConfig {
    /// Interval between play clock ticks. A zero interval means the default.
    pub const fn play_clock_interval(&self) -> Duration {
        Duration::from_millis(nonzero_or(
            self.play_clock_interval_ms,
            default_play_clock_interval_ms(),
        ))
    }

    /// Interval between game clock ticks. A zero interval means the default.
    pub const fn game_clock_interval(&self) -> Duration {
        Duration::from_millis(nonzero_or(
            self.game_clock_interval_ms,
            default_game_clock_interval_ms(),
        ))
    }

    /// Replace zero tick intervals with the defaults, warning for each.
    ///
    /// Returns the number of fields replaced.
    pub fn normalize(&mut self) -> usize {
        let mut replaced = 0;
        if self.play_clock_interval_ms == 0 {
            warn!(
                default_ms = default_play_clock_interval_ms(),
                "playClockIntervalMs must be positive, using default"
            );
            self.play_clock_interval_ms = default_play_clock_interval_ms();
            replaced += 1;
        }
        if self.game_clock_interval_ms == 0 {
            warn!(
                default_ms = default_game_clock_interval_ms(),
                "gameClockIntervalMs must be positive, using default"
            );
            self.game_clock_interval_ms = default_game_clock_interval_ms();
            replaced += 1;
        }
        replaced
    }
}

const fn nonzero_or(value: u64, fallback: u64) -> u64 {
    if value == 0 { fallback } else { value }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_clock_seconds: default_game_clock_seconds(),
            play_clock_seconds: default_play_clock_seconds(),
            play_clock_interval_ms: default_play_clock_interval_ms(),
            play_clock_step: default_play_clock_step(),
            game_clock_interval_ms: default_game_clock_interval_ms(),
        }
    }
}

/// Overlay colour codes for the play clock.
///
/// OBS stores text colours as `0xAABBGGRR` integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColorConfig {
    /// Colour used while five or fewer seconds remain.
    #[serde(default = "default_alert_color", alias = "RED")]
    pub alert: u32,

    /// Colour used otherwise.
    #[serde(default = "default_normal_color", alias = "BRAND_BLUE")]
    pub normal: u32,
}

impl ColorConfig {
    /// Play clock values at or below this are rendered in the alert colour.
    pub const ALERT_THRESHOLD: i64 = 5;

    /// Pick the colour for a given play clock value.
    pub const fn for_play_clock(&self, play_clock: i64) -> u32 {
        if play_clock <= Self::ALERT_THRESHOLD {
            self.alert
        } else {
            self.normal
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            alert: default_alert_color(),
            normal: default_normal_color(),
        }
    }
}

const fn default_game_clock_seconds() -> i64 {
    12 * 60
}

const fn default_play_clock_seconds() -> i64 {
    40
}

const fn default_play_clock_interval_ms() -> u64 {
    100
}

const fn default_play_clock_step() -> i64 {
    1
}

const fn default_game_clock_interval_ms() -> u64 {
    1000
}

const fn default_alert_color() -> u32 {
    0xFF00_00FF
}

const fn default_normal_color() -> u32 {
    0xFFFF_0000
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_regulation_defaults() {
        let config: GameConfig = serde_json::from_str("{}").unwrap_or_default();
        assert_eq!(config.game_clock_seconds, 720);
        assert_eq!(config.play_clock_seconds, 40);
        assert_eq!(config.play_clock_interval(), Duration::from_millis(100));
        assert_eq!(config.game_clock_interval(), Duration::from_secs(1));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"playClockSeconds": 25}"#).unwrap_or_default();
        assert_eq!(config.play_clock_seconds, 25);
        assert_eq!(config.game_clock_seconds, 720);
    }

    #[test]
    fn zero_intervals_fall_back_to_defaults() {
        let mut config: GameConfig =
            serde_json::from_str(r#"{"playClockIntervalMs": 0, "gameClockIntervalMs": 0}"#)
                .unwrap();
        assert_eq!(config.play_clock_interval(), Duration::from_millis(100));
        assert_eq!(config.game_clock_interval(), Duration::from_secs(1));

        assert_eq!(config.normalize(), 2);
        assert_eq!(config.play_clock_interval_ms, 100);
        assert_eq!(config.game_clock_interval_ms, 1000);
        assert_eq!(config.normalize(), 0);
    }

    #[test]
    fn alert_threshold_is_inclusive() {
        let colors = ColorConfig::default();
        assert_eq!(colors.for_play_clock(6), colors.normal);
        assert_eq!(colors.for_play_clock(5), colors.alert);
        assert_eq!(colors.for_play_clock(0), colors.alert);
        assert_eq!(colors.for_play_clock(-3), colors.alert);
    }

    #[test]
    fn legacy_color_names_are_accepted() {
        let colors: ColorConfig =
            serde_json::from_str(r#"{"RED": 1, "BRAND_BLUE": 2}"#).unwrap_or_default();
        assert_eq!(colors.alert, 1);
        assert_eq!(colors.normal, 2);
    }
}
