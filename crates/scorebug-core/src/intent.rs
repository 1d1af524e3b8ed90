//! Operator intents and the text command grammar.
//!
//! The control channel sends one command per message, words separated by
//! whitespace. Keywords and side names are case-insensitive.
//!
//! | Command | Intent |
//! |---------|--------|
//! | `TOUCHDOWN <side>` (also `FIELDGOAL`, `SAFETY`, `PAT`, `TWOPOINT`) | [`Intent::Score`] |
//! | `UNDO` | [`Intent::UndoScore`] |
//! | `QUARTER` | [`Intent::AdvanceQuarter`] |
//! | `DOWN <n>` | [`Intent::SetDown`] |
//! | `DISTANCE <text>` | [`Intent::SetDistance`] |
//! | `TIMEOUT <side>` | [`Intent::Timeout`] |
//! | `TIMEOUT UNDO` | [`Intent::UndoTimeout`] |
//! | `GAMECLOCK START\|PAUSE\|RESET` | [`Intent::GameClock`] |
//! | `PLAYCLOCK START\|PAUSE\|RESET` | [`Intent::PlayClock`] |
//! | `POSSESSION HOME\|AWAY\|NONE` | [`Intent::Possession`] |
//! | `BALLON <n>` | [`Intent::BallOn`] |
//! | `STATE` | [`Intent::State`] |

use std::str::FromStr;

use crate::state::{PlayType, Possession, Side};

/// Errors produced when a command cannot be turned into an intent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntentError {
    /// The message was empty or only whitespace.
    #[error("empty command")]
    Empty,

    /// The first word is not a known command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A command that needs an argument was sent without one.
    #[error("{command} requires an argument")]
    MissingArgument {
        /// The command keyword.
        command: &'static str,
    },

    /// The argument could not be interpreted.
    #[error("invalid argument for {command}: {value}")]
    InvalidArgument {
        /// The command keyword.
        command: &'static str,
        /// The offending argument.
        value: String,
    },
}

/// Start, pause, or reset a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockCommand {
    /// Begin ticking.
    Start,
    /// Stop ticking, keeping the value.
    Pause,
    /// Restore the configured length.
    Reset,
}

/// A typed operator request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Award points to a side.
    Score {
        /// Scoring team.
        side: Side,
        /// Scoring play.
        play_type: PlayType,
    },
    /// Revert the last scoring play.
    UndoScore,
    /// Advance to the next quarter.
    AdvanceQuarter,
    /// Set the down.
    SetDown(u8),
    /// Set the distance text.
    SetDistance(String),
    /// Charge a timeout to a side.
    Timeout(Side),
    /// Give back the last charged timeout.
    UndoTimeout,
    /// Control the game clock.
    GameClock(ClockCommand),
    /// Control the play clock.
    PlayClock(ClockCommand),
    /// Set the possession indicator.
    Possession(Possession),
    /// Set the ball position.
    BallOn(i32),
    /// Report the state without changing it.
    State,
}

impl FromStr for Intent {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(k, r)| (k, r.trim()));
        if keyword.is_empty() {
            return Err(IntentError::Empty);
        }
        let arg = rest.split_whitespace().next();

        match keyword.to_ascii_uppercase().as_str() {
            "TOUCHDOWN" => score("TOUCHDOWN", PlayType::Touchdown, arg),
            "FIELDGOAL" => score("FIELDGOAL", PlayType::FieldGoal, arg),
            "SAFETY" => score("SAFETY", PlayType::Safety, arg),
            "PAT" => score("PAT", PlayType::Pat, arg),
            "TWOPOINT" => score("TWOPOINT", PlayType::TwoPoint, arg),
            "UNDO" => Ok(Self::UndoScore),
            "QUARTER" => Ok(Self::AdvanceQuarter),
            "DOWN" => parse_arg("DOWN", arg).map(Self::SetDown),
            "DISTANCE" => {
                if rest.is_empty() {
                    Err(IntentError::MissingArgument {
                        command: "DISTANCE",
                    })
                } else {
                    Ok(Self::SetDistance(rest.to_owned()))
                }
            }
            "TIMEOUT" => match arg {
                Some(a) if a.eq_ignore_ascii_case("UNDO") => Ok(Self::UndoTimeout),
                _ => parse_arg("TIMEOUT", arg).map(Self::Timeout),
            },
            "GAMECLOCK" => clock_command("GAMECLOCK", arg).map(Self::GameClock),
            "PLAYCLOCK" => clock_command("PLAYCLOCK", arg).map(Self::PlayClock),
            "POSSESSION" => parse_arg("POSSESSION", arg).map(Self::Possession),
            "BALLON" => parse_arg("BALLON", arg).map(Self::BallOn),
            "STATE" => Ok(Self::State),
            _ => Err(IntentError::UnknownCommand(keyword.to_owned())),
        }
    }
}

fn parse_arg<T: FromStr>(command: &'static str, arg: Option<&str>) -> Result<T, IntentError> {
    let value = arg.ok_or(IntentError::MissingArgument { command })?;
    value.parse().map_err(|_err| IntentError::InvalidArgument {
        command,
        value: value.to_owned(),
    })
}

fn score(
    command: &'static str,
    play_type: PlayType,
    arg: Option<&str>,
) -> Result<Intent, IntentError> {
    let side = parse_arg(command, arg)?;
    Ok(Intent::Score { side, play_type })
}

fn clock_command(command: &'static str, arg: Option<&str>) -> Result<ClockCommand, IntentError> {
    let value = arg.ok_or(IntentError::MissingArgument { command })?;
    match value.to_ascii_uppercase().as_str() {
        "START" => Ok(ClockCommand::Start),
        "PAUSE" => Ok(ClockCommand::Pause),
        "RESET" => Ok(ClockCommand::Reset),
        _ => Err(IntentError::InvalidArgument {
            command,
            value: value.to_owned(),
        }),
    }
}
