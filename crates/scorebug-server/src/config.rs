//! Start-up configuration for the Scorebug server.
//!
//! The configuration lives in a JSON file (`config/config.json` unless
//! overridden). Every field has a default, so a partial file is fine. A
//! missing or malformed file is reported to the caller, which falls back to
//! [`AppConfig::default`].
//!
//! # Environment overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SCOREBUG_TOKEN` | `statsnscore.token` |
//! | `SCOREBUG_LISTEN_PORT` | `listenPort` |
//! | `SCOREBUG_OBS_HOST` | `obs.host` |

use std::path::{Path, PathBuf};

use scorebug_core::{ColorConfig, GameConfig};
use scorebug_sync::{ObsConfig, RemoteConfig};
use serde::Deserialize;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "SCOREBUG_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse JSON content.
    #[error("failed to parse config JSON: {source}")]
    Json {
        /// The underlying JSON parse error.
        #[from]
        source: serde_json::Error,
    },
}

/// Which input adapter drives the game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ListenMode {
    /// Scoreboard controller feed over UDP.
    #[default]
    #[serde(rename = "UDP", alias = "udp")]
    Udp,
    /// Manual control over WebSocket.
    #[serde(rename = "WS", alias = "ws")]
    Ws,
}

impl std::fmt::Display for ListenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Udp => f.write_str("UDP"),
            Self::Ws => f.write_str("WS"),
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Input adapter to run.
    #[serde(default)]
    pub mode: ListenMode,

    /// UDP port (feed mode) or TCP port (control mode).
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Raise the default log level to `debug`.
    #[serde(default)]
    pub debug: bool,

    /// Scoreboard vendor decoder for the UDP feed.
    #[serde(default = "default_plugin_name")]
    pub plugin_name: String,

    /// OBS overlay connection.
    #[serde(default)]
    pub obs: ObsConfig,

    /// Play clock colours.
    #[serde(default)]
    pub colors: ColorConfig,

    /// Remote scoreboard API.
    #[serde(default)]
    pub statsnscore: RemoteConfig,

    /// Clock lengths and cadence.
    #[serde(default)]
    pub game: GameConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: ListenMode::default(),
            listen_port: default_listen_port(),
            debug: false,
            plugin_name: default_plugin_name(),
            obs: ObsConfig::default(),
            colors: ColorConfig::default(),
            statsnscore: RemoteConfig::default(),
            game: GameConfig::default(),
        }
    }
}

const fn default_listen_port() -> u16 {
    8999
}

fn default_plugin_name() -> String {
    String::from("schauf")
}

impl AppConfig {
    /// Load configuration from a JSON file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Json`] if the JSON is invalid.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a JSON string. No overrides are applied.
    ///
    /// Zero clock intervals are replaced by their defaults with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the string is not valid JSON.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.game.normalize();
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Override fields from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override fields from `lookup`. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("SCOREBUG_TOKEN") {
            self.statsnscore.token = Some(token);
        }
        if let Some(port) = lookup("SCOREBUG_LISTEN_PORT").and_then(|v| v.parse().ok()) {
            self.listen_port = port;
        }
        if let Some(host) = lookup("SCOREBUG_OBS_HOST") {
            self.obs.host = host;
        }
    }

    /// Default directive for the log filter when `RUST_LOG` is unset.
    pub const fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

/// Resolve the configuration file path: the first CLI argument, then
/// `SCOREBUG_CONFIG`, then [`DEFAULT_CONFIG_PATH`].
pub fn config_path(cli_arg: Option<String>, env_value: Option<String>) -> PathBuf {
    cli_arg
        .or(env_value)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}
