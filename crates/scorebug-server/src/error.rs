//! Error types for the Scorebug server.
//!
//! [`ControlError`] covers a rejected operator command and converts into an
//! HTTP response. [`FeedError`] covers a packet that could not be decoded.
//! [`AppError`] wraps the start-up and run-time failures of the binary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scorebug_core::IntentError;

use crate::config::ConfigError;
use crate::server::ServerError;

/// Errors returned to a control client.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The command was not understood.
    #[error(transparent)]
    Intent(#[from] IntentError),

    /// The game state could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Intent(_) => StatusCode::BAD_REQUEST,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Errors from the scoreboard feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The UDP socket could not be bound.
    #[error("failed to bind feed socket on port {port}: {source}")]
    Bind {
        /// The configured port.
        port: u16,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A packet was not a valid vendor document.
    #[error("malformed packet: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Top-level errors of the server binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The control server failed.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// The feed listener failed.
    #[error(transparent)]
    Feed(#[from] FeedError),
}
