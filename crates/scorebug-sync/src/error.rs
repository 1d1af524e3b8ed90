//! Error types for the sync transports.
//!
//! Both enums convert into [`SyncError`] so the dispatcher can log them
//! without knowing which transport produced them.

use scorebug_core::SyncError;

/// Errors from the OBS websocket connection.
#[derive(Debug, thiserror::Error)]
pub enum ObsError {
    /// The websocket could not be opened, read, or written.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// OBS closed the connection.
    #[error("connection closed by OBS")]
    Closed,

    /// The Hello/Identify exchange did not complete.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// No response arrived within the request timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// A frame was not valid JSON.
    #[error("invalid frame: {0}")]
    Frame(#[from] serde_json::Error),

    /// OBS answered a request with a failure status.
    #[error("{request_type} failed with code {code}: {comment}")]
    Request {
        /// The OBS request type.
        request_type: String,
        /// OBS status code.
        code: i64,
        /// OBS status comment, if any.
        comment: String,
    },

    /// The overlay scene has no item for the source.
    #[error("no scene item for source: {0}")]
    SceneItemNotFound(String),
}

impl ObsError {
    /// Whether the connection should be dropped and re-established.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Request { .. } | Self::SceneItemNotFound(_))
    }
}

impl From<ObsError> for SyncError {
    fn from(e: ObsError) -> Self {
        Self::Overlay(e.to_string())
    }
}

/// Errors from the remote scoreboard API.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// No API token is configured.
    #[error("scoreboard API token not configured")]
    MissingToken,

    /// The token cannot be sent as a header value.
    #[error("scoreboard API token is not a valid header value")]
    InvalidToken,

    /// The request could not be sent or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{action} returned HTTP {status}")]
    Status {
        /// The action endpoint.
        action: &'static str,
        /// HTTP status code.
        status: u16,
    },
}

impl From<RemoteError> for SyncError {
    fn from(e: RemoteError) -> Self {
        Self::Remote(e.to_string())
    }
}
