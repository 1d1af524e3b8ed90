//! Remote scoreboard transport (statsnscore control API).
//!
//! Every field is its own endpoint: `POST <base>/<action>` with the value as
//! a plain-text body. The game token travels in the `Token` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use scorebug_core::{RemoteAction, RemoteTarget, SyncError};
use serde::Deserialize;
use tracing::debug;

use crate::error::RemoteError;

/// Header carrying the game token.
pub const TOKEN_HEADER: &str = "token";

/// Settings for the remote scoreboard API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    /// Game token. The remote target is not created without one.
    #[serde(default, alias = "gameToken")]
    pub token: Option<String>,

    /// Base URL of the scoreboard control API.
    #[serde(default = "default_scoreboard_api_url")]
    pub scoreboard_api_url: String,

    /// Upper bound for one request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl RemoteConfig {
    /// The per-request timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            token: None,
            scoreboard_api_url: default_scoreboard_api_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_scoreboard_api_url() -> String {
    String::from("https://statsnscore.online/scoreboard/control")
}

const fn default_request_timeout_ms() -> u64 {
    3000
}

/// HTTP client for the remote scoreboard.
#[derive(Debug, Clone)]
pub struct StatsnScoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl StatsnScoreClient {
    /// Build a client for the scoreboard API.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::MissingToken`] if no token is configured,
    /// [`RemoteError::InvalidToken`] if the token cannot be a header value,
    /// or [`RemoteError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let token = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(RemoteError::MissingToken)?;

        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(token).map_err(|_err| RemoteError::InvalidToken)?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(TOKEN_HEADER), value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.scoreboard_api_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The URL an action is posted to.
    pub fn endpoint(&self, action: RemoteAction) -> String {
        format!("{}/{}", self.base_url, action.action_name())
    }

    /// Post one value.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Http`] if the request fails or times out, or
    /// [`RemoteError::Status`] on a non-success response.
    pub async fn post(&self, action: RemoteAction, value: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .post(self.endpoint(action))
            .header(CONTENT_TYPE, "text/plain")
            .body(value.to_owned())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                action: action.action_name(),
                status: status.as_u16(),
            });
        }
        debug!(action = action.action_name(), value, "remote field set");
        Ok(())
    }
}

#[async_trait]
impl RemoteTarget for StatsnScoreClient {
    async fn set_field(&self, action: RemoteAction, value: &str) -> Result<(), SyncError> {
        Ok(self.post(action, value).await?)
    }
}
