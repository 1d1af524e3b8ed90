//! Overlay transport over the OBS websocket v5 protocol.
//!
//! [`ObsConnector`] holds at most one websocket to OBS and opens it lazily
//! on the first call. A transport failure drops the socket so the next call
//! reconnects. Every request is bounded by the configured timeout.
//!
//! # Frames
//!
//! | Op | Direction | Meaning |
//! |----|-----------|---------|
//! | 0 | OBS -> us | `Hello`, optionally with an auth challenge |
//! | 1 | us -> OBS | `Identify` |
//! | 2 | OBS -> us | `Identified` |
//! | 5 | OBS -> us | Event (ignored) |
//! | 6 | us -> OBS | Request |
//! | 7 | OBS -> us | Request response |

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::{SinkExt, StreamExt};
use scorebug_core::{OverlayItem, OverlayTarget, SyncError};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ObsError;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// RPC version announced in `Identify`.
pub const RPC_VERSION: u64 = 1;

/// Protocol opcodes.
pub mod op {
    /// Server greeting.
    pub const HELLO: u64 = 0;
    /// Client identification.
    pub const IDENTIFY: u64 = 1;
    /// Identification accepted.
    pub const IDENTIFIED: u64 = 2;
    /// Request.
    pub const REQUEST: u64 = 6;
    /// Request response.
    pub const REQUEST_RESPONSE: u64 = 7;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for OBS.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObsConfig {
    /// OBS host.
    #[serde(default = "default_host")]
    pub host: String,

    /// OBS websocket port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether the overlay is rendered at all.
    #[serde(default = "default_enable")]
    pub enable: bool,

    /// Websocket server password, if OBS requires one.
    #[serde(default)]
    pub password: Option<String>,

    /// Scene holding the score bug sources.
    #[serde(default = "default_scene")]
    pub scene: String,

    /// Upper bound for one request, including a reconnect.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ObsConfig {
    /// The websocket URL.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }

    /// The per-request timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable: default_enable(),
            password: None,
            scene: default_scene(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_host() -> String {
    String::from("127.0.0.1")
}

const fn default_port() -> u16 {
    4455
}

const fn default_enable() -> bool {
    true
}

fn default_scene() -> String {
    String::from("[OVERLAY] ScoreBug")
}

const fn default_request_timeout_ms() -> u64 {
    2000
}

// ---------------------------------------------------------------------------
// Frame helpers
// ---------------------------------------------------------------------------

/// The opcode of a frame, if present.
pub fn opcode(frame: &Value) -> Option<u64> {
    frame.get("op").and_then(Value::as_u64)
}

/// Build a request frame.
pub fn request_frame(request_type: &str, request_id: &str, request_data: Value) -> Value {
    json!({
        "op": op::REQUEST,
        "d": {
            "requestType": request_type,
            "requestId": request_id,
            "requestData": request_data,
        }
    })
}

/// Answer to an auth challenge:
/// `base64(sha256(base64(sha256(password + salt)) + challenge))`.
pub fn auth_response(password: &str, salt: &str, challenge: &str) -> String {
    let secret = BASE64.encode(Sha256::digest(format!("{password}{salt}")));
    BASE64.encode(Sha256::digest(format!("{secret}{challenge}")))
}

/// Build the `Identify` frame answering `hello`.
///
/// # Errors
///
/// Returns [`ObsError::Handshake`] if `hello` is not a `Hello` frame, or if
/// OBS asks for authentication and no password is configured.
pub fn identify_frame(hello: &Value, password: Option<&str>) -> Result<Value, ObsError> {
    if opcode(hello) != Some(op::HELLO) {
        return Err(ObsError::Handshake(String::from("expected Hello")));
    }
    let Some(auth) = hello.get("d").and_then(|d| d.get("authentication")) else {
        return Ok(json!({ "op": op::IDENTIFY, "d": { "rpcVersion": RPC_VERSION } }));
    };

    let password = password.ok_or_else(|| {
        ObsError::Handshake(String::from("OBS requires a password but none is configured"))
    })?;
    let field = |name: &str| {
        auth.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| ObsError::Handshake(format!("auth challenge is missing {name}")))
    };
    let authentication = auth_response(password, field("salt")?, field("challenge")?);

    Ok(json!({
        "op": op::IDENTIFY,
        "d": { "rpcVersion": RPC_VERSION, "authentication": authentication }
    }))
}

/// Match a frame against a pending request.
///
/// Returns `None` for frames that are not the response to `request_id`
/// (events, other responses). Otherwise returns the response data, or the
/// failure OBS reported.
pub fn parse_response(frame: &Value, request_id: &str) -> Option<Result<Value, ObsError>> {
    if opcode(frame) != Some(op::REQUEST_RESPONSE) {
        return None;
    }
    let d = frame.get("d")?;
    if d.get("requestId").and_then(Value::as_str) != Some(request_id) {
        return None;
    }

    let status = d.get("requestStatus");
    let succeeded = status
        .and_then(|s| s.get("result"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if succeeded {
        return Some(Ok(d.get("responseData").cloned().unwrap_or(Value::Null)));
    }

    let text = |v: Option<&Value>| v.and_then(Value::as_str).unwrap_or_default().to_owned();
    Some(Err(ObsError::Request {
        request_type: text(d.get("requestType")),
        code: status
            .and_then(|s| s.get("code"))
            .and_then(Value::as_i64)
            .unwrap_or_default(),
        comment: text(status.and_then(|s| s.get("comment"))),
    }))
}

fn ws_error(e: &tokio_tungstenite::tungstenite::Error) -> ObsError {
    ObsError::WebSocket(e.to_string())
}

async fn next_frame(socket: &mut Socket) -> Result<Value, ObsError> {
    while let Some(message) = socket.next().await {
        let message = message.map_err(|e| ws_error(&e))?;
        if let Message::Close(_) = message {
            return Err(ObsError::Closed);
        }
        if message.is_text() {
            let text = message.to_text().map_err(|e| ws_error(&e))?;
            return Ok(serde_json::from_str(text)?);
        }
    }
    Err(ObsError::Closed)
}

async fn send_frame(socket: &mut Socket, frame: &Value) -> Result<(), ObsError> {
    socket
        .send(Message::text(frame.to_string()))
        .await
        .map_err(|e| ws_error(&e))
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// Overlay target backed by an OBS websocket connection.
pub struct ObsConnector {
    config: ObsConfig,
    socket: Mutex<Option<Socket>>,
    scene_items: Mutex<HashMap<String, i64>>,
}

impl ObsConnector {
    /// Create a connector. No connection is made until the first request.
    pub fn new(config: ObsConfig) -> Self {
        Self {
            config,
            socket: Mutex::new(None),
            scene_items: Mutex::new(HashMap::new()),
        }
    }

    /// The connection settings.
    pub const fn config(&self) -> &ObsConfig {
        &self.config
    }

    /// Whether a websocket is currently open.
    pub async fn is_connected(&self) -> bool {
        self.socket.lock().await.is_some()
    }

    /// Open the websocket now instead of on the first request.
    ///
    /// # Errors
    ///
    /// Returns the connection or handshake failure.
    pub async fn connect(&self) -> Result<(), ObsError> {
        let mut slot = self.socket.lock().await;
        if slot.is_none() {
            let timeout = self.config.request_timeout();
            let socket = tokio::time::timeout(timeout, self.open())
                .await
                .unwrap_or_else(|_| Err(ObsError::Timeout(self.config.request_timeout_ms)))?;
            *slot = Some(socket);
        }
        Ok(())
    }

    async fn open(&self) -> Result<Socket, ObsError> {
        let url = self.config.url();
        let (mut socket, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ws_error(&e))?;

        let hello = next_frame(&mut socket).await?;
        let identify = identify_frame(&hello, self.config.password.as_deref())?;
        send_frame(&mut socket, &identify).await?;

        let identified = next_frame(&mut socket).await?;
        if opcode(&identified) != Some(op::IDENTIFIED) {
            return Err(ObsError::Handshake(String::from("expected Identified")));
        }

        info!(url = %url, "connected to OBS");
        Ok(socket)
    }

    /// Send one request and wait for its response data.
    ///
    /// Connects first if needed. A fatal error drops the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ObsError::Timeout`] if no response arrives in time,
    /// [`ObsError::Request`] if OBS rejects the request, or the transport
    /// failure.
    pub async fn request(&self, request_type: &str, request_data: Value) -> Result<Value, ObsError> {
        let mut slot = self.socket.lock().await;
        let timeout = self.config.request_timeout();
        let result = tokio::time::timeout(
            timeout,
            self.exchange(&mut slot, request_type, request_data),
        )
        .await
        .unwrap_or_else(|_| Err(ObsError::Timeout(self.config.request_timeout_ms)));

        if let Err(e) = &result {
            if e.is_fatal() && slot.take().is_some() {
                warn!(error = %e, "dropping OBS connection");
            }
        }
        result
    }

    async fn exchange(
        &self,
        slot: &mut Option<Socket>,
        request_type: &str,
        request_data: Value,
    ) -> Result<Value, ObsError> {
        if slot.is_none() {
            *slot = Some(self.open().await?);
        }
        let Some(socket) = slot.as_mut() else {
            return Err(ObsError::Closed);
        };

        let request_id = Uuid::new_v4().to_string();
        send_frame(socket, &request_frame(request_type, &request_id, request_data)).await?;
        loop {
            let frame = next_frame(socket).await?;
            if let Some(result) = parse_response(&frame, &request_id) {
                return result;
            }
        }
    }

    async fn set_input_settings(&self, item: OverlayItem, settings: Value) -> Result<(), ObsError> {
        self.request(
            "SetInputSettings",
            json!({ "inputName": item.source_name(), "inputSettings": settings }),
        )
        .await?;
        Ok(())
    }

    /// Resolve the scene item id of a source, caching the answer.
    async fn scene_item_id(&self, source: &str) -> Result<i64, ObsError> {
        if let Some(id) = self.scene_items.lock().await.get(source) {
            return Ok(*id);
        }

        let data = self
            .request(
                "GetSceneItemId",
                json!({ "sceneName": self.config.scene, "sourceName": source }),
            )
            .await?;
        let id = data
            .get("sceneItemId")
            .and_then(Value::as_i64)
            .ok_or_else(|| ObsError::SceneItemNotFound(source.to_owned()))?;

        debug!(source, id, "cached scene item");
        self.scene_items.lock().await.insert(source.to_owned(), id);
        Ok(id)
    }

    async fn set_enabled(&self, item: OverlayItem, enabled: bool) -> Result<(), ObsError> {
        let source = item.source_name();
        let id = self.scene_item_id(source).await?;
        let result = self
            .request(
                "SetSceneItemEnabled",
                json!({
                    "sceneName": self.config.scene,
                    "sceneItemId": id,
                    "sceneItemEnabled": enabled,
                }),
            )
            .await;
        if let Err(ObsError::Request { .. }) = &result {
            // The scene may have been rebuilt; look the id up again next time.
            self.scene_items.lock().await.remove(source);
        }
        result.map(|_| ())
    }
}

#[async_trait]
impl OverlayTarget for ObsConnector {
    async fn set_text(&self, item: OverlayItem, value: &str) -> Result<(), SyncError> {
        Ok(self.set_input_settings(item, json!({ "text": value })).await?)
    }

    async fn set_color(&self, item: OverlayItem, color: u32) -> Result<(), SyncError> {
        Ok(self.set_input_settings(item, json!({ "color": color })).await?)
    }

    async fn show(&self, item: OverlayItem) -> Result<(), SyncError> {
        Ok(self.set_enabled(item, true).await?)
    }

    async fn hide(&self, item: OverlayItem) -> Result<(), SyncError> {
        Ok(self.set_enabled(item, false).await?)
    }
}

impl fmt::Debug for ObsConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObsConnector")
            .field("url", &self.config.url())
            .field("scene", &self.config.scene)
            .finish_non_exhaustive()
    }
}
