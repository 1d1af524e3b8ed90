//! UDP scoreboard feed.
//!
//! The listener receives one vendor packet per datagram, decodes it with the
//! configured [`FeedPlugin`], and hands the snapshot to the engine. Bad
//! packets are logged and dropped; the listener keeps running.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use scorebug_core::{FeedSnapshot, GameEngine};
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::error::FeedError;
use crate::schauf::SchaufPacket;

/// Largest datagram accepted.
const MAX_PACKET: usize = 64 * 1024;

/// Scoreboard vendor decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPlugin {
    /// Schauf S-MOTION.
    Schauf,
}

impl FeedPlugin {
    /// Pick the decoder named in the configuration.
    ///
    /// Unknown names fall back to [`FeedPlugin::Schauf`].
    pub fn from_name(name: &str) -> Self {
        if !name.eq_ignore_ascii_case("schauf") {
            warn!(plugin = name, "unknown feed plugin, using schauf");
        }
        Self::Schauf
    }

    /// Plugin name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Schauf => "schauf",
        }
    }

    /// Decode one packet.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Decode`] if the packet is malformed.
    pub fn decode(self, raw: &[u8]) -> Result<FeedSnapshot, FeedError> {
        match self {
            Self::Schauf => Ok(SchaufPacket::decode(raw)?.into_snapshot()),
        }
    }
}

/// Bind the feed socket on all interfaces.
///
/// # Errors
///
/// Returns [`FeedError::Bind`] if the port is unavailable.
pub async fn bind_feed(port: u16) -> Result<UdpSocket, FeedError> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    UdpSocket::bind(addr)
        .await
        .map_err(|source| FeedError::Bind { port, source })
}

/// Receive packets forever, applying each one to the engine.
pub async fn run_feed_listener(socket: UdpSocket, engine: Arc<GameEngine>, plugin: FeedPlugin) {
    if let Ok(addr) = socket.local_addr() {
        info!(%addr, plugin = plugin.name(), "listening for scoreboard packets");
    }

    let mut buf = vec![0_u8; MAX_PACKET];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "feed receive failed");
                continue;
            }
        };
        let Some(packet) = buf.get(..len) else {
            continue;
        };

        match plugin.decode(packet) {
            Ok(snapshot) => {
                debug!(%peer, len, "feed packet");
                engine.apply_feed(snapshot).await;
            }
            Err(e) => warn!(%peer, error = %e, "dropping feed packet"),
        }
    }
}
