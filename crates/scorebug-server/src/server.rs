//! Control server lifecycle.
//!
//! [`bind_control`] claims the TCP port on all interfaces, mirroring the UDP
//! feed. [`serve_control`] runs the router until the shutdown future
//! resolves, then pauses both clock drivers so no tick fires after the
//! server stops.

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the control server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The TCP port could not be bound.
    #[error("failed to bind control server on port {port}: {source}")]
    Bind {
        /// The configured port.
        port: u16,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The server failed while serving.
    #[error("control server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind the control listener on `0.0.0.0:<port>`.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the port is unavailable.
pub async fn bind_control(port: u16) -> Result<TcpListener, ServerError> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { port, source })
}

/// Serve the control router on `listener` until `shutdown` resolves.
///
/// In-flight requests finish before this returns; both clock drivers are
/// paused once the shutdown signal fires.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] on a fatal I/O error.
pub async fn serve_control<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "control server listening");
    }

    let router = build_router(Arc::clone(&state));
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            state.session.shutdown().await;
            info!("control server draining");
        })
        .await?;

    info!("control server stopped");
    Ok(())
}
