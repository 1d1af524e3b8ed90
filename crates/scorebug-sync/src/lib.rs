//! Transports that render Scorebug game state downstream.
//!
//! Each transport implements one of the capability traits from
//! [`scorebug_core::sync`]:
//!
//! - [`obs`] -- [`ObsConnector`], the broadcast overlay over the OBS
//!   websocket v5 protocol ([`OverlayTarget`]).
//! - [`statsnscore`] -- [`StatsnScoreClient`], the remote scoreboard HTTP
//!   API ([`RemoteTarget`]).
//! - [`error`] -- Transport error types.
//!
//! [`OverlayTarget`]: scorebug_core::OverlayTarget
//! [`RemoteTarget`]: scorebug_core::RemoteTarget

pub mod error;
pub mod obs;
pub mod statsnscore;

pub use error::{ObsError, RemoteError};
pub use obs::{ObsConfig, ObsConnector};
pub use statsnscore::{RemoteConfig, StatsnScoreClient};
