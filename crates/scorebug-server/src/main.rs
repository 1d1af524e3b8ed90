//! Scorebug entry point.
//!
//! Loads the configuration, builds the sync targets and the game engine,
//! pushes the kickoff state once, then runs the configured input adapter
//! until it fails or `Ctrl-C` is received.

use std::sync::Arc;

use scorebug_core::{GameEngine, GameSession, OverlayTarget, RemoteTarget, SyncDispatcher};
use scorebug_server::config::{CONFIG_PATH_ENV, config_path};
use scorebug_server::{
    AppConfig, AppError, AppState, FeedPlugin, ListenMode, bind_control, bind_feed,
    run_feed_listener, serve_control,
};
use scorebug_sync::{ObsConnector, StatsnScoreClient};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the input adapter cannot start or fails while
/// running.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path(std::env::args().nth(1), std::env::var(CONFIG_PATH_ENV).ok());
    let (config, load_error) = match AppConfig::from_file(&path) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::from_env(), Some(e)),
    };

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level())),
        )
        .with_target(true)
        .init();

    info!("scorebug starting");
    if let Some(e) = load_error {
        warn!(path = %path.display(), error = %e, "config not loaded, using defaults");
    }
    info!(
        mode = %config.mode,
        listen_port = config.listen_port,
        plugin = config.plugin_name,
        obs = config.obs.enable,
        "configuration loaded"
    );

    let engine = Arc::new(GameEngine::new(config.game.clone(), dispatcher(&config)));
    let session = GameSession::new(Arc::clone(&engine));
    engine.resync().await;

    let state = Arc::new(AppState::new(session));
    let result = run(&config, Arc::clone(&state)).await;
    state.session.shutdown().await;

    if let Err(e) = &result {
        error!(error = %e, "scorebug stopped");
    }
    Ok(result?)
}

/// Build the sync dispatcher from the configured targets.
fn dispatcher(config: &AppConfig) -> SyncDispatcher {
    let overlay: Option<Arc<dyn OverlayTarget>> = if config.obs.enable {
        info!(url = %config.obs.url(), scene = config.obs.scene, "OBS overlay enabled");
        Some(Arc::new(ObsConnector::new(config.obs.clone())))
    } else {
        info!("OBS overlay disabled");
        None
    };

    let remote: Option<Arc<dyn RemoteTarget>> = match StatsnScoreClient::new(&config.statsnscore) {
        Ok(client) => {
            info!(url = config.statsnscore.scoreboard_api_url, "remote scoreboard enabled");
            Some(Arc::new(client))
        }
        Err(e) => {
            error!(error = %e, "remote scoreboard disabled");
            None
        }
    };

    SyncDispatcher::new(overlay, remote, config.colors)
}

/// Run the input adapter selected by the configuration until `Ctrl-C`.
async fn run(config: &AppConfig, state: Arc<AppState>) -> Result<(), AppError> {
    match config.mode {
        ListenMode::Udp => {
            let socket = bind_feed(config.listen_port).await?;
            let plugin = FeedPlugin::from_name(&config.plugin_name);
            tokio::select! {
                () = run_feed_listener(socket, Arc::clone(state.engine()), plugin) => {}
                () = shutdown_signal() => {}
            }
            Ok(())
        }
        ListenMode::Ws => {
            let listener = bind_control(config.listen_port).await?;
            serve_control(listener, state, shutdown_signal()).await?;
            Ok(())
        }
    }
}

/// Resolves on `Ctrl-C`. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
