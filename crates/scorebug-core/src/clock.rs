//! Periodic clock drivers.
//!
//! A [`ClockDriver`] ticks one of the two game clocks through the engine on
//! a fixed interval. Ticks go through the same serialized mutation path as
//! operator input, so a tick never interleaves with another mutation.
//!
//! Each driver tracks at most one running task. Starting a driver that is
//! already running does nothing; pausing aborts the task and keeps the
//! clock value where it stopped.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::engine::GameEngine;

/// Shortest tick interval a driver accepts.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Which clock a driver ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// The play clock.
    Play,
    /// The game clock.
    Game,
}

impl fmt::Display for ClockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Play => f.write_str("play"),
            Self::Game => f.write_str("game"),
        }
    }
}

/// Drives one clock on a fixed interval.
#[derive(Debug)]
pub struct ClockDriver {
    kind: ClockKind,
    interval: Duration,
    engine: Arc<GameEngine>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ClockDriver {
    /// Create a stopped driver ticking `kind` every `interval`.
    ///
    /// Intervals shorter than [`MIN_INTERVAL`] are raised to it.
    pub fn new(kind: ClockKind, interval: Duration, engine: Arc<GameEngine>) -> Self {
        Self {
            kind,
            interval: interval.max(MIN_INTERVAL),
            engine,
            task: Mutex::new(None),
        }
    }

    /// Create a stopped play clock driver using the engine's cadence.
    pub fn play_clock(engine: Arc<GameEngine>) -> Self {
        let interval = engine.config().play_clock_interval();
        Self::new(ClockKind::Play, interval, engine)
    }

    /// Create a stopped game clock driver using the engine's cadence.
    pub fn game_clock(engine: Arc<GameEngine>) -> Self {
        let interval = engine.config().game_clock_interval();
        Self::new(ClockKind::Game, interval, engine)
    }

    /// Which clock this driver ticks.
    pub const fn kind(&self) -> ClockKind {
        self.kind
    }

    /// Whether a tick task is currently running.
    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Start ticking. Returns `false` if the driver was already running.
    ///
    /// The first tick fires one interval after the call.
    pub async fn start(&self) -> bool {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!(clock = %self.kind, "clock already running");
            return false;
        }

        let engine = Arc::clone(&self.engine);
        let kind = self.kind;
        let period = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match kind {
                    ClockKind::Play => engine.tick_play_clock().await,
                    ClockKind::Game => engine.tick_game_clock().await,
                };
            }
        }));

        info!(clock = %self.kind, interval_ms = self.interval.as_millis(), "clock started");
        true
    }

    /// Stop ticking. Returns `false` if the driver was not running.
    pub async fn pause(&self) -> bool {
        let Some(task) = self.task.lock().await.take() else {
            return false;
        };
        let was_running = !task.is_finished();
        task.abort();
        if was_running {
            info!(clock = %self.kind, "clock paused");
        }
        was_running
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sync::SyncDispatcher;

    fn engine() -> Arc<GameEngine> {
        Arc::new(GameEngine::new(
            GameConfig::default(),
            SyncDispatcher::disabled(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn play_clock_ticks_on_interval() {
        let engine = engine();
        let driver = ClockDriver::play_clock(Arc::clone(&engine));
        assert!(driver.start().await);

        tokio::time::sleep(Duration::from_millis(550)).await;
        assert_eq!(engine.snapshot().await.play_clock(), 35);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_does_not_double_tick() {
        let engine = engine();
        let driver = ClockDriver::play_clock(Arc::clone(&engine));
        assert!(driver.start().await);
        assert!(!driver.start().await);

        tokio::time::sleep(Duration::from_millis(1050)).await;
        assert_eq!(engine.snapshot().await.play_clock(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_keeps_value_and_restart_resumes() {
        let engine = engine();
        let driver = ClockDriver::game_clock(Arc::clone(&engine));
        driver.start().await;

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(driver.pause().await);
        assert!(!driver.is_running().await);
        assert_eq!(engine.snapshot().await.game_clock_display(), "11:57");

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.snapshot().await.game_clock_display(), "11:57");

        assert!(driver.start().await);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(engine.snapshot().await.game_clock_display(), "11:55");
    }

    #[tokio::test(start_paused = true)]
    async fn pause_when_stopped_is_noop() {
        let driver = ClockDriver::game_clock(engine());
        assert!(!driver.pause().await);
        assert!(!driver.is_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_config_still_ticks() {
        let config: GameConfig = serde_json::from_str(r#"{"playClockIntervalMs": 0}"#).unwrap();
        let engine = Arc::new(GameEngine::new(config, SyncDispatcher::disabled()));
        let driver = ClockDriver::play_clock(Arc::clone(&engine));
        assert!(driver.start().await);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(driver.is_running().await);
        assert_eq!(engine.snapshot().await.play_clock(), 37);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_is_raised_to_minimum() {
        let engine = engine();
        let driver = ClockDriver::new(ClockKind::Game, Duration::ZERO, Arc::clone(&engine));
        assert!(driver.start().await);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(driver.is_running().await);
        driver.pause().await;
        assert!(engine.snapshot().await.game_clock_seconds() < 720);
    }

    #[tokio::test(start_paused = true)]
    async fn play_clock_runs_past_zero() {
        let engine = engine();
        let driver = ClockDriver::play_clock(Arc::clone(&engine));
        driver.start().await;

        tokio::time::sleep(Duration::from_millis(4150)).await;
        driver.pause().await;
        assert_eq!(engine.snapshot().await.play_clock(), -1);
    }
}
