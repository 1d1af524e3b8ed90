//! The serialized mutation path for the game state.
//!
//! [`GameEngine`] owns the one [`GameState`] of the process. Every
//! operation follows the same sequence under a single async mutex:
//!
//! 1. Validate or clamp the input.
//! 2. Mutate the state and re-render derived fields.
//! 3. Dispatch the new state to the sync targets, exactly once.
//! 4. Return a snapshot of the state to the caller.
//!
//! Dispatch is awaited while the lock is held, so a mutation is never
//! interleaved with another and downstream targets see updates in order.
//! A slow target therefore delays the next mutation (including clock
//! ticks); each transport bounds its own calls with a timeout. Sync
//! failures are logged by the dispatcher and never reach the caller.

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::feed::FeedSnapshot;
use crate::state::{GameState, LastPlay, PlayType, Possession, Side};
use crate::sync::{SyncDispatcher, SyncReport};

/// State guarded by the engine mutex.
#[derive(Debug)]
struct Inner {
    game: GameState,
    last_play: LastPlay,
    last_timeout: Side,
}

/// The authoritative game state and the operations that change it.
///
/// Shared by `Arc` between the input adapters and the clock drivers.
#[derive(Debug)]
pub struct GameEngine {
    inner: Mutex<Inner>,
    dispatcher: SyncDispatcher,
    config: GameConfig,
}

impl GameEngine {
    /// Create an engine holding the kickoff state.
    pub fn new(config: GameConfig, dispatcher: SyncDispatcher) -> Self {
        Self {
            inner: Mutex::new(Inner {
                game: GameState::new(&config),
                last_play: LastPlay::default(),
                last_timeout: Side::Home,
            }),
            dispatcher,
            config,
        }
    }

    /// The engine's configuration.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// A copy of the current state. Does not sync.
    pub async fn snapshot(&self) -> GameState {
        self.inner.lock().await.game.clone()
    }

    /// The scoring play that [`undo_score`](Self::undo_score) would revert.
    pub async fn last_play(&self) -> LastPlay {
        self.inner.lock().await.last_play
    }

    /// Run `apply` against the state, then sync once.
    async fn mutate<F>(&self, operation: &'static str, apply: F) -> GameState
    where
        F: FnOnce(&mut Inner) + Send,
    {
        let mut inner = self.inner.lock().await;
        apply(&mut *inner);
        let snapshot = inner.game.clone();
        let report = self.dispatcher.dispatch(&snapshot).await;
        drop(inner);

        log_mutation(operation, &snapshot, &report);
        snapshot
    }

    /// Push the current state to the sync targets without changing it.
    pub async fn resync(&self) -> GameState {
        self.mutate("resync", |_| {}).await
    }

    // -----------------------------------------------------------------------
    // Scoring
    // -----------------------------------------------------------------------

    /// Award `play_type` to `side` and remember it for undo.
    pub async fn score(&self, side: Side, play_type: PlayType) -> GameState {
        self.mutate("score", |inner| {
            inner.game.add_points(side, play_type.points());
            inner.last_play = LastPlay { side, play_type };
        })
        .await
    }

    /// Revert the last scoring play.
    ///
    /// The undo record is kept, so a second call subtracts again. Points
    /// never drop below zero.
    pub async fn undo_score(&self) -> GameState {
        self.mutate("undo_score", |inner| {
            let LastPlay { side, play_type } = inner.last_play;
            inner.game.remove_points(side, play_type.points());
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Quarter, down, distance
    // -----------------------------------------------------------------------

    /// Move to the next quarter, wrapping from the 4th to the 1st.
    pub async fn advance_quarter(&self) -> GameState {
        self.mutate("advance_quarter", |inner| inner.game.advance_quarter())
            .await
    }

    /// Set the down. Values outside `1..=4` are kept with a blank label.
    pub async fn set_down(&self, down: u8) -> GameState {
        self.mutate("set_down", |inner| inner.game.set_down(down)).await
    }

    /// Replace the distance text verbatim.
    pub async fn set_distance(&self, distance: String) -> GameState {
        self.mutate("set_distance", |inner| inner.game.set_distance(distance))
            .await
    }

    // -----------------------------------------------------------------------
    // Field position and possession
    // -----------------------------------------------------------------------

    /// Set the ball position.
    pub async fn set_ball_on(&self, ball_on: i32) -> GameState {
        self.mutate("set_ball_on", |inner| inner.game.set_ball_on(ball_on))
            .await
    }

    /// Set the possession indicator.
    pub async fn set_possession(&self, possession: Possession) -> GameState {
        self.mutate("set_possession", |inner| {
            inner.game.set_possession(possession);
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Timeouts
    // -----------------------------------------------------------------------

    /// Shift `side`'s timeouts by `delta` within `0..=3` and remember the
    /// side for undo. Charging a timeout is `delta = -1`.
    pub async fn adjust_timeout(&self, side: Side, delta: i8) -> GameState {
        self.mutate("adjust_timeout", |inner| {
            inner.game.adjust_timeouts(side, delta);
            inner.last_timeout = side;
        })
        .await
    }

    /// Give back one timeout to the side last adjusted, up to three.
    pub async fn undo_timeout(&self) -> GameState {
        self.mutate("undo_timeout", |inner| {
            let side = inner.last_timeout;
            inner.game.adjust_timeouts(side, 1);
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Clocks
    // -----------------------------------------------------------------------

    /// Reset the play clock to its configured length.
    pub async fn reset_play_clock(&self) -> GameState {
        let seconds = self.config.play_clock_seconds;
        self.mutate("reset_play_clock", |inner| {
            inner.game.set_play_clock(seconds);
        })
        .await
    }

    /// Reset the game clock to its configured length.
    pub async fn reset_game_clock(&self) -> GameState {
        let seconds = self.config.game_clock_seconds;
        self.mutate("reset_game_clock", |inner| {
            inner.game.set_game_clock_seconds(seconds);
        })
        .await
    }

    /// One play clock tick: remove the configured step. No floor.
    pub async fn tick_play_clock(&self) -> GameState {
        let step = self.config.play_clock_step;
        self.mutate("tick_play_clock", |inner| {
            inner.game.tick_play_clock(step);
        })
        .await
    }

    /// One game clock tick: remove one second, stopping at zero.
    pub async fn tick_game_clock(&self) -> GameState {
        self.mutate("tick_game_clock", |inner| {
            inner.game.tick_game_clock();
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Feed
    // -----------------------------------------------------------------------

    /// Replace the feed-controlled fields with `snapshot` and sync once.
    ///
    /// An unparseable clock display keeps the current game clock.
    pub async fn apply_feed(&self, snapshot: FeedSnapshot) -> GameState {
        self.mutate("apply_feed", move |inner| {
            let game = &mut inner.game;
            game.set_points(Side::Home, snapshot.points.home);
            game.set_points(Side::Away, snapshot.points.away);
            game.set_timeouts(Side::Home, snapshot.timeouts.home);
            game.set_timeouts(Side::Away, snapshot.timeouts.away);
            if let Err(e) = game.set_game_clock_display(&snapshot.game_clock) {
                warn!(error = %e, "feed clock ignored");
            }
            game.set_play_clock(snapshot.play_clock);
            game.set_quarter(snapshot.quarter);
            game.set_down(snapshot.down);
            game.set_distance(snapshot.distance);
            game.set_ball_on(snapshot.ball_on);
            game.set_possession(snapshot.possession);
        })
        .await
    }
}

fn log_mutation(operation: &'static str, state: &GameState, report: &SyncReport) {
    debug!(
        operation,
        home = state.points(Side::Home),
        away = state.points(Side::Away),
        quarter = state.quarter(),
        game_clock = state.game_clock_display(),
        play_clock = state.play_clock(),
        overlay = ?report.overlay,
        remote = ?report.remote,
        "state mutated"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GameEngine {
        GameEngine::new(GameConfig::default(), SyncDispatcher::disabled())
    }

    #[tokio::test]
    async fn score_then_undo_restores_points() {
        let engine = engine();
        for play in [
            PlayType::Touchdown,
            PlayType::FieldGoal,
            PlayType::Safety,
            PlayType::Pat,
            PlayType::TwoPoint,
            PlayType::None,
        ] {
            for side in [Side::Home, Side::Away] {
                let before = engine.snapshot().await.points(side);
                let scored = engine.score(side, play).await;
                assert_eq!(scored.points(side), before + play.points());
                let undone = engine.undo_score().await;
                assert_eq!(undone.points(side), before, "{play:?} for {side}");
            }
        }
    }

    #[tokio::test]
    async fn second_undo_subtracts_again() {
        let engine = engine();
        engine.score(Side::Home, PlayType::Touchdown).await;
        engine.score(Side::Home, PlayType::Touchdown).await;
        assert_eq!(engine.undo_score().await.points(Side::Home), 6);
        assert_eq!(engine.undo_score().await.points(Side::Home), 0);
        // Floors at zero instead of going negative.
        assert_eq!(engine.undo_score().await.points(Side::Home), 0);
    }

    #[tokio::test]
    async fn undo_uses_only_last_play() {
        let engine = engine();
        engine.score(Side::Home, PlayType::Touchdown).await;
        engine.score(Side::Away, PlayType::FieldGoal).await;
        let state = engine.undo_score().await;
        assert_eq!(state.points(Side::Home), 6);
        assert_eq!(state.points(Side::Away), 0);
        assert_eq!(
            engine.last_play().await,
            LastPlay {
                side: Side::Away,
                play_type: PlayType::FieldGoal
            }
        );
    }

    #[tokio::test]
    async fn timeouts_never_leave_range() {
        let engine = engine();
        for _ in 0..5 {
            let state = engine.adjust_timeout(Side::Away, -1).await;
            assert!(state.timeouts(Side::Away) <= 3);
        }
        assert_eq!(engine.snapshot().await.timeouts(Side::Away), 0);
        for _ in 0..5 {
            engine.undo_timeout().await;
        }
        let state = engine.snapshot().await;
        assert_eq!(state.timeouts(Side::Away), 3);
        assert_eq!(state.timeouts(Side::Home), 3);
        assert_eq!(state.timeout_glyphs(Side::Away), "_ _ _");
    }

    #[tokio::test]
    async fn undo_timeout_targets_last_adjusted_side() {
        let engine = engine();
        engine.adjust_timeout(Side::Home, -1).await;
        engine.adjust_timeout(Side::Away, -1).await;
        let state = engine.undo_timeout().await;
        assert_eq!(state.timeouts(Side::Home), 2);
        assert_eq!(state.timeouts(Side::Away), 3);
    }

    #[tokio::test]
    async fn quarter_wraps() {
        let engine = engine();
        let mut labels = Vec::new();
        for _ in 0..4 {
            labels.push(engine.advance_quarter().await.quarter_ordinal());
        }
        assert_eq!(labels, vec!["2nd", "3rd", "4th", "1st"]);
    }

    #[tokio::test]
    async fn clock_resets_use_config() {
        let config = GameConfig {
            play_clock_seconds: 25,
            game_clock_seconds: 900,
            ..GameConfig::default()
        };
        let engine = GameEngine::new(config, SyncDispatcher::disabled());
        engine.tick_play_clock().await;
        engine.tick_game_clock().await;
        assert_eq!(engine.snapshot().await.game_clock_display(), "14:59");
        assert_eq!(engine.reset_play_clock().await.play_clock(), 25);
        assert_eq!(engine.reset_game_clock().await.game_clock_display(), "15:00");
    }

    #[tokio::test]
    async fn feed_replaces_fields() {
        let engine = engine();
        engine.score(Side::Home, PlayType::Touchdown).await;
        let state = engine
            .apply_feed(FeedSnapshot {
                points: crate::state::TeamPair::new(14, 10),
                timeouts: crate::state::TeamPair::new(1, 2),
                game_clock: String::from("03:21"),
                play_clock: 12,
                quarter: 3,
                down: 2,
                distance: String::from("7"),
                ball_on: -35,
                possession: Possession::Home,
            })
            .await;
        assert_eq!(state.points(Side::Home), 14);
        assert_eq!(state.points(Side::Away), 10);
        assert_eq!(state.timeout_glyphs(Side::Home), "_");
        assert_eq!(state.game_clock_seconds(), 201);
        assert_eq!(state.quarter_ordinal(), "3rd");
        assert_eq!(state.down_and_distance(), "2nd & 7");
        assert_eq!(state.possession(), Possession::Home);
        // The feed does not touch the undo record.
        assert_eq!(engine.last_play().await.play_type, PlayType::Touchdown);
    }
}
