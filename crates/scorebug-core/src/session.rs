//! Routing of operator intents to the engine and the clock drivers.

use std::sync::Arc;

use tracing::info;

use crate::clock::ClockDriver;
use crate::engine::GameEngine;
use crate::intent::{ClockCommand, Intent};
use crate::state::GameState;

/// One running game: the engine plus its two clock drivers.
#[derive(Debug)]
pub struct GameSession {
    engine: Arc<GameEngine>,
    play_clock: ClockDriver,
    game_clock: ClockDriver,
}

impl GameSession {
    /// Create a session with both clocks stopped.
    pub fn new(engine: Arc<GameEngine>) -> Self {
        Self {
            play_clock: ClockDriver::play_clock(Arc::clone(&engine)),
            game_clock: ClockDriver::game_clock(Arc::clone(&engine)),
            engine,
        }
    }

    /// The shared engine.
    pub const fn engine(&self) -> &Arc<GameEngine> {
        &self.engine
    }

    /// The play clock driver.
    pub const fn play_clock(&self) -> &ClockDriver {
        &self.play_clock
    }

    /// The game clock driver.
    pub const fn game_clock(&self) -> &ClockDriver {
        &self.game_clock
    }

    /// Carry out one intent and return the resulting state.
    pub async fn execute(&self, intent: Intent) -> GameState {
        match intent {
            Intent::Score { side, play_type } => self.engine.score(side, play_type).await,
            Intent::UndoScore => self.engine.undo_score().await,
            Intent::AdvanceQuarter => self.engine.advance_quarter().await,
            Intent::SetDown(down) => self.engine.set_down(down).await,
            Intent::SetDistance(distance) => self.engine.set_distance(distance).await,
            Intent::Timeout(side) => self.engine.adjust_timeout(side, -1).await,
            Intent::UndoTimeout => self.engine.undo_timeout().await,
            Intent::GameClock(command) => self.drive(&self.game_clock, command).await,
            Intent::PlayClock(command) => self.drive(&self.play_clock, command).await,
            Intent::Possession(possession) => self.engine.set_possession(possession).await,
            Intent::BallOn(ball_on) => self.engine.set_ball_on(ball_on).await,
            Intent::State => self.engine.snapshot().await,
        }
    }

    async fn drive(&self, driver: &ClockDriver, command: ClockCommand) -> GameState {
        match command {
            ClockCommand::Start => {
                driver.start().await;
            }
            ClockCommand::Pause => {
                driver.pause().await;
            }
            ClockCommand::Reset => {
                return match driver.kind() {
                    crate::clock::ClockKind::Play => self.engine.reset_play_clock().await,
                    crate::clock::ClockKind::Game => self.engine.reset_game_clock().await,
                };
            }
        }
        self.engine.snapshot().await
    }

    /// Stop both clocks.
    pub async fn shutdown(&self) {
        self.play_clock.pause().await;
        self.game_clock.pause().await;
        info!("game session stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::GameConfig;
    use crate::state::{PlayType, Side};
    use crate::sync::SyncDispatcher;

    fn session() -> GameSession {
        GameSession::new(Arc::new(GameEngine::new(
            GameConfig::default(),
            SyncDispatcher::disabled(),
        )))
    }

    #[tokio::test]
    async fn intents_reach_the_engine() {
        let session = session();
        let state = session
            .execute(Intent::Score {
                side: Side::Away,
                play_type: PlayType::FieldGoal,
            })
            .await;
        assert_eq!(state.points(Side::Away), 3);

        let state = session.execute(Intent::SetDistance(String::from("Goal"))).await;
        assert_eq!(state.distance(), "Goal");

        let state = session.execute(Intent::Timeout(Side::Home)).await;
        assert_eq!(state.timeouts(Side::Home), 2);

        let state = session.execute(Intent::UndoTimeout).await;
        assert_eq!(state.timeouts(Side::Home), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn game_clock_intents() {
        let session = session();
        session.execute(Intent::GameClock(ClockCommand::Start)).await;
        assert!(session.game_clock().is_running().await);
        assert!(!session.play_clock().is_running().await);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let paused = session.execute(Intent::GameClock(ClockCommand::Pause)).await;
        assert_eq!(paused.game_clock_display(), "11:58");
        assert!(!session.game_clock().is_running().await);

        let reset = session.execute(Intent::GameClock(ClockCommand::Reset)).await;
        assert_eq!(reset.game_clock_display(), "12:00");
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_clocks() {
        let session = session();
        session.execute(Intent::PlayClock(ClockCommand::Start)).await;
        session.execute(Intent::GameClock(ClockCommand::Start)).await;
        session.shutdown().await;
        assert!(!session.play_clock().is_running().await);
        assert!(!session.game_clock().is_running().await);
    }
}
