//! Integration tests for state fan-out through the engine.
//!
//! Recording targets stand in for the overlay and the remote scoreboard so
//! the tests can assert exactly which calls one mutation produces.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scorebug_core::sync::overlay_plan;
use scorebug_core::{
    ColorConfig, FeedSnapshot, GameConfig, GameEngine, OverlayCall, OverlayItem, OverlayTarget,
    PlayType, Possession, RemoteAction, RemoteTarget, Side, SyncDispatcher, SyncError,
    TargetOutcome, TeamPair,
};
use tokio::task::JoinSet;

#[derive(Default)]
struct RecordingOverlay {
    calls: Mutex<Vec<OverlayCall>>,
    fail_on: Option<OverlayItem>,
}

impl RecordingOverlay {
    fn failing_on(item: OverlayItem) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(item),
        }
    }

    fn take(&self) -> Vec<OverlayCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    fn record(&self, call: OverlayCall) -> Result<(), SyncError> {
        if self.fail_on == Some(call.item()) {
            return Err(SyncError::Overlay(String::from("connection refused")));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl OverlayTarget for RecordingOverlay {
    async fn set_text(&self, item: OverlayItem, value: &str) -> Result<(), SyncError> {
        // Give other tasks a chance to run between two calls of one sync.
        tokio::task::yield_now().await;
        self.record(OverlayCall::SetText(item, value.to_owned()))
    }

    async fn set_color(&self, item: OverlayItem, color: u32) -> Result<(), SyncError> {
        self.record(OverlayCall::SetColor(item, color))
    }

    async fn show(&self, item: OverlayItem) -> Result<(), SyncError> {
        self.record(OverlayCall::Show(item))
    }

    async fn hide(&self, item: OverlayItem) -> Result<(), SyncError> {
        self.record(OverlayCall::Hide(item))
    }
}

#[derive(Default)]
struct RecordingRemote {
    calls: Mutex<Vec<(RemoteAction, String)>>,
    fail: bool,
}

impl RecordingRemote {
    fn take(&self) -> Vec<(RemoteAction, String)> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

#[async_trait]
impl RemoteTarget for RecordingRemote {
    async fn set_field(&self, action: RemoteAction, value: &str) -> Result<(), SyncError> {
        if self.fail {
            return Err(SyncError::Remote(String::from("HTTP 502")));
        }
        self.calls.lock().unwrap().push((action, value.to_owned()));
        Ok(())
    }
}

fn wired(
    overlay: RecordingOverlay,
    remote: RecordingRemote,
) -> (GameEngine, Arc<RecordingOverlay>, Arc<RecordingRemote>) {
    let overlay = Arc::new(overlay);
    let remote = Arc::new(remote);
    let dispatcher = SyncDispatcher::new(
        Some(Arc::clone(&overlay) as Arc<dyn OverlayTarget>),
        Some(Arc::clone(&remote) as Arc<dyn RemoteTarget>),
        ColorConfig::default(),
    );
    (
        GameEngine::new(GameConfig::default(), dispatcher),
        overlay,
        remote,
    )
}

fn feed() -> FeedSnapshot {
    FeedSnapshot {
        points: TeamPair::new(21, 17),
        timeouts: TeamPair::new(2, 0),
        game_clock: String::from("01:45"),
        play_clock: 5,
        quarter: 4,
        down: 3,
        distance: String::from("Goal"),
        ball_on: 8,
        possession: Possession::Away,
    }
}

#[tokio::test]
async fn feed_replace_syncs_every_element_once() {
    let (engine, overlay, remote) = wired(RecordingOverlay::default(), RecordingRemote::default());

    engine.apply_feed(feed()).await;

    let calls = overlay.take();
    let texts = calls
        .iter()
        .filter(|c| matches!(c, OverlayCall::SetText(..)))
        .count();
    let colors = calls
        .iter()
        .filter(|c| matches!(c, OverlayCall::SetColor(..)))
        .count();
    let visibility = calls
        .iter()
        .filter(|c| matches!(c, OverlayCall::Show(_) | OverlayCall::Hide(_)))
        .count();
    assert_eq!((texts, colors, visibility), (8, 1, 2));

    let touched: BTreeSet<&str> = calls.iter().map(|c| c.item().source_name()).collect();
    assert_eq!(touched.len(), OverlayItem::ALL.len());

    let fields = remote.take();
    assert_eq!(fields.len(), 12);
    let actions: Vec<RemoteAction> = fields.iter().map(|(a, _)| *a).collect();
    assert_eq!(actions, RemoteAction::ALL.to_vec());
}

#[tokio::test]
async fn feed_values_reach_both_targets() {
    let (engine, overlay, remote) = wired(RecordingOverlay::default(), RecordingRemote::default());

    engine.apply_feed(feed()).await;

    let calls = overlay.take();
    assert!(calls.contains(&OverlayCall::SetText(
        OverlayItem::DownDistance,
        String::from("3rd & Goal")
    )));
    assert!(calls.contains(&OverlayCall::SetText(
        OverlayItem::GameClock,
        String::from("01:45")
    )));
    assert!(calls.contains(&OverlayCall::SetText(
        OverlayItem::TimeoutsAway,
        String::new()
    )));
    assert!(calls.contains(&OverlayCall::SetColor(
        OverlayItem::PlayClock,
        ColorConfig::default().alert
    )));
    assert_eq!(
        calls.last(),
        Some(&OverlayCall::Show(OverlayItem::PossessionAway))
    );

    let fields = remote.take();
    assert!(fields.contains(&(RemoteAction::GameClock, String::from("105"))));
    assert!(fields.contains(&(RemoteAction::Down, String::from("3rd"))));
    assert!(fields.contains(&(RemoteAction::GuestTimeouts, String::from("0"))));
    assert!(fields.contains(&(RemoteAction::LosTeam, String::from("guest"))));
}

#[tokio::test]
async fn overlay_failure_does_not_block_remote() {
    let (engine, overlay, remote) = wired(
        RecordingOverlay::failing_on(OverlayItem::GameClock),
        RecordingRemote::default(),
    );

    let state = engine.score(Side::Home, PlayType::Touchdown).await;
    assert_eq!(state.points(Side::Home), 6);

    // Delivery stops at the failing element.
    let calls = overlay.take();
    assert_eq!(calls.len(), 2);
    assert_eq!(remote.take().len(), 12);
}

#[tokio::test]
async fn remote_failure_does_not_block_overlay() {
    let overlay = RecordingOverlay::default();
    let remote = RecordingRemote {
        fail: true,
        ..RecordingRemote::default()
    };
    let (engine, overlay, remote) = wired(overlay, remote);

    engine.set_down(2).await;
    assert_eq!(overlay.take().len(), 11);
    assert!(remote.take().is_empty());
}

#[tokio::test]
async fn dispatcher_reports_outcomes() {
    let overlay: Arc<dyn OverlayTarget> =
        Arc::new(RecordingOverlay::failing_on(OverlayItem::PointsHome));
    let dispatcher = SyncDispatcher::new(Some(overlay), None, ColorConfig::default());

    let report = dispatcher
        .dispatch(&scorebug_core::GameState::default())
        .await;
    assert!(matches!(
        report.overlay,
        TargetOutcome::Failed { delivered: 0, .. }
    ));
    assert_eq!(report.remote, TargetOutcome::Disabled);
}

#[tokio::test]
async fn every_mutation_syncs_exactly_once() {
    let (engine, overlay, remote) = wired(RecordingOverlay::default(), RecordingRemote::default());

    engine.advance_quarter().await;
    engine.set_distance(String::from("10")).await;
    engine.set_possession(Possession::Home).await;
    engine.adjust_timeout(Side::Away, -1).await;
    engine.tick_play_clock().await;

    assert_eq!(overlay.take().len(), 5 * 11);
    assert_eq!(remote.take().len(), 5 * 12);

    // Reading the state does not sync.
    engine.snapshot().await;
    assert!(overlay.take().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mutations_are_serialized() {
    let (engine, overlay, remote) = wired(RecordingOverlay::default(), RecordingRemote::default());
    let engine = Arc::new(engine);

    let mut tasks = JoinSet::new();
    for i in 0..28 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            match i % 7 {
                0..=2 => engine.score(Side::Home, PlayType::Touchdown).await,
                3 => engine.score(Side::Away, PlayType::FieldGoal).await,
                4 if i < 14 => engine.adjust_timeout(Side::Away, -1).await,
                _ => engine.tick_play_clock().await,
            }
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    // 12 touchdowns, 4 field goals, 2 timeouts, 10 ticks.
    let state = engine.snapshot().await;
    assert_eq!(state.points(Side::Home), 72);
    assert_eq!(state.points(Side::Away), 12);
    assert_eq!(state.timeouts(Side::Away), 1);
    assert_eq!(state.play_clock(), 30);

    let calls = overlay.take();
    assert_eq!(calls.len(), 28 * 11);
    let expected_items: Vec<OverlayItem> = overlay_plan(&state, &ColorConfig::default())
        .iter()
        .map(OverlayCall::item)
        .collect();

    let mut last_home = 0;
    let mut last_play_clock = i64::MAX;
    for sync in calls.chunks(11) {
        let items: Vec<OverlayItem> = sync.iter().map(OverlayCall::item).collect();
        assert_eq!(items, expected_items);

        let text = |wanted: OverlayItem| {
            sync.iter()
                .find_map(|call| match call {
                    OverlayCall::SetText(item, value) if *item == wanted => Some(value.clone()),
                    _ => None,
                })
                .unwrap()
        };
        let home: u32 = text(OverlayItem::PointsHome).parse().unwrap();
        let play_clock: i64 = text(OverlayItem::PlayClock).parse().unwrap();
        assert!(home >= last_home);
        assert!(play_clock <= last_play_clock);
        last_home = home;
        last_play_clock = play_clock;
    }
    assert_eq!(last_home, 72);
    assert_eq!(last_play_clock, 30);

    let fields = remote.take();
    assert_eq!(fields.len(), 28 * 12);
    for sync in fields.chunks(12) {
        let actions: Vec<RemoteAction> = sync.iter().map(|(a, _)| *a).collect();
        assert_eq!(actions, RemoteAction::ALL.to_vec());
    }
}
