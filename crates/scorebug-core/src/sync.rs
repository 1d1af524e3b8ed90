//! Fan-out of game state to downstream render targets.
//!
//! Two capabilities are consumed here and implemented elsewhere:
//!
//! - [`OverlayTarget`] -- named on-screen elements that accept set-text,
//!   set-colour, show, and hide.
//! - [`RemoteTarget`] -- a field-level scoreboard API that accepts one
//!   value per [`RemoteAction`].
//!
//! The [`SyncDispatcher`] turns a [`GameState`] snapshot into a plan of
//! calls for each target ([`overlay_plan`], [`remote_plan`]) and delivers
//! both plans concurrently. A target stops at its first failed call and
//! the failure is logged; the other target is unaffected. Nothing is
//! retried.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::ColorConfig;
use crate::state::{GameState, Possession, Side};

/// Errors reported by a sync target.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The overlay rejected a call or could not be reached.
    #[error("overlay error: {0}")]
    Overlay(String),

    /// The remote scoreboard rejected a call or could not be reached.
    #[error("remote error: {0}")]
    Remote(String),
}

// ---------------------------------------------------------------------------
// Overlay capability
// ---------------------------------------------------------------------------

/// The ten on-screen elements of the score bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayItem {
    /// Home team score.
    PointsHome,
    /// Away team score.
    PointsAway,
    /// Game clock display.
    GameClock,
    /// Play clock display.
    PlayClock,
    /// Quarter label.
    Quarter,
    /// Down and distance composite.
    DownDistance,
    /// Home timeout glyphs.
    TimeoutsHome,
    /// Away timeout glyphs.
    TimeoutsAway,
    /// Home possession indicator.
    PossessionHome,
    /// Away possession indicator.
    PossessionAway,
}

impl OverlayItem {
    /// Every overlay element.
    pub const ALL: [Self; 10] = [
        Self::PointsHome,
        Self::PointsAway,
        Self::GameClock,
        Self::PlayClock,
        Self::Quarter,
        Self::DownDistance,
        Self::TimeoutsHome,
        Self::TimeoutsAway,
        Self::PossessionHome,
        Self::PossessionAway,
    ];

    /// Source name of the element in the overlay scene.
    pub const fn source_name(self) -> &'static str {
        match self {
            Self::PointsHome => "Points Home",
            Self::PointsAway => "Points Away",
            Self::GameClock => "Gameclock",
            Self::PlayClock => "Playclock",
            Self::Quarter => "Quarter",
            Self::DownDistance => "Down&Distance",
            Self::TimeoutsHome => "Timeouts Home",
            Self::TimeoutsAway => "Timeouts Away",
            Self::PossessionHome => "Possession Home",
            Self::PossessionAway => "Possession Away",
        }
    }
}

impl fmt::Display for OverlayItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_name())
    }
}

/// A render surface addressed by [`OverlayItem`].
#[async_trait]
pub trait OverlayTarget: Send + Sync {
    /// Replace the text of an element.
    async fn set_text(&self, item: OverlayItem, value: &str) -> Result<(), SyncError>;

    /// Change the text colour of an element.
    async fn set_color(&self, item: OverlayItem, color: u32) -> Result<(), SyncError>;

    /// Make an element visible.
    async fn show(&self, item: OverlayItem) -> Result<(), SyncError>;

    /// Hide an element.
    async fn hide(&self, item: OverlayItem) -> Result<(), SyncError>;
}

/// One planned overlay call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayCall {
    /// `set_text(item, value)`.
    SetText(OverlayItem, String),
    /// `set_color(item, color)`.
    SetColor(OverlayItem, u32),
    /// `show(item)`.
    Show(OverlayItem),
    /// `hide(item)`.
    Hide(OverlayItem),
}

impl OverlayCall {
    /// The element this call addresses.
    pub const fn item(&self) -> OverlayItem {
        match self {
            Self::SetText(item, _)
            | Self::SetColor(item, _)
            | Self::Show(item)
            | Self::Hide(item) => *item,
        }
    }

    async fn apply(&self, target: &dyn OverlayTarget) -> Result<(), SyncError> {
        match self {
            Self::SetText(item, value) => target.set_text(*item, value).await,
            Self::SetColor(item, color) => target.set_color(*item, *color).await,
            Self::Show(item) => target.show(*item).await,
            Self::Hide(item) => target.hide(*item).await,
        }
    }
}

/// The overlay calls that render `state`, in delivery order.
pub fn overlay_plan(state: &GameState, colors: &ColorConfig) -> Vec<OverlayCall> {
    let mut plan = vec![
        OverlayCall::SetText(OverlayItem::PointsHome, state.points(Side::Home).to_string()),
        OverlayCall::SetText(OverlayItem::PointsAway, state.points(Side::Away).to_string()),
        OverlayCall::SetText(OverlayItem::GameClock, state.game_clock_display().to_owned()),
        OverlayCall::SetColor(
            OverlayItem::PlayClock,
            colors.for_play_clock(state.play_clock()),
        ),
        OverlayCall::SetText(OverlayItem::PlayClock, state.play_clock().to_string()),
        OverlayCall::SetText(OverlayItem::Quarter, state.quarter_ordinal().to_owned()),
        OverlayCall::SetText(OverlayItem::DownDistance, state.down_and_distance()),
        OverlayCall::SetText(
            OverlayItem::TimeoutsHome,
            state.timeout_glyphs(Side::Home).to_owned(),
        ),
        OverlayCall::SetText(
            OverlayItem::TimeoutsAway,
            state.timeout_glyphs(Side::Away).to_owned(),
        ),
    ];

    // Hide before show so two indicators are never visible at once.
    plan.extend(match state.possession() {
        Possession::None => [
            OverlayCall::Hide(OverlayItem::PossessionHome),
            OverlayCall::Hide(OverlayItem::PossessionAway),
        ],
        Possession::Home => [
            OverlayCall::Hide(OverlayItem::PossessionAway),
            OverlayCall::Show(OverlayItem::PossessionHome),
        ],
        Possession::Away => [
            OverlayCall::Hide(OverlayItem::PossessionHome),
            OverlayCall::Show(OverlayItem::PossessionAway),
        ],
    });

    plan
}

// ---------------------------------------------------------------------------
// Remote capability
// ---------------------------------------------------------------------------

/// Field-update actions understood by the remote scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteAction {
    /// Quarter label.
    Quarter,
    /// Game clock in seconds.
    GameClock,
    /// Play clock in seconds.
    PlayClock,
    /// Down label.
    Down,
    /// Yards to go.
    Distance,
    /// Home score.
    HomePoints,
    /// Guest score.
    GuestPoints,
    /// Home timeouts remaining.
    HomeTimeouts,
    /// Guest timeouts remaining.
    GuestTimeouts,
    /// Line of scrimmage yard line.
    Los,
    /// Team whose half holds the line of scrimmage.
    LosTeam,
    /// Team with the ball.
    BallTeam,
}

impl RemoteAction {
    /// Every remote action, in delivery order.
    pub const ALL: [Self; 12] = [
        Self::Quarter,
        Self::GameClock,
        Self::PlayClock,
        Self::Down,
        Self::Distance,
        Self::HomePoints,
        Self::GuestPoints,
        Self::HomeTimeouts,
        Self::GuestTimeouts,
        Self::Los,
        Self::LosTeam,
        Self::BallTeam,
    ];

    /// Endpoint name of the action.
    pub const fn action_name(self) -> &'static str {
        match self {
            Self::Quarter => "setData_quarter",
            Self::GameClock => "setData_gameclock",
            Self::PlayClock => "setData_playclock",
            Self::Down => "setData_down",
            Self::Distance => "setData_distance",
            Self::HomePoints => "setData_homepoints",
            Self::GuestPoints => "setData_guestpoints",
            Self::HomeTimeouts => "setData_hometimeouts",
            Self::GuestTimeouts => "setData_guesttimeouts",
            Self::Los => "setData_los",
            Self::LosTeam => "setData_losteam",
            Self::BallTeam => "setData_ballteam",
        }
    }
}

impl fmt::Display for RemoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_name())
    }
}

/// Team code used by the remote scoreboard.
pub const fn remote_team(side: Side) -> &'static str {
    match side {
        Side::Home => "home",
        Side::Away => "guest",
    }
}

/// A field-level scoreboard API.
#[async_trait]
pub trait RemoteTarget: Send + Sync {
    /// Post one value for one field.
    async fn set_field(&self, action: RemoteAction, value: &str) -> Result<(), SyncError>;
}

/// The remote field updates that render `state`, in delivery order.
///
/// Both the line-of-scrimmage team and the ball team are derived from the
/// sign of `ball_on`, not from the possession field.
pub fn remote_plan(state: &GameState) -> Vec<(RemoteAction, String)> {
    let side = remote_team(state.los_side()).to_owned();
    vec![
        (RemoteAction::Quarter, state.quarter_ordinal().to_owned()),
        (RemoteAction::GameClock, state.game_clock_seconds().to_string()),
        (RemoteAction::PlayClock, state.play_clock().to_string()),
        (RemoteAction::Down, state.down_ordinal().to_owned()),
        (RemoteAction::Distance, state.distance().to_owned()),
        (RemoteAction::HomePoints, state.points(Side::Home).to_string()),
        (RemoteAction::GuestPoints, state.points(Side::Away).to_string()),
        (RemoteAction::HomeTimeouts, state.timeouts(Side::Home).to_string()),
        (RemoteAction::GuestTimeouts, state.timeouts(Side::Away).to_string()),
        (RemoteAction::Los, state.ball_on().to_string()),
        (RemoteAction::LosTeam, side.clone()),
        (RemoteAction::BallTeam, side),
    ]
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// What happened to one target during a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// No target of this kind is configured.
    Disabled,
    /// Every planned call succeeded.
    Delivered {
        /// Number of calls made.
        calls: usize,
    },
    /// A call failed; later calls for this target were skipped.
    Failed {
        /// Number of calls that succeeded before the failure.
        delivered: usize,
        /// The failure, rendered for logging.
        error: String,
    },
}

/// Outcome of one dispatch across both targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Overlay delivery outcome.
    pub overlay: TargetOutcome,
    /// Remote delivery outcome.
    pub remote: TargetOutcome,
}

/// Pushes game state to the overlay and the remote scoreboard.
///
/// Either target may be absent. Cloning is cheap; targets are shared.
#[derive(Clone, Default)]
pub struct SyncDispatcher {
    overlay: Option<Arc<dyn OverlayTarget>>,
    remote: Option<Arc<dyn RemoteTarget>>,
    colors: ColorConfig,
}

impl SyncDispatcher {
    /// Create a dispatcher with the given targets.
    pub fn new(
        overlay: Option<Arc<dyn OverlayTarget>>,
        remote: Option<Arc<dyn RemoteTarget>>,
        colors: ColorConfig,
    ) -> Self {
        Self {
            overlay,
            remote,
            colors,
        }
    }

    /// A dispatcher with no targets. Every dispatch is a no-op.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether an overlay target is configured.
    pub const fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Whether a remote target is configured.
    pub const fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Push `state` to both targets concurrently.
    ///
    /// Never fails: target errors are logged and summarized in the
    /// returned [`SyncReport`].
    pub async fn dispatch(&self, state: &GameState) -> SyncReport {
        let (overlay, remote) = tokio::join!(self.push_overlay(state), self.push_remote(state));

        if let TargetOutcome::Failed { delivered, error } = &overlay {
            warn!(delivered, error = %error, "overlay sync failed");
        }
        if let TargetOutcome::Failed { delivered, error } = &remote {
            warn!(delivered, error = %error, "remote sync failed");
        }

        SyncReport { overlay, remote }
    }

    async fn push_overlay(&self, state: &GameState) -> TargetOutcome {
        let Some(target) = self.overlay.as_deref() else {
            return TargetOutcome::Disabled;
        };
        let plan = overlay_plan(state, &self.colors);
        let mut delivered: usize = 0;
        for call in &plan {
            if let Err(e) = call.apply(target).await {
                return TargetOutcome::Failed {
                    delivered,
                    error: format!("{} ({}): {e}", call.item(), call_kind(call)),
                };
            }
            delivered = delivered.saturating_add(1);
        }
        debug!(calls = delivered, "overlay synced");
        TargetOutcome::Delivered { calls: delivered }
    }

    async fn push_remote(&self, state: &GameState) -> TargetOutcome {
        let Some(target) = self.remote.as_deref() else {
            return TargetOutcome::Disabled;
        };
        let plan = remote_plan(state);
        let mut delivered: usize = 0;
        for (action, value) in &plan {
            if let Err(e) = target.set_field(*action, value).await {
                return TargetOutcome::Failed {
                    delivered,
                    error: format!("{action}: {e}"),
                };
            }
            delivered = delivered.saturating_add(1);
        }
        debug!(calls = delivered, "remote synced");
        TargetOutcome::Delivered { calls: delivered }
    }
}

const fn call_kind(call: &OverlayCall) -> &'static str {
    match call {
        OverlayCall::SetText(..) => "set_text",
        OverlayCall::SetColor(..) => "set_color",
        OverlayCall::Show(_) => "show",
        OverlayCall::Hide(_) => "hide",
    }
}

impl fmt::Debug for SyncDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncDispatcher")
            .field("overlay", &self.has_overlay())
            .field("remote", &self.has_remote())
            .field("colors", &self.colors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn items_of(plan: &[OverlayCall]) -> BTreeSet<&'static str> {
        plan.iter().map(|c| c.item().source_name()).collect()
    }

    #[test]
    fn overlay_plan_touches_every_item() {
        let plan = overlay_plan(&GameState::default(), &ColorConfig::default());
        let expected: BTreeSet<&'static str> =
            OverlayItem::ALL.iter().map(|i| i.source_name()).collect();
        assert_eq!(items_of(&plan), expected);
        assert_eq!(plan.len(), 11);
    }

    #[test]
    fn play_clock_colour_boundary() {
        let colors = ColorConfig::default();
        let mut state = GameState::default();

        for (play_clock, expected) in [(6, colors.normal), (5, colors.alert), (1, colors.alert)] {
            state.set_play_clock(play_clock);
            let plan = overlay_plan(&state, &colors);
            assert!(
                plan.contains(&OverlayCall::SetColor(OverlayItem::PlayClock, expected)),
                "play clock {play_clock} should use colour {expected:#x}"
            );
        }
    }

    #[test]
    fn possession_visibility_states() {
        let colors = ColorConfig::default();
        let mut state = GameState::default();

        let tail = |state: &GameState| {
            let plan = overlay_plan(state, &colors);
            plan.into_iter().skip(9).collect::<Vec<_>>()
        };

        assert_eq!(
            tail(&state),
            vec![
                OverlayCall::Hide(OverlayItem::PossessionHome),
                OverlayCall::Hide(OverlayItem::PossessionAway),
            ]
        );

        state.set_possession(Possession::Home);
        assert_eq!(
            tail(&state),
            vec![
                OverlayCall::Hide(OverlayItem::PossessionAway),
                OverlayCall::Show(OverlayItem::PossessionHome),
            ]
        );

        state.set_possession(Possession::Away);
        assert_eq!(
            tail(&state),
            vec![
                OverlayCall::Hide(OverlayItem::PossessionHome),
                OverlayCall::Show(OverlayItem::PossessionAway),
            ]
        );
    }

    #[test]
    fn remote_plan_has_twelve_fields() {
        let plan = remote_plan(&GameState::default());
        let actions: Vec<RemoteAction> = plan.iter().map(|(a, _)| *a).collect();
        assert_eq!(actions, RemoteAction::ALL.to_vec());
    }

    #[test]
    fn remote_plan_values() {
        let mut state = GameState::default();
        state.add_points(Side::Away, 7);
        state.set_ball_on(-20);
        state.set_possession(Possession::Away);

        let plan = remote_plan(&state);
        let value = |action: RemoteAction| {
            plan.iter()
                .find(|(a, _)| *a == action)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };

        assert_eq!(value(RemoteAction::Quarter), "1st");
        assert_eq!(value(RemoteAction::GameClock), "720");
        assert_eq!(value(RemoteAction::PlayClock), "40");
        assert_eq!(value(RemoteAction::GuestPoints), "7");
        assert_eq!(value(RemoteAction::HomeTimeouts), "3");
        assert_eq!(value(RemoteAction::Los), "-20");
        assert_eq!(value(RemoteAction::LosTeam), "home");
        // Ball team follows the yard-line sign, not the possession field.
        assert_eq!(value(RemoteAction::BallTeam), "home");
    }

    #[test]
    fn action_names() {
        assert_eq!(RemoteAction::GuestTimeouts.action_name(), "setData_guesttimeouts");
        assert_eq!(RemoteAction::BallTeam.to_string(), "setData_ballteam");
    }

    #[tokio::test]
    async fn disabled_dispatcher_reports_disabled() {
        let report = SyncDispatcher::disabled()
            .dispatch(&GameState::default())
            .await;
        assert_eq!(report.overlay, TargetOutcome::Disabled);
        assert_eq!(report.remote, TargetOutcome::Disabled);
    }
}
