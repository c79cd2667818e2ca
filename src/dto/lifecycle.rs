use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dao::models::{FixtureSnapshot, FixtureStatus},
    state::{PhaseKind, Snapshot, TransitionKind},
};

use super::format_instant;

/// Lifecycle phase exposed by the status routes.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// Waiting for the next fixture.
    Idle,
    /// Pre-match thread is up.
    PreMatchPosted,
    /// Live match thread is up and refreshed.
    LiveMatchPosted,
}

impl From<PhaseKind> for VisiblePhase {
    fn from(value: PhaseKind) -> Self {
        match value {
            PhaseKind::Idle => VisiblePhase::Idle,
            PhaseKind::PreMatchPosted => VisiblePhase::PreMatchPosted,
            PhaseKind::LiveMatchPosted => VisiblePhase::LiveMatchPosted,
        }
    }
}

/// Transition currently in flight.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleTransition {
    /// Pre-match thread creation.
    PreMatch,
    /// Live match thread creation.
    LiveMatch,
    /// Post-match thread creation and reset.
    Finalize,
}

impl From<TransitionKind> for VisibleTransition {
    fn from(value: TransitionKind) -> Self {
        match value {
            TransitionKind::PreMatch => VisibleTransition::PreMatch,
            TransitionKind::LiveMatch => VisibleTransition::LiveMatch,
            TransitionKind::Finalize => VisibleTransition::Finalize,
        }
    }
}

/// Snapshot of the lifecycle record returned by `GET /lifecycle`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LifecycleResponse {
    /// Current phase.
    pub phase: VisiblePhase,
    /// Tracked fixture, unset while idle.
    pub fixture_id: Option<u64>,
    /// Live thread id, set only while the live thread is up.
    pub live_thread_id: Option<String>,
    /// Whether events were observed for the live fixture.
    pub events_seen: bool,
    /// Whether post-match content is staged for the finalizer.
    pub post_match_staged: bool,
    /// Number of applied transitions since start-up.
    pub version: usize,
    /// Transition being executed, if any.
    pub pending_transition: Option<VisibleTransition>,
}

impl From<Snapshot> for LifecycleResponse {
    fn from(snapshot: Snapshot) -> Self {
        let live = snapshot.phase.live();
        Self {
            phase: snapshot.phase.kind().into(),
            fixture_id: snapshot.phase.active_fixture_id(),
            live_thread_id: live.map(|live| live.thread_id.clone()),
            events_seen: live.is_some_and(|live| live.events_seen),
            post_match_staged: live.is_some_and(|live| live.staged.is_some()),
            version: snapshot.version,
            pending_transition: snapshot.pending.map(Into::into),
        }
    }
}

/// Match status exposed by the status routes.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleStatus {
    /// Not started.
    Scheduled,
    /// Ball in play.
    InProgress,
    /// Half-time break.
    HalfTime,
    /// Finished.
    Finished,
    /// Abandoned with an awarded result.
    Awarded,
    /// Abandoned without result.
    Abandoned,
    /// Postponed or cancelled.
    Postponed,
}

impl From<FixtureStatus> for VisibleStatus {
    fn from(value: FixtureStatus) -> Self {
        match value {
            FixtureStatus::Scheduled => VisibleStatus::Scheduled,
            FixtureStatus::InProgress => VisibleStatus::InProgress,
            FixtureStatus::HalfTime => VisibleStatus::HalfTime,
            FixtureStatus::Finished => VisibleStatus::Finished,
            FixtureStatus::Abandoned { with_result: true } => VisibleStatus::Awarded,
            FixtureStatus::Abandoned { with_result: false } => VisibleStatus::Abandoned,
            FixtureStatus::Postponed => VisibleStatus::Postponed,
        }
    }
}

/// Fresh summary of the tracked fixture returned by `GET /lifecycle/fixture`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FixtureSummaryResponse {
    /// Provider fixture id.
    pub fixture_id: u64,
    /// Home team name.
    pub home: String,
    /// Away team name.
    pub away: String,
    /// Competition name.
    pub competition: String,
    /// Raw round string.
    pub round: Option<String>,
    /// Kickoff as RFC 3339.
    pub kickoff: String,
    /// Current status.
    pub status: VisibleStatus,
    /// Minutes played.
    pub elapsed: Option<u16>,
    /// Home goals.
    pub home_goals: Option<u16>,
    /// Away goals.
    pub away_goals: Option<u16>,
    /// Number of events reported so far.
    pub events: usize,
}

impl From<FixtureSnapshot> for FixtureSummaryResponse {
    fn from(fixture: FixtureSnapshot) -> Self {
        Self {
            fixture_id: fixture.id,
            home: fixture.home.name,
            away: fixture.away.name,
            competition: fixture.competition.name,
            round: fixture.competition.round,
            kickoff: format_instant(fixture.kickoff),
            status: fixture.status.into(),
            elapsed: fixture.elapsed,
            home_goals: fixture.home_goals,
            away_goals: fixture.away_goals,
            events: fixture.events.len(),
        }
    }
}
