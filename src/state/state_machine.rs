use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

use crate::dao::models::FixtureId;

/// Lifecycle of the tracked fixture's discussion threads.
///
/// Each variant carries exactly the data that is valid in it, so a tracked
/// fixture exists iff the phase is not [`LifecyclePhase::Idle`] and a live
/// thread exists iff the phase is [`LifecyclePhase::LiveMatchPosted`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Waiting for the next fixture to come within the pre-match window.
    Idle,
    /// The pre-match discussion thread exists for the fixture.
    PreMatchPosted {
        /// Fixture being tracked.
        fixture_id: FixtureId,
    },
    /// The live match thread exists and is refreshed by the live-update loop.
    LiveMatchPosted(LiveMatch),
}

/// Data tracked while a match thread is live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMatch {
    /// Fixture being tracked.
    pub fixture_id: FixtureId,
    /// Platform id of the editable live thread.
    pub thread_id: String,
    /// At least one match event has been observed for the fixture.
    pub events_seen: bool,
    /// Post-match content staged when the match was seen finished.
    pub staged: Option<StagedPostMatch>,
}

/// Post-match thread content computed by the live-update loop, consumed by the finalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPostMatch {
    /// Canonical post-match title.
    pub title: String,
    /// Final live body.
    pub body: String,
}

/// Data-less view of [`LifecyclePhase`], cheap to copy and broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// See [`LifecyclePhase::Idle`].
    Idle,
    /// See [`LifecyclePhase::PreMatchPosted`].
    PreMatchPosted,
    /// See [`LifecyclePhase::LiveMatchPosted`].
    LiveMatchPosted,
}

impl PhaseKind {
    /// Stable lowercase label used in logs and DTOs.
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseKind::Idle => "idle",
            PhaseKind::PreMatchPosted => "pre_match_posted",
            PhaseKind::LiveMatchPosted => "live_match_posted",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LifecyclePhase {
    /// Discriminant of the phase.
    pub fn kind(&self) -> PhaseKind {
        match self {
            LifecyclePhase::Idle => PhaseKind::Idle,
            LifecyclePhase::PreMatchPosted { .. } => PhaseKind::PreMatchPosted,
            LifecyclePhase::LiveMatchPosted(_) => PhaseKind::LiveMatchPosted,
        }
    }

    /// Fixture tracked through the pre/live phases.
    pub fn active_fixture_id(&self) -> Option<FixtureId> {
        match self {
            LifecyclePhase::Idle => None,
            LifecyclePhase::PreMatchPosted { fixture_id } => Some(*fixture_id),
            LifecyclePhase::LiveMatchPosted(live) => Some(live.fixture_id),
        }
    }

    /// Live match data, when a match thread is live.
    pub fn live(&self) -> Option<&LiveMatch> {
        match self {
            LifecyclePhase::LiveMatchPosted(live) => Some(live),
            _ => None,
        }
    }
}

/// Transitions that can be planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Publish the pre-match discussion thread.
    PreMatch,
    /// Publish the live match thread.
    LiveMatch,
    /// Publish the post-match thread and return to idle.
    Finalize,
}

/// Outcome of the work performed between plan and apply, carrying the data of the next phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Pre-match thread created or adopted.
    PreMatchPosted {
        /// Fixture the thread belongs to.
        fixture_id: FixtureId,
    },
    /// Live match thread created or adopted.
    LiveMatchPosted {
        /// Fixture the thread belongs to.
        fixture_id: FixtureId,
        /// Platform id of the thread.
        thread_id: String,
    },
    /// Post-match thread created or adopted.
    Finalized,
}

impl LifecycleEvent {
    fn kind(&self) -> TransitionKind {
        match self {
            LifecycleEvent::PreMatchPosted { .. } => TransitionKind::PreMatch,
            LifecycleEvent::LiveMatchPosted { .. } => TransitionKind::LiveMatch,
            LifecycleEvent::Finalized => TransitionKind::Finalize,
        }
    }
}

/// Error returned when a transition is not allowed from the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {kind:?} cannot be planned while {from}")]
pub struct InvalidTransition {
    /// Phase the state machine was in.
    pub from: PhaseKind,
    /// Requested transition.
    pub kind: TransitionKind,
}

/// Errors that can occur when planning a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    AlreadyPending,
    /// The requested transition is not valid from the current phase.
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
    /// The event does not complete the planned transition.
    EventMismatch {
        /// Planned transition.
        expected: TransitionKind,
        /// Transition the event completes.
        got: TransitionKind,
    },
    /// Phase changed since the plan was created.
    PhaseMismatch {
        /// Phase when plan was created.
        expected: PhaseKind,
        /// Current phase.
        actual: PhaseKind,
    },
    /// Version changed since the plan was created.
    VersionMismatch {
        /// Version when plan was created.
        expected: usize,
        /// Current version.
        actual: usize,
    },
}

/// Errors that can occur when aborting a planned transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Live-data update targeted a fixture that is not the live one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fixture {fixture_id} is not the live fixture")]
pub struct NotLive {
    /// Fixture the caller tried to update.
    pub fixture_id: FixtureId,
}

/// Unique identifier for a planned transition.
pub type PlanId = Uuid;

/// A validated transition waiting for its work to complete.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Phase the state machine is currently in.
    pub from: LifecyclePhase,
    /// Requested transition.
    pub kind: TransitionKind,
    /// Version number after applying this transition.
    pub version_next: usize,
    /// Timestamp when this plan was created.
    pub pending_since: Instant,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase.
    pub phase: LifecyclePhase,
    /// Version number (increments on each applied transition).
    pub version: usize,
    /// Pending transition, if one is planned but not yet applied.
    pub pending: Option<TransitionKind>,
}

/// Monotonic `Idle → PreMatchPosted → LiveMatchPosted → Idle` lifecycle.
#[derive(Debug, Clone)]
pub struct LifecycleStateMachine {
    phase: LifecyclePhase,
    version: usize,
    pending: Option<Plan>,
}

impl Default for LifecycleStateMachine {
    fn default() -> Self {
        Self {
            phase: LifecyclePhase::Idle,
            version: 0,
            pending: None,
        }
    }
}

impl LifecycleStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> &LifecyclePhase {
        &self.phase
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase.clone(),
            version: self.version,
            pending: self.pending.as_ref().map(|plan| plan.kind),
        }
    }

    /// Validate that `kind` may run from the current phase and reserve it.
    pub fn plan(&mut self, kind: TransitionKind) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let allowed = matches!(
            (self.phase.kind(), kind),
            (PhaseKind::Idle, TransitionKind::PreMatch)
                | (
                    PhaseKind::Idle | PhaseKind::PreMatchPosted,
                    TransitionKind::LiveMatch
                )
                | (PhaseKind::LiveMatchPosted, TransitionKind::Finalize)
        );
        if !allowed {
            return Err(PlanError::InvalidTransition(InvalidTransition {
                from: self.phase.kind(),
                kind,
            }));
        }

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.phase.clone(),
            kind,
            version_next: self.version + 1,
            pending_since: Instant::now(),
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Complete the pending plan with the event produced by its work.
    pub fn apply(
        &mut self,
        plan_id: PlanId,
        event: LifecycleEvent,
    ) -> Result<LifecyclePhase, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected_plan_id = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected: expected_plan_id,
                got: plan_id,
            });
        }

        if event.kind() != plan.kind {
            return Err(ApplyError::EventMismatch {
                expected: plan.kind,
                got: event.kind(),
            });
        }

        // Live data (events flag, staging) may change while a plan is pending.
        if self.phase.kind() != plan.from.kind()
            || self.phase.active_fixture_id() != plan.from.active_fixture_id()
        {
            return Err(ApplyError::PhaseMismatch {
                expected: plan.from.kind(),
                actual: self.phase.kind(),
            });
        }

        if self.version + 1 != plan.version_next {
            return Err(ApplyError::VersionMismatch {
                expected: plan.version_next,
                actual: self.version + 1,
            });
        }

        self.phase = match event {
            LifecycleEvent::PreMatchPosted { fixture_id } => {
                LifecyclePhase::PreMatchPosted { fixture_id }
            }
            LifecycleEvent::LiveMatchPosted {
                fixture_id,
                thread_id,
            } => LifecyclePhase::LiveMatchPosted(LiveMatch {
                fixture_id,
                thread_id,
                events_seen: false,
                staged: None,
            }),
            LifecycleEvent::Finalized => LifecyclePhase::Idle,
        };
        self.version = plan.version_next;

        Ok(self.phase.clone())
    }

    /// Abort a planned transition without applying it.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    /// Record that events were observed for the live fixture. Never resets.
    pub fn mark_events_seen(&mut self, fixture_id: FixtureId) -> Result<(), NotLive> {
        let live = self.live_mut(fixture_id)?;
        live.events_seen = true;
        Ok(())
    }

    /// Stage the post-match thread for the live fixture, replacing earlier staging.
    pub fn stage_post_match(
        &mut self,
        fixture_id: FixtureId,
        staged: StagedPostMatch,
    ) -> Result<(), NotLive> {
        let live = self.live_mut(fixture_id)?;
        live.staged = Some(staged);
        Ok(())
    }

    fn live_mut(&mut self, fixture_id: FixtureId) -> Result<&mut LiveMatch, NotLive> {
        match &mut self.phase {
            LifecyclePhase::LiveMatchPosted(live) if live.fixture_id == fixture_id => Ok(live),
            _ => Err(NotLive { fixture_id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        sm: &mut LifecycleStateMachine,
        kind: TransitionKind,
        event: LifecycleEvent,
    ) -> LifecyclePhase {
        let plan = sm.plan(kind).unwrap();
        sm.apply(plan.id, event).unwrap()
    }

    fn go_live(sm: &mut LifecycleStateMachine, fixture_id: FixtureId) {
        run(
            sm,
            TransitionKind::LiveMatch,
            LifecycleEvent::LiveMatchPosted {
                fixture_id,
                thread_id: "t1".into(),
            },
        );
    }

    #[test]
    fn initial_state_is_idle() {
        let sm = LifecycleStateMachine::new();
        assert_eq!(sm.phase(), &LifecyclePhase::Idle);
        assert_eq!(sm.phase().active_fixture_id(), None);
    }

    #[test]
    fn full_lifecycle_returns_to_idle() {
        let mut sm = LifecycleStateMachine::new();

        assert_eq!(
            run(
                &mut sm,
                TransitionKind::PreMatch,
                LifecycleEvent::PreMatchPosted { fixture_id: 9 }
            ),
            LifecyclePhase::PreMatchPosted { fixture_id: 9 }
        );
        go_live(&mut sm, 9);
        assert_eq!(sm.phase().live().map(|live| live.thread_id.as_str()), Some("t1"));
        assert_eq!(
            run(&mut sm, TransitionKind::Finalize, LifecycleEvent::Finalized),
            LifecyclePhase::Idle
        );
        assert_eq!(sm.snapshot().version, 3);
    }

    #[test]
    fn late_start_skips_pre_match() {
        let mut sm = LifecycleStateMachine::new();
        go_live(&mut sm, 4);
        assert_eq!(sm.phase().kind(), PhaseKind::LiveMatchPosted);
        assert_eq!(sm.phase().active_fixture_id(), Some(4));
    }

    #[test]
    fn phase_never_regresses() {
        let mut sm = LifecycleStateMachine::new();
        go_live(&mut sm, 4);

        for kind in [TransitionKind::PreMatch, TransitionKind::LiveMatch] {
            let err = sm.plan(kind).unwrap_err();
            assert_eq!(
                err,
                PlanError::InvalidTransition(InvalidTransition {
                    from: PhaseKind::LiveMatchPosted,
                    kind,
                })
            );
        }

        let mut sm = LifecycleStateMachine::new();
        run(
            &mut sm,
            TransitionKind::PreMatch,
            LifecycleEvent::PreMatchPosted { fixture_id: 1 },
        );
        assert!(sm.plan(TransitionKind::PreMatch).is_err());
        assert!(sm.plan(TransitionKind::Finalize).is_err());
    }

    #[test]
    fn idle_is_only_reached_by_finalizing() {
        let mut sm = LifecycleStateMachine::new();
        assert!(sm.plan(TransitionKind::Finalize).is_err());
    }

    #[test]
    fn second_plan_is_rejected_while_pending() {
        let mut sm = LifecycleStateMachine::new();
        sm.plan(TransitionKind::PreMatch).unwrap();
        assert_eq!(
            sm.plan(TransitionKind::LiveMatch).unwrap_err(),
            PlanError::AlreadyPending
        );
    }

    #[test]
    fn mismatched_event_is_rejected() {
        let mut sm = LifecycleStateMachine::new();
        let plan = sm.plan(TransitionKind::PreMatch).unwrap();
        let err = sm.apply(plan.id, LifecycleEvent::Finalized).unwrap_err();
        assert_eq!(
            err,
            ApplyError::EventMismatch {
                expected: TransitionKind::PreMatch,
                got: TransitionKind::Finalize,
            }
        );
        assert_eq!(sm.phase(), &LifecyclePhase::Idle);
    }

    #[test]
    fn abort_clears_pending_and_keeps_phase() {
        let mut sm = LifecycleStateMachine::new();
        let plan = sm.plan(TransitionKind::PreMatch).unwrap();
        sm.abort(plan.id).unwrap();
        assert!(sm.pending.is_none());
        assert_eq!(sm.snapshot().version, 0);
        assert!(sm.plan(TransitionKind::PreMatch).is_ok());
    }

    #[test]
    fn live_data_only_updates_the_live_fixture() {
        let mut sm = LifecycleStateMachine::new();
        assert_eq!(sm.mark_events_seen(4), Err(NotLive { fixture_id: 4 }));

        go_live(&mut sm, 4);
        assert!(sm.mark_events_seen(5).is_err());
        sm.mark_events_seen(4).unwrap();
        sm.stage_post_match(
            4,
            StagedPostMatch {
                title: "title".into(),
                body: "body".into(),
            },
        )
        .unwrap();

        let live = sm.phase().live().unwrap();
        assert!(live.events_seen);
        assert_eq!(live.staged.as_ref().map(|s| s.title.as_str()), Some("title"));

        run(&mut sm, TransitionKind::Finalize, LifecycleEvent::Finalized);
        go_live(&mut sm, 5);
        let live = sm.phase().live().unwrap();
        assert!(!live.events_seen);
        assert!(live.staged.is_none());
    }
}
