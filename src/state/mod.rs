pub mod state_machine;
pub mod transitions;

use std::{sync::Arc, time::Duration};

use dashmap::DashSet;
use tokio::sync::{Mutex, RwLock, watch};
use tokio::time::timeout;
use tracing::warn;

use crate::{
    config::AppConfig,
    dao::{fixture_source::FixtureSource, forum::Forum, models::FixtureId},
    error::ServiceError,
};

pub use self::state_machine::{
    AbortError, ApplyError, LifecycleEvent, LifecyclePhase, LiveMatch, NotLive, PhaseKind, Plan,
    PlanError, PlanId, Snapshot, StagedPostMatch, TransitionKind,
};
use self::state_machine::LifecycleStateMachine;

pub type SharedState = Arc<AppState>;

/// Central application state: configuration, collaborators and the lifecycle record.
pub struct AppState {
    config: AppConfig,
    forum: Arc<dyn Forum>,
    fixtures: Arc<dyn FixtureSource>,
    lifecycle: RwLock<LifecycleStateMachine>,
    phase: watch::Sender<PhaseKind>,
    handled_comments: DashSet<String>,
    transition_gate: Mutex<()>,
    transition_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The lifecycle starts `Idle`; nothing survives a restart.
    pub fn new(
        config: AppConfig,
        forum: Arc<dyn Forum>,
        fixtures: Arc<dyn FixtureSource>,
    ) -> SharedState {
        let (phase_tx, _rx) = watch::channel(PhaseKind::Idle);
        let transition_timeout = Some(config.timings.transition_timeout);
        Arc::new(Self {
            config,
            forum,
            fixtures,
            lifecycle: RwLock::new(LifecycleStateMachine::new()),
            phase: phase_tx,
            handled_comments: DashSet::new(),
            transition_gate: Mutex::new(()),
            transition_timeout,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Community platform client.
    pub fn forum(&self) -> Arc<dyn Forum> {
        Arc::clone(&self.forum)
    }

    /// Sports-data client.
    pub fn fixtures(&self) -> Arc<dyn FixtureSource> {
        Arc::clone(&self.fixtures)
    }

    /// Copy of the current lifecycle phase.
    pub async fn lifecycle_phase(&self) -> LifecyclePhase {
        self.lifecycle.read().await.phase().clone()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let sm = self.lifecycle.read().await;
        sm.snapshot()
    }

    /// Subscribe to applied phase changes.
    pub fn phase_watcher(&self) -> watch::Receiver<PhaseKind> {
        self.phase.subscribe()
    }

    /// Comment ids already answered by this process.
    pub fn handled_comments(&self) -> &DashSet<String> {
        &self.handled_comments
    }

    /// Record that events were observed for the live fixture.
    pub async fn mark_events_seen(&self, fixture_id: FixtureId) -> Result<(), NotLive> {
        let mut sm = self.lifecycle.write().await;
        sm.mark_events_seen(fixture_id)
    }

    /// Stage post-match content for the live fixture.
    pub async fn stage_post_match(
        &self,
        fixture_id: FixtureId,
        staged: StagedPostMatch,
    ) -> Result<(), NotLive> {
        let mut sm = self.lifecycle.write().await;
        sm.stage_post_match(fixture_id, staged)
    }

    /// Broadcast the kind of an applied phase to watchers.
    pub(crate) fn publish_phase(&self, phase: &LifecyclePhase) {
        self.phase.send_replace(phase.kind());
    }

    async fn plan_transition(&self, kind: TransitionKind) -> Result<Plan, PlanError> {
        let mut sm = self.lifecycle.write().await;
        sm.plan(kind)
    }

    async fn apply_planned_transition(
        &self,
        plan_id: PlanId,
        event: LifecycleEvent,
    ) -> Result<LifecyclePhase, ApplyError> {
        let mut sm = self.lifecycle.write().await;
        sm.apply(plan_id, event)
    }

    async fn abort_transition(&self, plan_id: PlanId) -> Result<(), AbortError> {
        let mut sm = self.lifecycle.write().await;
        sm.abort(plan_id)
    }

    /// Plan `kind`, run `work` under the transition timeout, then apply the event it yields.
    ///
    /// Work failures and timeouts abort the plan, leaving the phase untouched.
    pub async fn run_transition<F, Fut, T>(
        &self,
        kind: TransitionKind,
        work: F,
    ) -> Result<(T, LifecyclePhase), ServiceError>
    where
        F: FnOnce(LifecyclePhase) -> Fut,
        Fut: Future<Output = Result<(T, LifecycleEvent), ServiceError>>,
    {
        let gate = self.transition_gate.lock().await;
        let Plan {
            id: plan_id, from, ..
        } = self.plan_transition(kind).await?;

        let work_future = work(from);
        let outcome = if let Some(limit) = self.transition_timeout {
            match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    if let Err(abort_err) = self.abort_transition(plan_id).await {
                        warn!(
                            kind = ?kind,
                            plan_id = %plan_id,
                            error = ?abort_err,
                            "failed to abort transition after timeout"
                        );
                    }
                    drop(gate);
                    return Err(ServiceError::Timeout);
                }
            }
        } else {
            work_future.await
        };

        match outcome {
            Ok((value, event)) => {
                let next = match self.apply_planned_transition(plan_id, event).await {
                    Ok(next) => next,
                    Err(err) => {
                        // A rejected apply keeps the plan only on id mismatch.
                        let _ = self.abort_transition(plan_id).await;
                        drop(gate);
                        return Err(err.into());
                    }
                };
                drop(gate);
                Ok((value, next))
            }
            Err(err) => {
                if let Err(abort_err) = self.abort_transition(plan_id).await {
                    warn!(
                        kind = ?kind,
                        plan_id = %plan_id,
                        error = ?abort_err,
                        "failed to abort transition after work error"
                    );
                }
                drop(gate);
                Err(err)
            }
        }
    }
}
