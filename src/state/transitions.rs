use tracing::info;

use crate::{
    error::ServiceError,
    state::{LifecycleEvent, LifecyclePhase, SharedState, TransitionKind},
};

/// Execute a planned lifecycle transition, then broadcast and log the resulting phase.
pub async fn run_transition_with_broadcast<F, Fut, T>(
    state: &SharedState,
    kind: TransitionKind,
    work: F,
) -> Result<T, ServiceError>
where
    F: FnOnce(LifecyclePhase) -> Fut,
    Fut: Future<Output = Result<(T, LifecycleEvent), ServiceError>>,
{
    let (res, next) = state.run_transition(kind, work).await?;
    state.publish_phase(&next);
    info!(
        phase = %next.kind(),
        fixture_id = ?next.active_fixture_id(),
        "lifecycle phase changed"
    );
    Ok(res)
}
