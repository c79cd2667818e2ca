use tracing::info;

use crate::{
    error::ServiceError,
    services::{
        render::{post_match_title, render_live_match},
        thread_service::{ThreadOutcome, ensure_thread},
    },
    state::{
        LifecycleEvent, LifecyclePhase, SharedState, StagedPostMatch, TransitionKind,
        transitions::run_transition_with_broadcast,
    },
};

/// Post the post-match thread (unless it exists) and return the lifecycle to `Idle`.
///
/// Uses the content staged by the live-update loop; when nothing was staged
/// (manual command) the fixture is fetched and rendered on the spot. Finding an
/// existing thread still resets the lifecycle. A failed creation aborts the
/// transition, so the live-update loop tries again on its next tick.
pub async fn finalize(state: &SharedState) -> Result<ThreadOutcome, ServiceError> {
    run_transition_with_broadcast(state, TransitionKind::Finalize, |from| async move {
        let from_kind = from.kind();
        let LifecyclePhase::LiveMatchPosted(live) = from else {
            return Err(ServiceError::InvalidState(format!(
                "cannot finalize while {from_kind}"
            )));
        };

        let staged = match live.staged {
            Some(staged) => staged,
            None => {
                let fixture = state.fixtures().fixture(live.fixture_id).await?;
                StagedPostMatch {
                    title: post_match_title(&fixture, &state.config().matchday_competitions),
                    body: render_live_match(&fixture, state.config()),
                }
            }
        };

        let StagedPostMatch { title, body } = staged;
        let outcome = ensure_thread(state, title, || async move { Ok(body) }).await?;
        info!(
            fixture_id = live.fixture_id,
            created = outcome.was_created(),
            "post-match thread settled"
        );
        Ok((outcome, LifecycleEvent::Finalized))
    })
    .await
}
