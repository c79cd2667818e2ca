use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    dao::models::{FixtureId, FixtureSnapshot, FixtureStatus},
    error::ServiceError,
    services::{
        finalizer::finalize,
        render::{post_match_title, render_live_match},
        thread_service::ThreadOutcome,
    },
    state::{LifecyclePhase, LiveMatch, PhaseKind, SharedState, StagedPostMatch},
};

/// What one live-update iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveTick {
    /// No live thread is tracked.
    NotLive,
    /// The live thread was refreshed; the match goes on.
    Updated(FixtureId),
    /// The match ended and the lifecycle was finalized.
    Finalized(ThreadOutcome),
}

/// Refresh the live thread every live-update interval while a match thread is live.
///
/// Sleeps on the phase watcher otherwise, so a new live thread wakes it up.
pub async fn run(state: SharedState) {
    let interval = state.config().timings.live_update_interval;
    let mut phase = state.phase_watcher();
    loop {
        if *phase.borrow_and_update() != PhaseKind::LiveMatchPosted {
            if phase.changed().await.is_err() {
                return;
            }
            continue;
        }

        sleep(interval).await;
        match tick(&state).await {
            Ok(outcome) => debug!(?outcome, "live update tick finished"),
            Err(err) => warn!(error = %err, "live update tick failed"),
        }
    }
}

/// One iteration of the live-update loop.
pub async fn tick(state: &SharedState) -> Result<LiveTick, ServiceError> {
    let LifecyclePhase::LiveMatchPosted(live) = state.lifecycle_phase().await else {
        return Ok(LiveTick::NotLive);
    };

    let fixture = fetch_with_events_retry(state, &live).await?;

    if !fixture.events.is_empty() && state.mark_events_seen(live.fixture_id).await.is_err() {
        debug!(fixture_id = live.fixture_id, "lifecycle moved on during the fetch");
        return Ok(LiveTick::NotLive);
    }

    let body = render_live_match(&fixture, state.config());
    match state
        .forum()
        .edit_post(live.thread_id.clone(), body.clone())
        .await
    {
        Ok(()) => info!(
            fixture_id = fixture.id,
            thread_id = %live.thread_id,
            "updated live match thread"
        ),
        Err(err) => warn!(
            fixture_id = fixture.id,
            thread_id = %live.thread_id,
            error = %err,
            "failed to update live match thread"
        ),
    }

    if !fixture.status.is_terminal() {
        if matches!(
            fixture.status,
            FixtureStatus::Postponed | FixtureStatus::Abandoned { with_result: false }
        ) {
            warn!(
                fixture_id = fixture.id,
                status = ?fixture.status,
                "match stopped without a result; live thread stays open until a manual post command"
            );
        }
        return Ok(LiveTick::Updated(fixture.id));
    }

    let staged = StagedPostMatch {
        title: post_match_title(&fixture, &state.config().matchday_competitions),
        body,
    };
    state.stage_post_match(fixture.id, staged).await?;
    info!(fixture_id = fixture.id, status = ?fixture.status, "match concluded; finalizing");
    let outcome = finalize(state).await?;
    Ok(LiveTick::Finalized(outcome))
}

/// Fetch the live fixture, refetching a bounded number of times when events vanished mid-match.
///
/// Retries only once the match has started and events were seen before; after
/// the last retry the latest payload is used as is.
async fn fetch_with_events_retry(
    state: &SharedState,
    live: &LiveMatch,
) -> Result<FixtureSnapshot, ServiceError> {
    let source = state.fixtures();
    let config = state.config();
    let mut fixture = source.fixture(live.fixture_id).await?;

    let mut retries = 0;
    while live.events_seen && fixture.has_started() && fixture.events.is_empty() {
        if retries >= config.events_retry_limit {
            warn!(
                fixture_id = live.fixture_id,
                retries, "events still missing after retries; using latest payload"
            );
            break;
        }
        retries += 1;
        warn!(
            fixture_id = live.fixture_id,
            attempt = retries,
            "fixture payload lost its events; refetching"
        );
        sleep(config.timings.events_retry_delay).await;
        match source.fixture(live.fixture_id).await {
            Ok(next) => fixture = next,
            Err(err) => {
                warn!(
                    fixture_id = live.fixture_id,
                    error = %err,
                    "refetch failed; using latest payload"
                );
                break;
            }
        }
    }

    Ok(fixture)
}
