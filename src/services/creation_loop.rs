use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    dao::models::{FixtureId, FixtureStatus},
    error::ServiceError,
    services::thread_service::{ThreadOutcome, create_live_match_thread, create_pre_match_thread},
    state::{PhaseKind, SharedState},
};

/// What one creation-loop iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationTick {
    /// The provider has nothing scheduled.
    NoFixture,
    /// The next fixture is already over (stale schedule data).
    Concluded(FixtureId),
    /// The next fixture is outside both windows, or its thread already exists.
    Waiting(FixtureId),
    /// The pre-match thread was created or adopted.
    PreMatch(ThreadOutcome),
    /// The live match thread was created or adopted.
    LiveMatch(ThreadOutcome),
}

/// Poll the schedule every fixture-check interval and open threads as kickoff approaches.
pub async fn run(state: SharedState) {
    let interval = state.config().timings.fixture_check_interval;
    loop {
        match tick(&state, OffsetDateTime::now_utc()).await {
            Ok(outcome) => debug!(?outcome, "creation loop tick finished"),
            Err(err) => warn!(error = %err, "creation loop tick failed"),
        }
        sleep(interval).await;
    }
}

/// One iteration of the creation loop, evaluated at `now`.
///
/// A fixture first seen inside the live window goes straight to the live thread.
pub async fn tick(state: &SharedState, now: OffsetDateTime) -> Result<CreationTick, ServiceError> {
    let Some(fixture) = state.fixtures().next_fixture().await? else {
        info!("no upcoming fixture found");
        return Ok(CreationTick::NoFixture);
    };
    if matches!(
        fixture.status,
        FixtureStatus::Finished | FixtureStatus::Abandoned { .. }
    ) {
        debug!(fixture_id = fixture.id, "next fixture already concluded");
        return Ok(CreationTick::Concluded(fixture.id));
    }

    let timings = &state.config().timings;
    let time_to_kickoff = fixture.kickoff - now;
    let phase = state.lifecycle_phase().await.kind();
    debug!(
        fixture_id = fixture.id,
        seconds_to_kickoff = time_to_kickoff.whole_seconds(),
        phase = %phase,
        "checking next fixture"
    );

    if time_to_kickoff < timings.live_window {
        if phase == PhaseKind::LiveMatchPosted {
            return Ok(CreationTick::Waiting(fixture.id));
        }
        info!(fixture_id = fixture.id, "opening live match thread");
        let outcome = create_live_match_thread(state, fixture).await?;
        return Ok(CreationTick::LiveMatch(outcome));
    }

    if time_to_kickoff < timings.pre_match_window && phase == PhaseKind::Idle {
        info!(fixture_id = fixture.id, "opening pre-match thread");
        let outcome = create_pre_match_thread(state, fixture).await?;
        return Ok(CreationTick::PreMatch(outcome));
    }

    Ok(CreationTick::Waiting(fixture.id))
}
