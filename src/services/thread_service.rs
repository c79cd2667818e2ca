use tracing::{info, warn};

use crate::{
    dao::models::{FixtureSnapshot, NewPost, ThreadRecord},
    error::ServiceError,
    services::{
        idempotency::find_existing,
        render::{
            PreMatchData, match_thread_title, pre_match_title, render_live_match,
            render_pre_match,
        },
    },
    state::{
        LifecycleEvent, SharedState, TransitionKind, transitions::run_transition_with_broadcast,
    },
};

/// Result of an idempotent thread creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadOutcome {
    /// No thread with the canonical title existed; this one was posted.
    Created(ThreadRecord),
    /// A thread with the canonical title was found among the recent posts.
    Existing(ThreadRecord),
}

impl ThreadOutcome {
    pub fn record(&self) -> &ThreadRecord {
        match self {
            ThreadOutcome::Created(record) | ThreadOutcome::Existing(record) => record,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, ThreadOutcome::Created(_))
    }
}

/// Post a thread titled `title` unless one already exists; `render` runs only when posting.
pub async fn ensure_thread<F, Fut>(
    state: &SharedState,
    title: String,
    render: F,
) -> Result<ThreadOutcome, ServiceError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String, ServiceError>>,
{
    let forum = state.forum();
    if let Some(existing) =
        find_existing(forum.as_ref(), &title, state.config().recent_post_scan).await?
    {
        info!(title = %existing.title, url = %existing.url, "thread already exists; adopting it");
        return Ok(ThreadOutcome::Existing(existing));
    }

    let body = render().await?;
    let record = forum.create_post(NewPost { title, body }).await?;
    info!(title = %record.title, url = %record.url, "created thread");
    Ok(ThreadOutcome::Created(record))
}

/// Create (or adopt) the pre-match thread and move the lifecycle to `PreMatchPosted`.
///
/// Once the lifecycle is past the pre-match phase, the existing thread is returned.
pub async fn create_pre_match_thread(
    state: &SharedState,
    fixture: FixtureSnapshot,
) -> Result<ThreadOutcome, ServiceError> {
    let title = pre_match_title(&fixture, &state.config().matchday_competitions);
    let result =
        run_transition_with_broadcast(state, TransitionKind::PreMatch, |_| {
            let title = title.clone();
            async move {
                let outcome = ensure_thread(state, title, || async {
                    let data = pre_match_data(state, &fixture).await;
                    Ok(render_pre_match(&fixture, &data, state.config()))
                })
                .await?;
                Ok((
                    outcome,
                    LifecycleEvent::PreMatchPosted {
                        fixture_id: fixture.id,
                    },
                ))
            }
        })
        .await;
    adopt_when_rejected(state, &title, result).await
}

/// Create (or adopt) the live match thread and move the lifecycle to `LiveMatchPosted`.
///
/// Once the live thread is tracked, the existing thread is returned.
pub async fn create_live_match_thread(
    state: &SharedState,
    fixture: FixtureSnapshot,
) -> Result<ThreadOutcome, ServiceError> {
    let title = match_thread_title(&fixture, &state.config().matchday_competitions);
    let result =
        run_transition_with_broadcast(state, TransitionKind::LiveMatch, |_| {
            let title = title.clone();
            async move {
                let outcome = ensure_thread(state, title, || async {
                    Ok(render_live_match(&fixture, state.config()))
                })
                .await?;
                let event = LifecycleEvent::LiveMatchPosted {
                    fixture_id: fixture.id,
                    thread_id: outcome.record().id.clone(),
                };
                Ok((outcome, event))
            }
        })
        .await;
    adopt_when_rejected(state, &title, result).await
}

/// Replace a lifecycle rejection by the thread already posted under `title`, if any.
async fn adopt_when_rejected(
    state: &SharedState,
    title: &str,
    result: Result<ThreadOutcome, ServiceError>,
) -> Result<ThreadOutcome, ServiceError> {
    let Err(ServiceError::InvalidState(reason)) = result else {
        return result;
    };
    let forum = state.forum();
    match find_existing(forum.as_ref(), title, state.config().recent_post_scan).await? {
        Some(existing) => {
            info!(title, reason = %reason, "lifecycle already past this thread; linking it");
            Ok(ThreadOutcome::Existing(existing))
        }
        None => Err(ServiceError::InvalidState(reason)),
    }
}

/// Injuries, head-to-head and (for configured competitions) standings.
///
/// Each piece is optional in the body, so a failed fetch only drops its section.
async fn pre_match_data(state: &SharedState, fixture: &FixtureSnapshot) -> PreMatchData {
    let source = state.fixtures();
    let config = state.config();

    let injuries = source.injuries(fixture.id).await.unwrap_or_else(|err| {
        warn!(fixture_id = fixture.id, error = %err, "failed to fetch injuries");
        Vec::new()
    });

    let head_to_head = source
        .head_to_head(fixture.home.id, fixture.away.id)
        .await
        .unwrap_or_else(|err| {
            warn!(fixture_id = fixture.id, error = %err, "failed to fetch head-to-head");
            Vec::new()
        });

    let shows_standings = config
        .standings_competitions
        .iter()
        .any(|name| name.eq_ignore_ascii_case(&fixture.competition.name));
    let standings = if shows_standings {
        match source.standings(fixture.competition.id).await {
            Ok(table) => Some(table),
            Err(err) => {
                warn!(
                    competition = %fixture.competition.name,
                    error = %err,
                    "failed to fetch standings"
                );
                None
            }
        }
    } else {
        None
    };

    PreMatchData {
        standings,
        injuries,
        head_to_head,
    }
}
