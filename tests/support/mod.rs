#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::{FutureExt, future::BoxFuture};
use match_thread_bot::{
    config::AppConfig,
    dao::{
        fixture_source::FixtureSource,
        forum::Forum,
        models::{
            CommentRecord, Competition, EventKind, FixtureId, FixtureSnapshot, FixtureStatus,
            Injury, MatchEvent, NewPost, StandingsTable, TeamId, TeamRef, ThreadRecord,
        },
        upstream::{UpstreamError, UpstreamResult},
    },
    state::{AppState, SharedState},
};
use time::OffsetDateTime;

pub const HOUSE_TEAM: TeamId = 505;
pub const FIXTURE_ID: FixtureId = 1_208_021;
pub const MOD: &str = "modteam";

/// Configuration with instant retries and one approved moderator.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.approved_users = vec![MOD.into()];
    config.bot_username = "matchbot".into();
    config.timings.events_retry_delay = Duration::from_millis(1);
    config.timings.transition_timeout = Duration::from_secs(5);
    config
}

pub fn app(forum: &FakeForum, fixtures: &FakeFixtures) -> SharedState {
    AppState::new(test_config(), Arc::new(forum.clone()), Arc::new(fixtures.clone()))
}

pub fn team(id: TeamId, name: &str) -> TeamRef {
    TeamRef {
        id,
        name: name.into(),
    }
}

/// Inter vs Milan, Serie A matchday 12, not started.
pub fn fixture(kickoff: OffsetDateTime) -> FixtureSnapshot {
    FixtureSnapshot {
        id: FIXTURE_ID,
        home: team(HOUSE_TEAM, "Inter"),
        away: team(489, "Milan"),
        competition: Competition {
            id: 135,
            name: "Serie A".into(),
            round: Some("Regular Season - 12".into()),
        },
        kickoff,
        venue: Some("Stadio Giuseppe Meazza".into()),
        referee: None,
        status: FixtureStatus::Scheduled,
        elapsed: None,
        home_goals: None,
        away_goals: None,
        events: Vec::new(),
        lineups: None,
        statistics: None,
    }
}

/// The same fixture while being played.
pub fn in_play(
    mut fixture: FixtureSnapshot,
    status: FixtureStatus,
    elapsed: u16,
    score: (u16, u16),
    events: Vec<MatchEvent>,
) -> FixtureSnapshot {
    fixture.status = status;
    fixture.elapsed = Some(elapsed);
    fixture.home_goals = Some(score.0);
    fixture.away_goals = Some(score.1);
    fixture.events = events;
    fixture
}

pub fn goal(minute: u16, team: TeamRef, player: &str) -> MatchEvent {
    MatchEvent {
        kind: EventKind::Goal,
        minute: Some(minute),
        team: Some(team),
        player: Some(player.into()),
        assist: None,
        detail: "Normal Goal".into(),
    }
}

#[derive(Default)]
struct ForumInner {
    posts: Vec<(ThreadRecord, String)>,
    edits: Vec<(String, String)>,
    comments: Vec<CommentRecord>,
    replies: Vec<(String, String)>,
    handled: Vec<String>,
    fail_create: bool,
    list_delay: Option<Duration>,
}

/// In-memory community platform.
#[derive(Clone, Default)]
pub struct FakeForum {
    inner: Arc<Mutex<ForumInner>>,
}

impl FakeForum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Titles of every created post, oldest first.
    pub fn titles(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.posts.iter().map(|(post, _)| post.title.clone()).collect()
    }

    pub fn body_of(&self, title: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .posts
            .iter()
            .find(|(post, _)| post.title == title)
            .map(|(_, body)| body.clone())
    }

    pub fn edits(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().edits.clone()
    }

    pub fn replies(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().replies.clone()
    }

    pub fn handled(&self) -> Vec<String> {
        self.inner.lock().unwrap().handled.clone()
    }

    /// Seed a post made outside the bot (or by a previous run).
    pub fn seed_post(&self, title: &str) -> ThreadRecord {
        let mut inner = self.inner.lock().unwrap();
        let record = next_record(inner.posts.len(), title);
        inner.posts.push((record.clone(), String::new()));
        record
    }

    /// Add a comment; newer comments come first in listings.
    pub fn add_comment(&self, id: &str, author: &str, body: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.comments.insert(
            0,
            CommentRecord {
                id: id.into(),
                author: Some(author.into()),
                body: body.into(),
                handled: false,
            },
        );
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.inner.lock().unwrap().fail_create = fail;
    }

    pub fn set_list_delay(&self, delay: Option<Duration>) {
        self.inner.lock().unwrap().list_delay = delay;
    }
}

fn next_record(index: usize, title: &str) -> ThreadRecord {
    let id = format!("post{}", index + 1);
    ThreadRecord {
        url: format!("https://reddit.test/r/FCInterMilan/comments/{id}"),
        id,
        title: title.into(),
    }
}

fn unavailable(message: &str) -> UpstreamError {
    UpstreamError::unavailable(message.into(), std::io::Error::other(message.to_owned()))
}

impl Forum for FakeForum {
    fn create_post(&self, post: NewPost) -> BoxFuture<'static, UpstreamResult<ThreadRecord>> {
        let inner = self.inner.clone();
        async move {
            let mut inner = inner.lock().unwrap();
            if inner.fail_create {
                return Err(unavailable("submit rejected"));
            }
            let record = next_record(inner.posts.len(), &post.title);
            inner.posts.push((record.clone(), post.body));
            Ok(record)
        }
        .boxed()
    }

    fn edit_post(&self, thread_id: String, body: String) -> BoxFuture<'static, UpstreamResult<()>> {
        let inner = self.inner.clone();
        async move {
            inner.lock().unwrap().edits.push((thread_id, body));
            Ok(())
        }
        .boxed()
    }

    fn list_recent_posts(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ThreadRecord>>> {
        let inner = self.inner.clone();
        async move {
            let (posts, delay) = {
                let inner = inner.lock().unwrap();
                let posts: Vec<ThreadRecord> = inner
                    .posts
                    .iter()
                    .rev()
                    .take(limit)
                    .map(|(post, _)| post.clone())
                    .collect();
                (posts, inner.list_delay)
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(posts)
        }
        .boxed()
    }

    fn list_recent_comments(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, UpstreamResult<Vec<CommentRecord>>> {
        let inner = self.inner.clone();
        async move {
            let inner = inner.lock().unwrap();
            Ok(inner
                .comments
                .iter()
                .take(limit)
                .map(|comment| CommentRecord {
                    handled: inner.handled.contains(&comment.id),
                    ..comment.clone()
                })
                .collect())
        }
        .boxed()
    }

    fn reply_to_comment(
        &self,
        comment_id: String,
        body: String,
    ) -> BoxFuture<'static, UpstreamResult<()>> {
        let inner = self.inner.clone();
        async move {
            inner.lock().unwrap().replies.push((comment_id, body));
            Ok(())
        }
        .boxed()
    }

    fn mark_comment_handled(&self, comment_id: String) -> BoxFuture<'static, UpstreamResult<()>> {
        let inner = self.inner.clone();
        async move {
            inner.lock().unwrap().handled.push(comment_id);
            Ok(())
        }
        .boxed()
    }
}

#[derive(Default)]
struct FixturesInner {
    next: Option<FixtureSnapshot>,
    detail: Option<FixtureSnapshot>,
    queued: VecDeque<UpstreamResult<FixtureSnapshot>>,
    detail_fetches: usize,
    injuries: Vec<Injury>,
    head_to_head: Vec<FixtureSnapshot>,
    standings: StandingsTable,
}

/// In-memory sports-data provider.
///
/// `fixture()` answers from the queued responses first, then from the current detail.
#[derive(Clone, Default)]
pub struct FakeFixtures {
    inner: Arc<Mutex<FixturesInner>>,
}

impl FakeFixtures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the schedule's next fixture and the detail served for it.
    pub fn set_fixture(&self, fixture: Option<FixtureSnapshot>) {
        let mut inner = self.inner.lock().unwrap();
        inner.detail = fixture.clone();
        inner.next = fixture;
    }

    /// Change only the detail served by `fixture()`.
    pub fn set_detail(&self, fixture: FixtureSnapshot) {
        self.inner.lock().unwrap().detail = Some(fixture);
    }

    pub fn queue_detail(&self, response: UpstreamResult<FixtureSnapshot>) {
        self.inner.lock().unwrap().queued.push_back(response);
    }

    pub fn detail_fetches(&self) -> usize {
        self.inner.lock().unwrap().detail_fetches
    }

    pub fn set_injuries(&self, injuries: Vec<Injury>) {
        self.inner.lock().unwrap().injuries = injuries;
    }
}

impl FixtureSource for FakeFixtures {
    fn next_fixture(&self) -> BoxFuture<'static, UpstreamResult<Option<FixtureSnapshot>>> {
        let next = self.inner.lock().unwrap().next.clone();
        async move { Ok(next) }.boxed()
    }

    fn fixture(&self, id: FixtureId) -> BoxFuture<'static, UpstreamResult<FixtureSnapshot>> {
        let response = {
            let mut inner = self.inner.lock().unwrap();
            inner.detail_fetches += 1;
            match inner.queued.pop_front() {
                Some(response) => response,
                None => inner
                    .detail
                    .clone()
                    .filter(|fixture| fixture.id == id)
                    .ok_or_else(|| UpstreamError::malformed(format!("fixture {id} not found"))),
            }
        };
        async move { response }.boxed()
    }

    fn injuries(&self, _id: FixtureId) -> BoxFuture<'static, UpstreamResult<Vec<Injury>>> {
        let injuries = self.inner.lock().unwrap().injuries.clone();
        async move { Ok(injuries) }.boxed()
    }

    fn head_to_head(
        &self,
        _team_a: TeamId,
        _team_b: TeamId,
    ) -> BoxFuture<'static, UpstreamResult<Vec<FixtureSnapshot>>> {
        let meetings = self.inner.lock().unwrap().head_to_head.clone();
        async move { Ok(meetings) }.boxed()
    }

    fn standings(&self, _competition_id: u64) -> BoxFuture<'static, UpstreamResult<StandingsTable>> {
        let table = self.inner.lock().unwrap().standings.clone();
        async move { Ok(table) }.boxed()
    }
}

/// Error the provider returns when it cannot be reached.
pub fn provider_down() -> UpstreamError {
    unavailable("provider down")
}
