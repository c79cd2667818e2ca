use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    dao::models::{CommentRecord, FixtureSnapshot},
    error::ServiceError,
    services::{
        finalizer::finalize,
        thread_service::{ThreadOutcome, create_live_match_thread, create_pre_match_thread},
    },
    state::SharedState,
};

pub const INSUFFICIENT_PERMISSIONS: &str =
    "🤖 Beep Boop... Insufficient permissions, this command is reserved for Mod team only.";

/// Thread commands recognised in comments (`<prefix> pre|live|post`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadCommand {
    /// Open the pre-match discussion thread.
    PreMatch,
    /// Open the live match thread.
    LiveMatch,
    /// Open the post-match discussion thread and reset the lifecycle.
    PostMatch,
}

impl ThreadCommand {
    fn label(self) -> &'static str {
        match self {
            ThreadCommand::PreMatch => "pre-match discussion thread",
            ThreadCommand::LiveMatch => "match discussion thread",
            ThreadCommand::PostMatch => "post-match discussion thread",
        }
    }

    /// Confirmation sent after a successful command.
    pub fn reply(self, outcome: &ThreadOutcome) -> String {
        let url = &outcome.record().url;
        if outcome.was_created() {
            format!("🤖 Beep Boop... Created {} here: {url}.", self.label())
        } else {
            let label = self.label();
            let mut chars = label.chars();
            let capitalized = chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default();
            format!("🤖 Beep Boop... {capitalized} already exists here: {url}.")
        }
    }
}

/// Find a thread command in a comment body; matching is case-insensitive.
pub fn parse_command(body: &str, prefix: &str) -> Option<ThreadCommand> {
    let body = body.to_lowercase();
    let prefix = prefix.to_lowercase();
    [
        ("pre", ThreadCommand::PreMatch),
        ("live", ThreadCommand::LiveMatch),
        ("post", ThreadCommand::PostMatch),
    ]
    .into_iter()
    .find(|(word, _)| body.contains(&format!("{prefix} {word}")))
    .map(|(_, command)| command)
}

/// Poll recent comments and run thread commands until shutdown.
///
/// A failed listing pauses the loop for the fixed failure backoff.
pub async fn run(state: SharedState) {
    let timings = state.config().timings.clone();
    loop {
        match poll(&state).await {
            Ok(handled) => {
                if handled > 0 {
                    debug!(handled, "processed comment commands");
                }
                sleep(timings.comment_poll_interval).await;
            }
            Err(err) => {
                warn!(error = %err, "failed to read comments; backing off");
                sleep(timings.comment_failure_backoff).await;
            }
        }
    }
}

/// Handle every unprocessed command among the recent comments, oldest first.
pub async fn poll(state: &SharedState) -> Result<usize, ServiceError> {
    let forum = state.forum();
    let config = state.config();
    let comments = forum.list_recent_comments(config.recent_comment_scan).await?;

    let mut handled = 0;
    for comment in comments.into_iter().rev() {
        if comment.handled || state.handled_comments().contains(&comment.id) {
            continue;
        }
        let Some(author) = comment.author.as_deref() else {
            continue;
        };
        if author.eq_ignore_ascii_case(&config.bot_username) {
            continue;
        }
        let Some(command) = parse_command(&comment.body, &config.command_prefix) else {
            continue;
        };

        info!(author, command = ?command, comment_id = %comment.id, "thread command received");
        handle_command(state, &comment, author, command).await;
        state.handled_comments().insert(comment.id.clone());
        if let Err(err) = forum.mark_comment_handled(comment.id.clone()).await {
            warn!(comment_id = %comment.id, error = %err, "failed to mark comment as handled");
        }
        handled += 1;
    }
    Ok(handled)
}

async fn handle_command(
    state: &SharedState,
    comment: &CommentRecord,
    author: &str,
    command: ThreadCommand,
) {
    if !state.config().is_approved(author) {
        info!(author, "thread command rejected: not an approved user");
        reply(state, comment, INSUFFICIENT_PERMISSIONS.to_owned()).await;
        return;
    }

    match run_command(state, command).await {
        Ok(outcome) => reply(state, comment, command.reply(&outcome)).await,
        Err(err) => warn!(command = ?command, error = %err, "thread command failed"),
    }
}

/// Run the lifecycle transition behind `command`.
///
/// A command for a phase already reached links the existing thread.
pub async fn run_command(
    state: &SharedState,
    command: ThreadCommand,
) -> Result<ThreadOutcome, ServiceError> {
    match command {
        ThreadCommand::PostMatch => finalize(state).await,
        ThreadCommand::PreMatch => {
            let fixture = command_fixture(state).await?;
            create_pre_match_thread(state, fixture).await
        }
        ThreadCommand::LiveMatch => {
            let fixture = command_fixture(state).await?;
            create_live_match_thread(state, fixture).await
        }
    }
}

/// Fixture a command refers to: the tracked one, else the next scheduled one.
async fn command_fixture(state: &SharedState) -> Result<FixtureSnapshot, ServiceError> {
    let source = state.fixtures();
    match state.lifecycle_phase().await.active_fixture_id() {
        Some(id) => Ok(source.fixture(id).await?),
        None => source
            .next_fixture()
            .await?
            .ok_or_else(|| ServiceError::NotFound("no upcoming fixture".into())),
    }
}

async fn reply(state: &SharedState, comment: &CommentRecord, body: String) {
    if let Err(err) = state.forum().reply_to_comment(comment.id.clone(), body).await {
        warn!(comment_id = %comment.id, error = %err, "failed to reply to comment");
    }
}
