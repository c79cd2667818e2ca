use tracing::debug;

use crate::dao::{forum::Forum, models::ThreadRecord, upstream::UpstreamResult};

/// First post among the `limit` most recent ones whose title equals `title`.
///
/// Best effort only: a post created by someone else between this scan and the
/// subsequent creation, or one that fell out of the recent window, is missed.
pub async fn find_existing(
    forum: &dyn Forum,
    title: &str,
    limit: usize,
) -> UpstreamResult<Option<ThreadRecord>> {
    let recent = forum.list_recent_posts(limit).await?;
    let found = recent.into_iter().find(|post| post.title == title);
    debug!(title, limit, found = found.is_some(), "scanned recent posts");
    Ok(found)
}
