pub mod reddit;

use crate::dao::models::{CommentRecord, NewPost, ThreadRecord};
use crate::dao::upstream::UpstreamResult;
use futures::future::BoxFuture;

/// Abstraction over the community platform the threads are posted to.
pub trait Forum: Send + Sync {
    /// Publish a new thread and return its platform reference.
    fn create_post(&self, post: NewPost) -> BoxFuture<'static, UpstreamResult<ThreadRecord>>;
    /// Replace the whole body of an existing thread.
    fn edit_post(&self, thread_id: String, body: String) -> BoxFuture<'static, UpstreamResult<()>>;
    /// Newest threads of the community, newest first.
    fn list_recent_posts(&self, limit: usize)
    -> BoxFuture<'static, UpstreamResult<Vec<ThreadRecord>>>;
    /// Newest comments of the community, newest first.
    fn list_recent_comments(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, UpstreamResult<Vec<CommentRecord>>>;
    /// Answer a comment.
    fn reply_to_comment(
        &self,
        comment_id: String,
        body: String,
    ) -> BoxFuture<'static, UpstreamResult<()>>;
    /// Flag a comment so later polls skip it.
    fn mark_comment_handled(&self, comment_id: String) -> BoxFuture<'static, UpstreamResult<()>>;
}
