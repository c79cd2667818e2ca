mod config;
mod error;
mod forum;
mod models;

pub use config::RedditConfig;
pub use error::{RedditError, RedditResult};
pub use forum::RedditForum;
