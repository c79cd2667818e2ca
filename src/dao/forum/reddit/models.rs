use serde::Deserialize;
use serde_json::Value;

use crate::dao::models::{CommentRecord, ThreadRecord};

pub const LINK_PREFIX: &str = "t3_";
pub const COMMENT_PREFIX: &str = "t1_";

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
}

/// `{"json": {"errors": [...], "data": {...}}}` answer of `api_type=json` endpoints.
#[derive(Debug, Deserialize)]
pub struct JsonReply<T> {
    pub json: JsonReplyBody<T>,
}

#[derive(Debug, Deserialize)]
pub struct JsonReplyBody<T> {
    #[serde(default)]
    pub errors: Vec<Value>,
    pub data: Option<T>,
}

impl<T> JsonReplyBody<T> {
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|error| match error {
                    Value::Array(parts) => parts
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(": "),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitData {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct LinkData {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl From<LinkData> for ThreadRecord {
    fn from(link: LinkData) -> Self {
        ThreadRecord {
            id: link.id,
            title: link.title,
            url: link.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentData {
    pub id: String,
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub saved: bool,
}

impl From<CommentData> for CommentRecord {
    fn from(comment: CommentData) -> Self {
        CommentRecord {
            id: comment.id,
            // Deleted accounts are reported as "[deleted]".
            author: comment.author.filter(|author| author != "[deleted]"),
            body: comment.body,
            handled: comment.saved,
        }
    }
}

/// Strip a `t1_`/`t3_` kind prefix if the caller passed a fullname.
pub fn bare_id<'a>(id: &'a str, prefix: &str) -> &'a str {
    id.strip_prefix(prefix).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_errors_are_flattened() {
        let reply: JsonReply<SubmitData> = serde_json::from_value(json!({
            "json": { "errors": [["RATELIMIT", "you are doing that too much", "ratelimit"]] }
        }))
        .unwrap();

        assert_eq!(
            reply.json.error_message().as_deref(),
            Some("RATELIMIT: you are doing that too much: ratelimit")
        );
        assert!(reply.json.data.is_none());
    }

    #[test]
    fn deleted_authors_are_dropped() {
        let comment: CommentData = serde_json::from_value(json!({
            "id": "abc", "author": "[deleted]", "body": "!bot pre", "saved": true
        }))
        .unwrap();
        let record = CommentRecord::from(comment);

        assert_eq!(record.author, None);
        assert!(record.handled);
    }

    #[test]
    fn fullnames_are_reduced_to_ids() {
        assert_eq!(bare_id("t3_xyz", LINK_PREFIX), "xyz");
        assert_eq!(bare_id("xyz", LINK_PREFIX), "xyz");
    }
}
