use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::dao::{
    forum::Forum,
    models::{CommentRecord, NewPost, ThreadRecord},
    upstream::UpstreamResult,
};

use super::{
    config::RedditConfig,
    error::{RedditError, RedditResult},
    models::{
        COMMENT_PREFIX, CommentData, JsonReply, LINK_PREFIX, LinkData, Listing, SubmitData,
        TokenResponse, bare_id,
    },
};

/// Tokens are refreshed this long before Reddit would expire them.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

struct Credentials {
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
}

struct CachedToken {
    value: Arc<str>,
    expires_at: Instant,
}

/// Reddit client behind the [`Forum`] trait, authenticated with the password grant.
#[derive(Clone)]
pub struct RedditForum {
    client: Client,
    auth_url: Arc<str>,
    api_url: Arc<str>,
    subreddit: Arc<str>,
    flair_template_id: Option<Arc<str>>,
    credentials: Arc<Credentials>,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl RedditForum {
    /// Build the HTTP client; the first token is fetched lazily.
    pub fn new(config: RedditConfig) -> RedditResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|source| RedditError::ClientBuilder { source })?;

        Ok(Self {
            client,
            auth_url: Arc::from(config.auth_url.trim_end_matches('/')),
            api_url: Arc::from(config.api_url.trim_end_matches('/')),
            subreddit: Arc::from(config.subreddit),
            flair_template_id: config.flair_template_id.map(Arc::from),
            credentials: Arc::new(Credentials {
                client_id: config.client_id,
                client_secret: config.client_secret,
                username: config.username,
                password: config.password,
            }),
            token: Arc::new(Mutex::new(None)),
        })
    }

    async fn access_token(&self) -> RedditResult<Arc<str>> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
        }

        const PATH: &str = "/api/v1/access_token";
        let credentials = &self.credentials;
        let response = self
            .client
            .post(format!("{}{}", self.auth_url, PATH))
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|source| RedditError::RequestSend {
                path: PATH.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RedditError::Auth {
                reason: format!("token endpoint answered {}", response.status()),
            });
        }

        let payload = response
            .json::<TokenResponse>()
            .await
            .map_err(|source| RedditError::DecodeResponse {
                path: PATH.to_string(),
                source,
            })?;

        if let Some(reason) = payload.error {
            return Err(RedditError::Auth { reason });
        }
        let value: Arc<str> = payload
            .access_token
            .map(Arc::from)
            .ok_or_else(|| RedditError::Auth {
                reason: "token endpoint returned no access token".into(),
            })?;

        let lifetime = Duration::from_secs(payload.expires_in.unwrap_or(3600));
        debug!(expires_in = lifetime.as_secs(), "refreshed Reddit access token");
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(value)
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> RedditResult<Response> {
        let token = self.access_token().await?;
        let response = builder
            .bearer_auth(token.as_ref())
            .send()
            .await
            .map_err(|source| RedditError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(RedditError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            })
        }
    }

    async fn decode<T>(response: Response, path: &str) -> RedditResult<T>
    where
        T: DeserializeOwned,
    {
        response
            .json::<T>()
            .await
            .map_err(|source| RedditError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    /// GET a JSON document; `raw_json=1` keeps `&`, `<` and `>` unescaped in text fields.
    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> RedditResult<T>
    where
        T: DeserializeOwned,
    {
        let builder = self
            .client
            .get(format!("{}{}", self.api_url, path))
            .query(&[("raw_json", "1")])
            .query(query);
        let response = self.send(builder, path).await?;
        Self::decode(response, path).await
    }

    /// POST an `api_type=json` form and surface errors reported in the reply body.
    async fn post_api<T>(&self, path: &str, form: &[(&str, &str)]) -> RedditResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut fields = form.to_vec();
        fields.push(("api_type", "json"));
        let builder = self
            .client
            .post(format!("{}{}", self.api_url, path))
            .form(&fields);
        let response = self.send(builder, path).await?;
        let reply = Self::decode::<JsonReply<T>>(response, path).await?;

        if let Some(message) = reply.json.error_message() {
            return Err(RedditError::Api {
                path: path.to_string(),
                message,
            });
        }
        Ok(reply.json.data)
    }

    async fn submit(&self, post: &NewPost) -> RedditResult<SubmitData> {
        const PATH: &str = "/api/submit";
        let data = self
            .post_api::<SubmitData>(
                PATH,
                &[
                    ("sr", self.subreddit.as_ref()),
                    ("kind", "self"),
                    ("title", post.title.as_str()),
                    ("text", post.body.as_str()),
                    ("sendreplies", "false"),
                ],
            )
            .await?;

        data.ok_or_else(|| RedditError::Api {
            path: PATH.to_string(),
            message: "submission returned no data".into(),
        })
    }

    /// Flair, sticky to the bottom slot and sort by new; best effort.
    async fn decorate(&self, thread_id: &str) {
        let fullname = format!("{LINK_PREFIX}{thread_id}");

        if let Some(flair) = self.flair_template_id.as_deref() {
            let result = self
                .post_api::<Value>(
                    "/api/selectflair",
                    &[("link", fullname.as_str()), ("flair_template_id", flair)],
                )
                .await;
            if let Err(err) = result {
                warn!(thread_id, error = %err, "failed to flair thread");
            }
        }

        let result = self
            .post_api::<Value>(
                "/api/set_subreddit_sticky",
                &[("id", fullname.as_str()), ("state", "true"), ("num", "2")],
            )
            .await;
        if let Err(err) = result {
            warn!(thread_id, error = %err, "failed to sticky thread");
        }

        let result = self
            .post_api::<Value>(
                "/api/set_suggested_sort",
                &[("id", fullname.as_str()), ("sort", "new")],
            )
            .await;
        if let Err(err) = result {
            warn!(thread_id, error = %err, "failed to set suggested sort");
        }
    }
}

impl Forum for RedditForum {
    fn create_post(&self, post: NewPost) -> BoxFuture<'static, UpstreamResult<ThreadRecord>> {
        let forum = self.clone();
        Box::pin(async move {
            let submitted = forum.submit(&post).await?;
            forum.decorate(&submitted.id).await;
            Ok(ThreadRecord {
                id: submitted.id,
                title: post.title,
                url: submitted.url,
            })
        })
    }

    fn edit_post(&self, thread_id: String, body: String) -> BoxFuture<'static, UpstreamResult<()>> {
        let forum = self.clone();
        Box::pin(async move {
            let fullname = format!("{LINK_PREFIX}{}", bare_id(&thread_id, LINK_PREFIX));
            forum
                .post_api::<Value>(
                    "/api/editusertext",
                    &[("thing_id", fullname.as_str()), ("text", body.as_str())],
                )
                .await?;
            Ok(())
        })
    }

    fn list_recent_posts(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ThreadRecord>>> {
        let forum = self.clone();
        Box::pin(async move {
            let path = format!("/r/{}/new", forum.subreddit);
            let listing = forum
                .get::<Listing<LinkData>>(&path, &[("limit", limit.to_string())])
                .await?;
            Ok(listing
                .data
                .children
                .into_iter()
                .map(|thing| ThreadRecord::from(thing.data))
                .collect())
        })
    }

    fn list_recent_comments(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, UpstreamResult<Vec<CommentRecord>>> {
        let forum = self.clone();
        Box::pin(async move {
            let path = format!("/r/{}/comments", forum.subreddit);
            let listing = forum
                .get::<Listing<CommentData>>(&path, &[("limit", limit.to_string())])
                .await?;
            Ok(listing
                .data
                .children
                .into_iter()
                .map(|thing| CommentRecord::from(thing.data))
                .collect())
        })
    }

    fn reply_to_comment(
        &self,
        comment_id: String,
        body: String,
    ) -> BoxFuture<'static, UpstreamResult<()>> {
        let forum = self.clone();
        Box::pin(async move {
            let fullname = format!("{COMMENT_PREFIX}{}", bare_id(&comment_id, COMMENT_PREFIX));
            forum
                .post_api::<Value>(
                    "/api/comment",
                    &[("thing_id", fullname.as_str()), ("text", body.as_str())],
                )
                .await?;
            Ok(())
        })
    }

    fn mark_comment_handled(&self, comment_id: String) -> BoxFuture<'static, UpstreamResult<()>> {
        let forum = self.clone();
        Box::pin(async move {
            const PATH: &str = "/api/save";
            let fullname = format!("{COMMENT_PREFIX}{}", bare_id(&comment_id, COMMENT_PREFIX));
            let builder = forum
                .client
                .post(format!("{}{}", forum.api_url, PATH))
                .form(&[("id", fullname.as_str())]);
            forum.send(builder, PATH).await?;
            Ok(())
        })
    }
}
