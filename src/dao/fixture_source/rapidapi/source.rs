use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::de::DeserializeOwned;
use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

use crate::dao::{
    fixture_source::FixtureSource,
    models::{FixtureId, FixtureSnapshot, Injury, StandingsTable, TeamId},
    upstream::UpstreamResult,
};

use super::{
    config::RapidApiConfig,
    error::{RapidApiError, RapidApiResult},
    models::{Envelope, RawFixtureItem, RawInjuryItem, RawStandingsItem, convert_standings},
};

/// API-Football client behind the [`FixtureSource`] trait.
#[derive(Clone)]
pub struct RapidApiFixtureSource {
    client: Client,
    base_url: Arc<str>,
    host: Arc<str>,
    api_key: Arc<str>,
    team_id: u64,
}

impl RapidApiFixtureSource {
    /// Build the HTTP client; no request is sent until the first lookup.
    pub fn new(config: RapidApiConfig) -> RapidApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| RapidApiError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            host: Arc::from(config.host),
            api_key: Arc::from(config.api_key),
            team_id: config.team_id,
        })
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> RapidApiResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(path, "querying sports-data provider");

        let response = self
            .client
            .get(url)
            .query(query)
            .header("x-rapidapi-host", self.host.as_ref())
            .header("x-rapidapi-key", self.api_key.as_ref())
            .send()
            .await
            .map_err(|source| RapidApiError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RapidApiError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            });
        }

        let envelope = response
            .json::<Envelope<T>>()
            .await
            .map_err(|source| RapidApiError::DecodeResponse {
                path: path.to_string(),
                source,
            })?;

        if let Some(message) = envelope.error_message() {
            return Err(RapidApiError::Api {
                path: path.to_string(),
                message,
            });
        }

        Ok(envelope.into_items())
    }

    async fn fetch_fixtures(&self, query: &[(&str, String)]) -> RapidApiResult<Vec<RawFixtureItem>> {
        self.get::<RawFixtureItem>("/v3/fixtures", query).await
    }
}

fn convert(path: &str, raw: RawFixtureItem) -> RapidApiResult<FixtureSnapshot> {
    FixtureSnapshot::try_from(raw).map_err(|reason| RapidApiError::Incomplete {
        path: path.to_string(),
        reason: reason.to_string(),
    })
}

/// Season the provider files a date under: seasons start in August.
pub fn active_season(today: Date) -> i32 {
    if u8::from(today.month()) <= 7 {
        today.year() - 1
    } else {
        today.year()
    }
}

impl FixtureSource for RapidApiFixtureSource {
    fn next_fixture(&self) -> BoxFuture<'static, UpstreamResult<Option<FixtureSnapshot>>> {
        let source = self.clone();
        Box::pin(async move {
            let query = [("team", source.team_id.to_string()), ("next", "1".into())];
            let items = source.fetch_fixtures(&query).await?;
            match items.into_iter().next() {
                Some(raw) => Ok(Some(convert("/v3/fixtures?next", raw)?)),
                None => Ok(None),
            }
        })
    }

    fn fixture(&self, id: FixtureId) -> BoxFuture<'static, UpstreamResult<FixtureSnapshot>> {
        let source = self.clone();
        Box::pin(async move {
            let items = source.fetch_fixtures(&[("id", id.to_string())]).await?;
            let raw = items.into_iter().next().ok_or_else(|| RapidApiError::Incomplete {
                path: "/v3/fixtures?id".into(),
                reason: format!("fixture {id} not found"),
            })?;
            Ok(convert("/v3/fixtures?id", raw)?)
        })
    }

    fn injuries(&self, id: FixtureId) -> BoxFuture<'static, UpstreamResult<Vec<Injury>>> {
        let source = self.clone();
        Box::pin(async move {
            let items = source
                .get::<RawInjuryItem>("/v3/injuries", &[("fixture", id.to_string())])
                .await?;
            Ok(items.into_iter().map(Injury::from).collect())
        })
    }

    fn head_to_head(
        &self,
        team_a: TeamId,
        team_b: TeamId,
    ) -> BoxFuture<'static, UpstreamResult<Vec<FixtureSnapshot>>> {
        let source = self.clone();
        Box::pin(async move {
            const PATH: &str = "/v3/fixtures/headtohead";
            let items = source
                .get::<RawFixtureItem>(PATH, &[("h2h", format!("{team_a}-{team_b}"))])
                .await?;

            Ok(items
                .into_iter()
                .filter_map(|raw| match convert(PATH, raw) {
                    Ok(snapshot) => Some(snapshot),
                    Err(err) => {
                        warn!(error = %err, "skipping head-to-head fixture");
                        None
                    }
                })
                .collect())
        })
    }

    fn standings(&self, competition_id: u64) -> BoxFuture<'static, UpstreamResult<StandingsTable>> {
        let source = self.clone();
        Box::pin(async move {
            let season = active_season(OffsetDateTime::now_utc().date());
            let query = [
                ("league", competition_id.to_string()),
                ("season", season.to_string()),
            ];
            let items = source
                .get::<RawStandingsItem>("/v3/standings", &query)
                .await?;
            Ok(convert_standings(items))
        })
    }
}
