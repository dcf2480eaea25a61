use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::models::date_stamp;
use super::provider::{FeedError, FeedRequest, StatsSource};

/// Stats service reached over HTTP at `{base}/api/{league}/...`.
pub struct RemoteSource {
    http: Client,
    base: Url,
    base_url: String,
}

impl RemoteSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .with_context(|| format!("Invalid stats API URL '{}'", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("Stats API URL '{}' cannot carry a path", base_url);
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stats-link/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(RemoteSource {
            http,
            base,
            base_url,
        })
    }

    /// Every path part, the event id included, is pushed as one encoded segment.
    pub fn url_for(&self, request: &FeedRequest) -> String {
        let league = request.league();
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", league.as_str(), request.kind()]);
            if let FeedRequest::Matchup(_, event_id) = request {
                segments.push(event_id);
            }
        }
        if let FeedRequest::Scoreboard(_, Some(date)) = request {
            url.query_pairs_mut().append_pair("date", &date_stamp(*date));
        }
        url.into()
    }
}

#[async_trait]
impl StatsSource for RemoteSource {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, request: &FeedRequest) -> Result<serde_json::Value, FeedError> {
        let url = self.url_for(request);
        debug!("Fetching {} from {}", request.kind(), url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FeedError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status { url, status });
        }

        let body = resp.text().await.map_err(|source| FeedError::Transport {
            url: url.clone(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|e| FeedError::Malformed {
            kind: request.kind(),
            origin: url,
            reason: e.to_string(),
        })
    }
}
