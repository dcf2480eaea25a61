use anyhow::Result;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::models::{LeagueId, MatchupDoc, ScheduleDoc, ScoreboardDoc, Team};
use super::provider::{FeedError, FeedRequest, StatsSource};
use super::remote::RemoteSource;
use super::snapshot::SnapshotSource;

/// Uniform access to stats documents. Every public fetch degrades to `None`
/// on any failure; the reason is logged, never returned.
#[derive(Clone)]
pub struct FeedClient {
    source: Arc<dyn StatsSource>,
}

impl FeedClient {
    pub fn new(source: Arc<dyn StatsSource>) -> Self {
        FeedClient { source }
    }

    /// Network source when a base URL is configured, snapshot directory otherwise.
    pub fn from_settings(
        base_url: Option<&str>,
        data_dir: &Path,
        timeout: Duration,
    ) -> Result<Self> {
        let source: Arc<dyn StatsSource> = match base_url {
            Some(base) => Arc::new(RemoteSource::new(base, timeout)?),
            None => Arc::new(SnapshotSource::new(data_dir)),
        };
        info!("Stats feed source: {}", source.name());
        Ok(FeedClient::new(source))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub async fn fetch_schedule(&self, league: LeagueId) -> Option<ScheduleDoc> {
        let request = FeedRequest::Schedule(league);
        let result = self.fetch_doc(&request).await;
        self.settle(&request, result)
    }

    /// `date = None` asks for the source's own "today".
    pub async fn fetch_scoreboard(
        &self,
        league: LeagueId,
        date: Option<NaiveDate>,
    ) -> Option<ScoreboardDoc> {
        let request = FeedRequest::Scoreboard(league, date);
        let result = self.fetch_doc(&request).await;
        self.settle(&request, result)
    }

    pub async fn fetch_matchup(&self, league: LeagueId, event_id: &str) -> Option<MatchupDoc> {
        let request = FeedRequest::Matchup(league, event_id.to_string());
        let result = self.fetch_doc(&request).await;
        self.settle(&request, result)
    }

    pub async fn fetch_teams(&self, league: LeagueId) -> Option<Vec<Team>> {
        let request = FeedRequest::Teams(league);
        let result = match self.fetch_payload(&request).await {
            Ok(payload) => collect_teams(payload).map_err(|e| self.malformed(&request, e)),
            Err(e) => Err(e),
        };
        self.settle(&request, result)
    }

    pub async fn fetch_standings(&self, league: LeagueId) -> Option<Value> {
        let request = FeedRequest::Standings(league);
        let result = self.fetch_payload(&request).await;
        self.settle(&request, result)
    }

    async fn fetch_payload(&self, request: &FeedRequest) -> Result<Value, FeedError> {
        self.source.fetch(request).await.map(unwrap_envelope)
    }

    async fn fetch_doc<T: DeserializeOwned>(&self, request: &FeedRequest) -> Result<T, FeedError> {
        let payload = self.fetch_payload(request).await?;
        serde_json::from_value(payload).map_err(|e| self.malformed(request, e))
    }

    fn malformed(&self, request: &FeedRequest, e: serde_json::Error) -> FeedError {
        FeedError::Malformed {
            kind: request.kind(),
            origin: self.source.name().to_string(),
            reason: e.to_string(),
        }
    }

    /// Collapse the tagged result to the public `Option` contract.
    fn settle<T>(&self, request: &FeedRequest, result: Result<T, FeedError>) -> Option<T> {
        match result {
            Ok(doc) => Some(doc),
            Err(e @ (FeedError::Missing(_) | FeedError::Unsupported { .. })) => {
                debug!("{} {} unavailable: {}", request.league(), request.kind(), e);
                None
            }
            Err(e) => {
                warn!("{} {} fetch failed: {}", request.league(), request.kind(), e);
                None
            }
        }
    }
}

/// Harvested snapshots wrap the payload as `{league, data_type, harvested_at, data}`.
fn unwrap_envelope(doc: Value) -> Value {
    match doc {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Teams arrive either as a flat list or nested as
/// `sports[].leagues[].teams[].team`.
fn collect_teams(payload: Value) -> Result<Vec<Team>, serde_json::Error> {
    if payload.is_array() {
        return serde_json::from_value(payload);
    }
    let mut teams = Vec::new();
    let sports = payload["sports"].as_array().cloned().unwrap_or_default();
    for sport in sports {
        for league in sport["leagues"].as_array().into_iter().flatten() {
            for item in league["teams"].as_array().into_iter().flatten() {
                if let Some(team) = item.get("team") {
                    teams.push(serde_json::from_value(team.clone())?);
                }
            }
        }
    }
    Ok(teams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::testing::{
        client_for, event, scoreboard, FailingSource, MemorySource, ScratchDir,
    };
    use serde_json::json;

    #[tokio::test]
    async fn test_every_operation_degrades_to_none_on_failure() {
        let feed = FeedClient::new(Arc::new(FailingSource));
        assert!(feed.fetch_schedule(LeagueId::Nba).await.is_none());
        assert!(feed.fetch_scoreboard(LeagueId::Nba, None).await.is_none());
        assert!(feed
            .fetch_scoreboard(LeagueId::Nba, NaiveDate::from_ymd_opt(2025, 1, 1))
            .await
            .is_none());
        assert!(feed.fetch_matchup(LeagueId::Nba, "401").await.is_none());
        assert!(feed.fetch_teams(LeagueId::Nba).await.is_none());
        assert!(feed.fetch_standings(LeagueId::Nba).await.is_none());
    }

    #[tokio::test]
    async fn test_data_envelope_is_unwrapped() {
        let (feed, _) = client_for(MemorySource::new().with(
            FeedRequest::Scoreboard(LeagueId::Nhl, None),
            json!({
                "league": "nhl",
                "data_type": "scoreboard",
                "harvested_at": "2025-10-22T08:00:00",
                "data": scoreboard(vec![event("1", &["Boston Bruins", "Toronto Maple Leafs"])]),
            }),
        ));
        let doc = feed.fetch_scoreboard(LeagueId::Nhl, None).await.unwrap();
        assert_eq!(doc.events.len(), 1);
        assert_eq!(doc.events[0].id, "1");
    }

    #[tokio::test]
    async fn test_bare_document_passes_through() {
        let (feed, _) = client_for(MemorySource::new().with(
            FeedRequest::Schedule(LeagueId::Mlb),
            scoreboard(vec![event("7", &["New York Yankees", "Boston Red Sox"])]),
        ));
        let doc = feed.fetch_schedule(LeagueId::Mlb).await.unwrap();
        assert_eq!(doc.events[0].id, "7");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_none() {
        let (feed, _) = client_for(MemorySource::new().with(
            FeedRequest::Scoreboard(LeagueId::Nba, None),
            json!({"events": "not a list"}),
        ));
        assert!(feed.fetch_scoreboard(LeagueId::Nba, None).await.is_none());
    }

    #[tokio::test]
    async fn test_teams_accept_flat_and_nested_shapes() {
        let (feed, _) = client_for(
            MemorySource::new()
                .with(
                    FeedRequest::Teams(LeagueId::Nba),
                    json!([{"displayName": "Chicago Bulls"}]),
                )
                .with(
                    FeedRequest::Teams(LeagueId::Nfl),
                    json!({"data": {"sports": [{"leagues": [{"teams": [
                        {"team": {"displayName": "Green Bay Packers"}},
                        {"team": {"displayName": "Chicago Bears"}}
                    ]}]}]}}),
                ),
        );
        let flat = feed.fetch_teams(LeagueId::Nba).await.unwrap();
        assert_eq!(flat[0].display_name.as_deref(), Some("Chicago Bulls"));
        let nested = feed.fetch_teams(LeagueId::Nfl).await.unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[1].display_name.as_deref(), Some("Chicago Bears"));
    }

    #[tokio::test]
    async fn test_snapshot_mode_reads_files_and_refuses_matchups() {
        let dir = ScratchDir::new("feed-snapshot");
        dir.write(
            "nba/scoreboard_20251023.json",
            &json!({"data": scoreboard(vec![event("55", &["Miami Heat", "Orlando Magic"])])})
                .to_string(),
        );
        let feed = FeedClient::from_settings(None, dir.path(), Duration::from_secs(1)).unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 10, 23);
        let doc = feed.fetch_scoreboard(LeagueId::Nba, date).await.unwrap();
        assert_eq!(doc.events[0].id, "55");
        assert!(feed.fetch_scoreboard(LeagueId::Nba, None).await.is_none());
        assert!(feed.fetch_matchup(LeagueId::Nba, "55").await.is_none());
    }

    #[tokio::test]
    async fn test_remote_mode_fetches_matchup() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/nba/matchup/401")
            .with_status(200)
            .with_body(r#"{"event_id": "401", "comparison": [{"label": "PPG", "a": "112.1", "b": "108.4"}]}"#)
            .create_async()
            .await;

        let feed = FeedClient::from_settings(
            Some(server.url().as_str()),
            Path::new("unused"),
            Duration::from_secs(5),
        )
        .unwrap();
        let doc = feed.fetch_matchup(LeagueId::Nba, "401").await.unwrap();
        assert_eq!(doc.comparison.len(), 1);
        assert_eq!(doc.comparison[0].label, "PPG");
    }

    #[test]
    fn test_null_data_key_is_not_unwrapped() {
        let doc = json!({"data": null, "events": []});
        assert_eq!(unwrap_envelope(doc.clone()), doc);
    }
}
