use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use super::models::LeagueId;

/// One document the feed can be asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedRequest {
    Schedule(LeagueId),
    /// `None` means the source's own notion of "today".
    Scoreboard(LeagueId, Option<NaiveDate>),
    Teams(LeagueId),
    Standings(LeagueId),
    Matchup(LeagueId, String),
}

impl FeedRequest {
    pub fn league(&self) -> LeagueId {
        match self {
            FeedRequest::Schedule(l)
            | FeedRequest::Scoreboard(l, _)
            | FeedRequest::Teams(l)
            | FeedRequest::Standings(l)
            | FeedRequest::Matchup(l, _) => *l,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FeedRequest::Schedule(_) => "schedule",
            FeedRequest::Scoreboard(..) => "scoreboard",
            FeedRequest::Teams(_) => "teams",
            FeedRequest::Standings(_) => "standings",
            FeedRequest::Matchup(..) => "matchup",
        }
    }
}

/// Why a document could not be produced. Never leaves the feed client:
/// callers only see `None`.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no snapshot file at {0}")]
    Missing(PathBuf),

    #[error("malformed {kind} document from {origin}: {reason}")]
    Malformed {
        kind: &'static str,
        origin: String,
        reason: String,
    },

    #[error("{kind} is not available from {origin}")]
    Unsupported { kind: &'static str, origin: String },
}

/// Trait every stats-document source must implement.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch the raw JSON for one request, exactly once.
    async fn fetch(&self, request: &FeedRequest) -> Result<serde_json::Value, FeedError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
