//! Offline source: a directory of pre-harvested JSON files.
//!
//! Layout, one directory per league:
//! ```text
//!  {data_dir}/nba/scoreboard.json            today's slate
//!  {data_dir}/nba/scoreboard_20251102.json   a dated slate
//!  {data_dir}/nba/schedule.json
//!  {data_dir}/nba/teams.json
//!  {data_dir}/nba/standings.json
//! ```
//! Snapshots carry no per-event detail, so matchups are never served.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::models::date_stamp;
use super::provider::{FeedError, FeedRequest, StatsSource};

pub struct SnapshotSource {
    data_dir: PathBuf,
    name: String,
}

impl SnapshotSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let name = format!("snapshot:{}", data_dir.display());
        SnapshotSource { data_dir, name }
    }

    /// File backing a request, or `None` when snapshots cannot answer it.
    pub fn path_for(&self, request: &FeedRequest) -> Option<PathBuf> {
        let file = match request {
            FeedRequest::Matchup(..) => return None,
            FeedRequest::Scoreboard(_, Some(date)) => {
                format!("scoreboard_{}.json", date_stamp(*date))
            }
            other => format!("{}.json", other.kind()),
        };
        Some(self.data_dir.join(request.league().as_str()).join(file))
    }
}

#[async_trait]
impl StatsSource for SnapshotSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, request: &FeedRequest) -> Result<serde_json::Value, FeedError> {
        let path = self.path_for(request).ok_or_else(|| FeedError::Unsupported {
            kind: request.kind(),
            origin: self.name.clone(),
        })?;
        debug!("Reading {} snapshot {}", request.kind(), path.display());

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FeedError::Missing(path))
            }
            Err(source) => return Err(FeedError::Io { path, source }),
        };

        serde_json::from_str(&content).map_err(|e| FeedError::Malformed {
            kind: request.kind(),
            origin: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
