//! Test doubles shared by the stats modules.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::feed::FeedClient;
use super::provider::{FeedError, FeedRequest, StatsSource};

/// In-memory source answering from a fixed table and recording every request.
#[derive(Default)]
pub struct MemorySource {
    docs: HashMap<FeedRequest, Value>,
    requests: Mutex<Vec<FeedRequest>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, request: FeedRequest, doc: Value) -> Self {
        self.docs.insert(request, doc);
        self
    }

    pub fn requests(&self) -> Vec<FeedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatsSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, request: &FeedRequest) -> Result<Value, FeedError> {
        self.requests.lock().unwrap().push(request.clone());
        self.docs
            .get(request)
            .cloned()
            .ok_or_else(|| FeedError::Missing(PathBuf::from(request.kind())))
    }
}

/// Source whose every fetch fails with an HTTP 503.
pub struct FailingSource;

#[async_trait]
impl StatsSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fetch(&self, request: &FeedRequest) -> Result<Value, FeedError> {
        Err(FeedError::Status {
            url: format!("failing/{}", request.kind()),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        })
    }
}

pub fn client_for(source: MemorySource) -> (FeedClient, Arc<MemorySource>) {
    let source = Arc::new(source);
    (FeedClient::new(source.clone()), source)
}

/// ESPN-shaped event with one competitor per display name.
pub fn event(id: &str, names: &[&str]) -> Value {
    let competitors: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "homeAway": if i == 0 { "home" } else { "away" },
                "team": {"displayName": name},
            })
        })
        .collect();
    json!({
        "id": id,
        "date": "2025-10-22T23:30Z",
        "competitions": [{"competitors": competitors}],
    })
}

pub fn scoreboard(events: Vec<Value>) -> Value {
    json!({ "events": events })
}

/// Unique directory under the system temp dir, removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(tag: &str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let path = std::env::temp_dir().join(format!(
            "stats-link-{}-{}-{}",
            tag,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&path).unwrap();
        ScratchDir { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, relative: &str, content: &str) {
        let target = self.path.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(target, content).unwrap();
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
