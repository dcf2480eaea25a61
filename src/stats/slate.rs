//! Cross-league slate: today's games for every league, or tomorrow's when
//! no league plays today.
//!
//! ```text
//!  refresher tick ──▶ resolve_slate ──┬─ nba ─┐
//!   (every N s,                       ├─ nfl ─┤ join_all, then sum counts
//!    never cancelled)                 ├─ nhl ─┤
//!                                     └─ mlb ─┘
//!                           │
//!                           ▼
//!   SlateBoard::apply(seq): older sequence numbers are dropped
//! ```

use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::feed::FeedClient;
use super::models::{LeagueId, ScheduledEvent};
use super::window::short_date;

#[derive(Debug, Clone, Serialize)]
pub struct LeagueSlate {
    pub league: LeagueId,
    pub events: Vec<ScheduledEvent>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Slate {
    pub leagues: Vec<LeagueSlate>,
    pub label: Option<String>,
}

impl Slate {
    pub fn total_events(&self) -> usize {
        self.leagues.iter().map(|l| l.events.len()).sum()
    }
}

/// Fetch one day's scoreboard for every league concurrently. Each league
/// degrades to an empty list on its own; order follows [`LeagueId::ALL`].
async fn fetch_all_leagues(feed: &FeedClient, date: Option<NaiveDate>) -> Vec<LeagueSlate> {
    let fetches = LeagueId::ALL.into_iter().map(|league| async move {
        let events = feed
            .fetch_scoreboard(league, date)
            .await
            .map(|doc| doc.events)
            .unwrap_or_default();
        LeagueSlate { league, events }
    });
    futures_util::future::join_all(fetches).await
}

/// Today's slate across all leagues, falling back to tomorrow's.
pub async fn resolve_slate(feed: &FeedClient, today: NaiveDate) -> Slate {
    let todays = fetch_all_leagues(feed, None).await;
    let slate = Slate {
        leagues: todays,
        label: Some("Today".to_string()),
    };
    if slate.total_events() > 0 {
        return slate;
    }

    let Some(tomorrow) = today.checked_add_days(Days::new(1)) else {
        return Slate::default();
    };
    let leagues = fetch_all_leagues(feed, Some(tomorrow)).await;
    let slate = Slate {
        leagues,
        label: Some(format!("Tomorrow ({})", short_date(tomorrow))),
    };
    if slate.total_events() > 0 {
        slate
    } else {
        Slate {
            label: None,
            ..slate
        }
    }
}

impl fmt::Display for Slate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(label) = &self.label else {
            return writeln!(f, "No games today or tomorrow.");
        };
        writeln!(f, "{}", label)?;
        for league in &self.leagues {
            for event in &league.events {
                writeln!(
                    f,
                    "  {:<4} {}",
                    league.league.display_name(),
                    event.summary_line()
                )?;
            }
        }
        Ok(())
    }
}

/// A slate together with the refresh that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct SlateSnapshot {
    pub sequence: u64,
    pub refreshed_at: DateTime<Utc>,
    pub slate: Slate,
}

/// Latest slate, shared between the refresher and readers.
#[derive(Clone, Default)]
pub struct SlateBoard {
    inner: Arc<RwLock<Option<SlateSnapshot>>>,
}

impl SlateBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn latest(&self) -> Option<SlateSnapshot> {
        self.inner.read().await.clone()
    }

    /// Store `snapshot` unless a newer refresh already landed. Returns whether
    /// it was applied.
    pub async fn apply(&self, snapshot: SlateSnapshot) -> bool {
        let mut current = self.inner.write().await;
        if current
            .as_ref()
            .is_some_and(|c| c.sequence >= snapshot.sequence)
        {
            return false;
        }
        *current = Some(snapshot);
        true
    }
}

/// Spawns a background task that recomputes the slate every `interval`.
///
/// Each tick starts an independent refresh; slow refreshes are not cancelled
/// and may overlap the next one. Results carry their issue order so a late
/// finisher never overwrites a newer slate.
pub fn start_slate_refresher(
    feed: FeedClient,
    board: SlateBoard,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Slate refresher started (interval={:?})", interval);
        let sequence = Arc::new(AtomicU64::new(0));
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let seq = sequence.fetch_add(1, Ordering::SeqCst) + 1;
            let feed = feed.clone();
            let board = board.clone();

            tokio::spawn(async move {
                let slate = resolve_slate(&feed, Local::now().date_naive()).await;
                let total = slate.total_events();
                let snapshot = SlateSnapshot {
                    sequence: seq,
                    refreshed_at: Utc::now(),
                    slate,
                };
                if board.apply(snapshot).await {
                    info!("Slate refresh #{} applied ({} events)", seq, total);
                } else {
                    debug!("Slate refresh #{} finished late, dropped", seq);
                }
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::provider::FeedRequest;
    use crate::stats::testing::{client_for, event, scoreboard, MemorySource};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 17).unwrap()
    }

    fn tomorrow() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 10, 18)
    }

    #[tokio::test]
    async fn test_any_league_today_keeps_today() {
        let (feed, source) = client_for(
            MemorySource::new()
                .with(FeedRequest::Scoreboard(LeagueId::Nba, None), scoreboard(vec![]))
                .with(
                    FeedRequest::Scoreboard(LeagueId::Nhl, None),
                    scoreboard(vec![event("h1", &["Boston Bruins", "Buffalo Sabres"])]),
                ),
        );
        let slate = resolve_slate(&feed, today()).await;
        assert_eq!(slate.label.as_deref(), Some("Today"));
        assert_eq!(slate.total_events(), 1);
        let order: Vec<LeagueId> = slate.leagues.iter().map(|l| l.league).collect();
        assert_eq!(order, LeagueId::ALL.to_vec());
        // Four concurrent fetches, no second round.
        assert_eq!(source.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_today_falls_back_to_tomorrow() {
        let (feed, source) = client_for(MemorySource::new().with(
            FeedRequest::Scoreboard(LeagueId::Mlb, tomorrow()),
            scoreboard(vec![event("b1", &["Seattle Mariners", "Houston Astros"])]),
        ));
        let slate = resolve_slate(&feed, today()).await;
        assert_eq!(slate.label.as_deref(), Some("Tomorrow (Sat, Oct 18)"));
        assert_eq!(slate.total_events(), 1);
        assert_eq!(source.requests().len(), 8);
    }

    #[tokio::test]
    async fn test_no_games_anywhere_has_no_label() {
        let (feed, _) = client_for(MemorySource::new());
        let slate = resolve_slate(&feed, today()).await;
        assert!(slate.label.is_none());
        assert_eq!(slate.total_events(), 0);
        assert_eq!(slate.to_string(), "No games today or tomorrow.\n");
    }

    fn snapshot(sequence: u64) -> SlateSnapshot {
        SlateSnapshot {
            sequence,
            refreshed_at: Utc::now(),
            slate: Slate::default(),
        }
    }

    #[tokio::test]
    async fn test_board_drops_stale_refreshes() {
        let board = SlateBoard::new();
        assert!(board.latest().await.is_none());
        assert!(board.apply(snapshot(2)).await);
        // Refresh #1 was issued earlier but completed later.
        assert!(!board.apply(snapshot(1)).await);
        assert_eq!(board.latest().await.unwrap().sequence, 2);
        assert!(board.apply(snapshot(3)).await);
        assert_eq!(board.latest().await.unwrap().sequence, 3);
    }

    #[tokio::test]
    async fn test_refresher_populates_board() {
        let (feed, _) = client_for(MemorySource::new().with(
            FeedRequest::Scoreboard(LeagueId::Nfl, None),
            scoreboard(vec![event("f1", &["Dallas Cowboys", "Philadelphia Eagles"])]),
        ));
        let board = SlateBoard::new();
        let handle = start_slate_refresher(feed, board.clone(), Duration::from_secs(3600));

        let mut latest = None;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            latest = board.latest().await;
            if latest.is_some() {
                break;
            }
        }
        handle.abort();

        let latest = latest.expect("refresher should apply the first slate");
        assert_eq!(latest.sequence, 1);
        assert_eq!(latest.slate.total_events(), 1);
    }
}
