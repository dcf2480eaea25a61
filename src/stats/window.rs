use chrono::{Days, Local, NaiveDate};
use tracing::debug;

use super::feed::FeedClient;
use super::models::{LeagueId, ScoreboardWindow};

/// Find the next slate of games for `league`, looking at most `max_days`
/// days ahead of the local calendar date.
pub async fn resolve_window(feed: &FeedClient, league: LeagueId, max_days: u32) -> ScoreboardWindow {
    resolve_window_from(feed, league, max_days, Local::now().date_naive()).await
}

/// Like [`resolve_window`] with an explicit "today".
///
/// Offset 0 sends no date stamp so the source applies its own notion of
/// today; later offsets send `today + offset`. Attempts run strictly in order
/// and stop at the first day with at least one event.
pub async fn resolve_window_from(
    feed: &FeedClient,
    league: LeagueId,
    max_days: u32,
    today: NaiveDate,
) -> ScoreboardWindow {
    for offset in 0..max_days {
        let date = if offset == 0 {
            None
        } else {
            match today.checked_add_days(Days::new(u64::from(offset))) {
                Some(d) => Some(d),
                None => break,
            }
        };

        let events = feed
            .fetch_scoreboard(league, date)
            .await
            .map(|doc| doc.events)
            .unwrap_or_default();

        if !events.is_empty() {
            debug!("{} window: {} events at offset {}", league, events.len(), offset);
            return ScoreboardWindow {
                events,
                label: Some(day_label(offset, date.unwrap_or(today))),
            };
        }
    }

    debug!("{} window: no events within {} days", league, max_days);
    ScoreboardWindow::empty()
}

/// "Today", "Tomorrow", or a short weekday/month/day such as "Mon, Oct 20".
pub fn day_label(offset: u32, date: NaiveDate) -> String {
    match offset {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => short_date(date),
    }
}

pub fn short_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}
