//! Locate the stats-feed event for a game described by the odds feed.
//!
//! The two feeds name teams differently ("Lakers" vs "Los Angeles Lakers",
//! "LA Clippers" vs "Clippers"), so names are compared by bidirectional
//! substring containment after normalization. There is no scoring: the first
//! qualifying event in the provider's order wins.

use tracing::debug;

use super::feed::FeedClient;
use super::models::{LeagueId, MatchResult, ScheduledEvent};

/// Lower-case and collapse every whitespace run to one space (trimming ends).
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn names_correspond(competitor: &str, query: &str) -> bool {
    competitor.contains(query) || query.contains(competitor)
}

fn competitor_names(event: &ScheduledEvent) -> Vec<String> {
    event
        .competitors()
        .iter()
        .filter_map(|c| c.team.full_name())
        .map(|n| normalize_name(&n))
        .filter(|n| !n.is_empty())
        .collect()
}

/// First event in which some competitor corresponds to `team_a` and some
/// (possibly the same) competitor corresponds to `team_b`.
pub fn first_matching_event<'a>(
    events: &'a [ScheduledEvent],
    team_a: &str,
    team_b: &str,
) -> Option<&'a ScheduledEvent> {
    let a = normalize_name(team_a);
    let b = normalize_name(team_b);
    events.iter().find(|event| {
        let names = competitor_names(event);
        names.iter().any(|n| names_correspond(n, &a))
            && names.iter().any(|n| names_correspond(n, &b))
    })
}

/// Match two free-text team names against the league's current scoreboard.
/// Only the default (today) document is inspected; no lookahead.
pub async fn find_matching_event(
    feed: &FeedClient,
    league: LeagueId,
    team_a: &str,
    team_b: &str,
) -> Option<MatchResult> {
    let doc = feed.fetch_scoreboard(league, None).await?;
    let found = first_matching_event(&doc.events, team_a, team_b).map(|event| MatchResult {
        event_id: event.id.clone(),
        league_id: league,
    });

    match &found {
        Some(m) => debug!("Matched '{}' vs '{}' to {} event {}", team_a, team_b, league, m.event_id),
        None => debug!(
            "No {} event among {} matches '{}' vs '{}'",
            league,
            doc.events.len(),
            team_a,
            team_b
        ),
    }
    found
}
