use serde::Serialize;
use std::fmt;

use super::feed::FeedClient;
use super::models::{ComparisonRow, GameComparisonRow, LeagueId, MatchupDoc, MatchupSide};

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamHeader {
    pub name: String,
    pub abbreviation: String,
    pub logo: Option<String>,
    pub standing_summary: Option<String>,
}

/// Head-to-head data for one event, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchupView {
    Unavailable,
    Ready {
        league: LeagueId,
        event_id: String,
        team_a: TeamHeader,
        team_b: TeamHeader,
        /// Season-level rows; `None` when the feed had none.
        comparison: Option<Vec<ComparisonRow>>,
        /// Per-game rows with `pct_a + pct_b == 100`; `None` when the feed had none.
        game_comparison: Option<Vec<GameComparisonRow>>,
        game_info: Option<serde_json::Value>,
    },
}

pub async fn present_matchup(feed: &FeedClient, league: LeagueId, event_id: &str) -> MatchupView {
    match feed.fetch_matchup(league, event_id).await {
        Some(doc) => build_view(league, event_id, doc),
        None => MatchupView::Unavailable,
    }
}

pub fn build_view(league: LeagueId, event_id: &str, doc: MatchupDoc) -> MatchupView {
    if doc.error.is_some() {
        return MatchupView::Unavailable;
    }

    let comparison = Some(doc.comparison).filter(|rows| !rows.is_empty());
    let game_comparison = Some(doc.game_comparison)
        .filter(|rows| !rows.is_empty())
        .map(|rows| rows.into_iter().map(normalize_row).collect());

    MatchupView::Ready {
        league,
        event_id: event_id.to_string(),
        team_a: header(&doc.team_a, "Team A", "A"),
        team_b: header(&doc.team_b, "Team B", "B"),
        comparison,
        game_comparison,
        game_info: doc.game_info.filter(|v| !v.is_null()),
    }
}

fn header(side: &MatchupSide, default_name: &str, default_abbr: &str) -> TeamHeader {
    let team = side.team();
    TeamHeader {
        name: team
            .display_name
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_name.to_string()),
        abbreviation: team
            .abbreviation
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_abbr.to_string()),
        logo: team.logo_url(),
        standing_summary: side.standing_summary.clone().filter(|s| !s.is_empty()),
    }
}

/// Make the bar splits sum to exactly 100, deriving them from the displayed
/// values when the feed left them out.
fn normalize_row(mut row: GameComparisonRow) -> GameComparisonRow {
    let (a, b) = match (row.pct_a, row.pct_b) {
        (Some(a), Some(b)) if a.is_finite() && b.is_finite() && a >= 0.0 && b >= 0.0 => (a, b),
        _ => (stat_value(&row.a), stat_value(&row.b)),
    };
    let (pct_a, pct_b) = split_percentages(a, b);
    row.pct_a = Some(pct_a);
    row.pct_b = Some(pct_b);
    row
}

/// Numeric weight of a displayed stat: "made-attempted" becomes a success
/// percentage, anything else keeps only its digits and dots. Unparsable is 0.
pub fn stat_value(display: &str) -> f64 {
    if let Some((made, attempted)) = display.split_once('-') {
        if let (Ok(made), Ok(attempted)) = (made.trim().parse::<f64>(), attempted.trim().parse::<f64>()) {
            return made / attempted.max(1.0) * 100.0;
        }
    }
    let digits: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().unwrap_or(0.0)
}

/// Proportional split of two non-negative weights; 50/50 when both are zero.
pub fn split_percentages(a: f64, b: f64) -> (f64, f64) {
    let total = a + b;
    if total > 0.0 {
        let pct_a = a / total * 100.0;
        (pct_a, 100.0 - pct_a)
    } else {
        (50.0, 50.0)
    }
}

impl fmt::Display for MatchupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let MatchupView::Ready {
            team_a,
            team_b,
            comparison,
            game_comparison,
            game_info,
            ..
        } = self
        else {
            return writeln!(f, "Matchup data not available.");
        };

        writeln!(
            f,
            "{} ({})  vs  {} ({})",
            team_a.name, team_a.abbreviation, team_b.name, team_b.abbreviation
        )?;
        for team in [team_a, team_b] {
            if let Some(summary) = &team.standing_summary {
                writeln!(f, "  {}: {}", team.abbreviation, summary)?;
            }
        }
        if let Some(venue) = game_info
            .as_ref()
            .and_then(|info| info.pointer("/venue/fullName"))
            .and_then(|v| v.as_str())
        {
            writeln!(f, "  Venue: {}", venue)?;
        }

        if let Some(rows) = comparison {
            writeln!(f, "\nSeason Stats")?;
            writeln!(f, "  {:<18} {:>10} {:>10}", "Stat", team_a.abbreviation, team_b.abbreviation)?;
            for row in rows {
                writeln!(f, "  {:<18} {:>10} {:>10}", row.label, row.a, row.b)?;
            }
        }

        if let Some(rows) = game_comparison {
            writeln!(f, "\nGame Stats")?;
            for row in rows {
                let filled = ((row.pct_a.unwrap_or(50.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
                let filled = filled.min(BAR_WIDTH);
                writeln!(
                    f,
                    "  {:<14} {:>8} [{}{}] {:<8}",
                    row.label,
                    row.a,
                    "#".repeat(filled),
                    ".".repeat(BAR_WIDTH - filled),
                    row.b
                )?;
            }
        }

        if comparison.is_none() && game_comparison.is_none() {
            writeln!(f, "\nNo comparison data available for this game.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::provider::FeedRequest;
    use crate::stats::testing::{client_for, MemorySource};
    use approx::assert_relative_eq;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> MatchupDoc {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_splits_sum_to_one_hundred() {
        let view = build_view(
            LeagueId::Nba,
            "401",
            doc(json!({
                "game_comparison": [
                    {"label": "FG", "a": "40-85", "b": "38-90", "pct_a": 52.7, "pct_b": 47.3},
                    {"label": "Assists", "a": "25", "b": "19", "pct_a": 30.0, "pct_b": 30.0},
                    {"label": "FT %", "a": "81.0%", "b": "64.5%"},
                    {"label": "Fouls", "a": "0", "b": "0"}
                ]
            })),
        );
        let MatchupView::Ready { game_comparison: Some(rows), .. } = view else {
            panic!("expected game rows");
        };
        for row in &rows {
            assert_relative_eq!(row.pct_a.unwrap() + row.pct_b.unwrap(), 100.0, epsilon = 1e-9);
        }
        assert_relative_eq!(rows[1].pct_a.unwrap(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(rows[2].pct_a.unwrap(), 81.0 / 145.5 * 100.0, epsilon = 1e-9);
        assert_relative_eq!(rows[3].pct_a.unwrap(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_stat_value_parsing() {
        assert_relative_eq!(stat_value("40-80"), 50.0, epsilon = 1e-9);
        assert_relative_eq!(stat_value("3-0"), 300.0, epsilon = 1e-9);
        assert_relative_eq!(stat_value("47.1%"), 47.1, epsilon = 1e-9);
        assert_relative_eq!(stat_value("12"), 12.0, epsilon = 1e-9);
        assert_relative_eq!(stat_value("-"), 0.0, epsilon = 1e-9);
        assert_relative_eq!(stat_value(""), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_headers_fall_back_to_defaults() {
        let view = build_view(
            LeagueId::Nfl,
            "7",
            doc(json!({
                "team_a": {"team": {"displayName": "Kansas City Chiefs", "abbreviation": "KC",
                                    "logos": [{"href": "kc.png"}]},
                           "standing_summary": "1st in AFC West"},
                "team_b": {}
            })),
        );
        let MatchupView::Ready { team_a, team_b, comparison, game_comparison, .. } = view else {
            panic!("expected ready view");
        };
        assert_eq!(team_a.name, "Kansas City Chiefs");
        assert_eq!(team_a.logo.as_deref(), Some("kc.png"));
        assert_eq!(team_a.standing_summary.as_deref(), Some("1st in AFC West"));
        assert_eq!(team_b.name, "Team B");
        assert_eq!(team_b.abbreviation, "B");
        assert!(comparison.is_none());
        assert!(game_comparison.is_none());
    }

    #[test]
    fn test_error_document_is_unavailable() {
        let view = build_view(LeagueId::Nba, "1", doc(json!({"error": "Game not found"})));
        assert_eq!(view, MatchupView::Unavailable);
        assert_eq!(view.to_string(), "Matchup data not available.\n");
    }

    #[test]
    fn test_render_shows_no_data_notice() {
        let view = build_view(LeagueId::Nhl, "3", doc(json!({})));
        assert!(view
            .to_string()
            .contains("No comparison data available for this game."));
    }

    #[test]
    fn test_render_includes_season_table() {
        let view = build_view(
            LeagueId::Nba,
            "401",
            doc(json!({
                "team_a": {"team": {"displayName": "Boston Celtics", "abbreviation": "BOS"}},
                "team_b": {"team": {"displayName": "New York Knicks", "abbreviation": "NY"}},
                "comparison": [{"label": "PPG", "a": "117.9", "b": "112.8"}],
                "game_info": {"venue": {"fullName": "TD Garden"}}
            })),
        );
        let text = view.to_string();
        assert!(text.contains("Venue: TD Garden"));
        assert!(text.starts_with("Boston Celtics (BOS)  vs  New York Knicks (NY)"));
        assert!(text.contains("Season Stats"));
        assert!(text.contains("117.9"));
        assert!(!text.contains("No comparison data"));
    }

    #[tokio::test]
    async fn test_present_matchup_without_document_is_unavailable() {
        let (feed, _) = client_for(MemorySource::new());
        assert_eq!(
            present_matchup(&feed, LeagueId::Mlb, "99").await,
            MatchupView::Unavailable
        );
    }

    #[tokio::test]
    async fn test_present_matchup_fetches_by_event() {
        let (feed, source) = client_for(MemorySource::new().with(
            FeedRequest::Matchup(LeagueId::Mlb, "99".into()),
            json!({"comparison": [{"label": "AVG", "a": ".251", "b": ".244"}]}),
        ));
        let view = present_matchup(&feed, LeagueId::Mlb, "99").await;
        assert!(matches!(view, MatchupView::Ready { comparison: Some(_), .. }));
        assert_eq!(
            source.requests(),
            vec![FeedRequest::Matchup(LeagueId::Mlb, "99".into())]
        );
    }
}
