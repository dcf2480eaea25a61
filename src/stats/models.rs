use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The four leagues the stats feed partitions its data by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeagueId {
    Nba,
    Nfl,
    Nhl,
    Mlb,
}

impl LeagueId {
    /// Display order used wherever leagues are listed together.
    pub const ALL: [LeagueId; 4] = [LeagueId::Nba, LeagueId::Nfl, LeagueId::Nhl, LeagueId::Mlb];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeagueId::Nba => "nba",
            LeagueId::Nfl => "nfl",
            LeagueId::Nhl => "nhl",
            LeagueId::Mlb => "mlb",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LeagueId::Nba => "NBA",
            LeagueId::Nfl => "NFL",
            LeagueId::Nhl => "NHL",
            LeagueId::Mlb => "MLB",
        }
    }

    pub fn sport(&self) -> &'static str {
        match self {
            LeagueId::Nba => "basketball",
            LeagueId::Nfl => "football",
            LeagueId::Nhl => "hockey",
            LeagueId::Mlb => "baseball",
        }
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown league '{0}' (expected one of nba, nfl, nhl, mlb)")]
pub struct UnknownLeague(pub String);

impl FromStr for LeagueId {
    type Err = UnknownLeague;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nba" => Ok(LeagueId::Nba),
            "nfl" => Ok(LeagueId::Nfl),
            "nhl" => Ok(LeagueId::Nhl),
            "mlb" => Ok(LeagueId::Mlb),
            _ => Err(UnknownLeague(s.to_string())),
        }
    }
}

/// Format a calendar date as the 8-digit `YYYYMMDD` stamp the feed expects.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

/// `null` reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ids arrive as strings or bare numbers.
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_id(deserializer)?.unwrap_or_default())
}

/// Keep every event that parses; a broken entry never hides its neighbours.
fn deserialize_events<'de, D>(deserializer: D) -> Result<Vec<ScheduledEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|event| match serde_json::from_value(event) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!("Skipping unreadable event: {}", e);
                None
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Scoreboard / schedule documents
// ---------------------------------------------------------------------------

/// One day's events for a league.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreboardDoc {
    #[serde(default, deserialize_with = "deserialize_events")]
    pub events: Vec<ScheduledEvent>,
}

/// The schedule endpoint is served from the same scoreboard shape.
pub type ScheduleDoc = ScoreboardDoc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// ISO 8601, often without seconds ("2025-10-22T23:30Z").
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub competitions: Vec<Competition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Competition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    #[serde(default)]
    pub home_away: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team: Team,
    /// Sent as a string on scoreboards and as an object on some schedules.
    #[serde(default)]
    pub score: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub logos: Vec<Logo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Logo {
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventStatus {
    #[serde(default, rename = "type")]
    pub status_type: Option<StatusType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusType {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub short_detail: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Team {
    /// The name used for matching: `displayName`, else "location name".
    pub fn full_name(&self) -> Option<String> {
        if let Some(display) = non_empty(&self.display_name) {
            return Some(display.to_string());
        }
        let parts: Vec<&str> = [non_empty(&self.location), non_empty(&self.name)]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Short label for scoreboard lines.
    pub fn label(&self) -> String {
        non_empty(&self.display_name)
            .or_else(|| non_empty(&self.abbreviation))
            .unwrap_or("—")
            .to_string()
    }

    pub fn logo_url(&self) -> Option<String> {
        self.logos
            .iter()
            .find_map(|l| non_empty(&l.href))
            .or_else(|| non_empty(&self.logo))
            .map(str::to_string)
    }
}

impl Competitor {
    pub fn is_home(&self) -> bool {
        self.home_away.as_deref() == Some("home")
    }

    pub fn score_display(&self) -> Option<String> {
        match self.score.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Object(o) => o
                .get("displayValue")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        }
    }
}

impl ScheduledEvent {
    /// Competitors of the first competition; ESPN never sends more than one.
    pub fn competitors(&self) -> &[Competitor] {
        self.competitions
            .first()
            .map(|c| c.competitors.as_slice())
            .unwrap_or(&[])
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
                    .ok()
                    .map(|n| n.and_utc())
            })
    }

    pub fn status_text(&self) -> String {
        let status_type = self
            .status
            .as_ref()
            .or_else(|| self.competitions.first().and_then(|c| c.status.as_ref()))
            .and_then(|s| s.status_type.as_ref());
        status_type
            .and_then(|t| non_empty(&t.short_detail).or_else(|| non_empty(&t.detail)))
            .unwrap_or("Scheduled")
            .to_string()
    }

    /// "Away 98 - 101 Home • Final", away side first.
    pub fn summary_line(&self) -> String {
        let mut competitors: Vec<&Competitor> = self.competitors().iter().collect();
        competitors.sort_by_key(|c| c.is_home());
        let side = |i: usize| competitors.get(i).copied();
        let name = |c: Option<&Competitor>| c.map(|c| c.team.label()).unwrap_or_else(|| "—".into());
        let score = |c: Option<&Competitor>| {
            c.and_then(|c| c.score_display())
                .unwrap_or_else(|| "-".into())
        };
        format!(
            "{} {} - {} {} • {}",
            name(side(0)),
            score(side(0)),
            score(side(1)),
            name(side(1)),
            self.status_text()
        )
    }
}

// ---------------------------------------------------------------------------
// Resolver / matcher results
// ---------------------------------------------------------------------------

/// The event a caller's game was matched to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub event_id: String,
    pub league_id: LeagueId,
}

/// The nearest day with games, or nothing within the lookahead.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreboardWindow {
    pub events: Vec<ScheduledEvent>,
    pub label: Option<String>,
}

impl ScoreboardWindow {
    pub fn empty() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Matchup document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchupDoc {
    #[serde(default)]
    pub team_a: MatchupSide,
    #[serde(default)]
    pub team_b: MatchupSide,
    #[serde(default)]
    pub comparison: Vec<ComparisonRow>,
    #[serde(default)]
    pub game_comparison: Vec<GameComparisonRow>,
    /// Venue, broadcast and similar free-form details.
    #[serde(default)]
    pub game_info: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A side is either `{ "team": {...}, ... }` or the team object itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchupSide {
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub standing_summary: Option<String>,
    #[serde(flatten)]
    pub bare: Team,
}

impl MatchupSide {
    pub fn team(&self) -> &Team {
        self.team.as_ref().unwrap_or(&self.bare)
    }
}

/// Season-level stat row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub b: String,
}

/// Per-game stat row with bar-chart splits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameComparisonRow {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub b: String,
    #[serde(default)]
    pub pct_a: Option<f64>,
    #[serde(default)]
    pub pct_b: Option<f64>,
}
