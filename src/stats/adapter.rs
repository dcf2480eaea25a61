use super::models::LeagueId;

/// League assumed for any odds-feed sport key the table does not know.
pub const FALLBACK_LEAGUE: LeagueId = LeagueId::Nba;

/// Odds-feed sport keys and the stats-feed league each one maps onto.
const SPORT_KEY_TABLE: &[(&str, LeagueId)] = &[
    ("basketball_nba", LeagueId::Nba),
    ("americanfootball_nfl", LeagueId::Nfl),
    ("icehockey_nhl", LeagueId::Nhl),
    ("baseball_mlb", LeagueId::Mlb),
];

/// Translate an odds-feed sport key into a stats-feed league. Total: unknown
/// keys map to [`FALLBACK_LEAGUE`].
pub fn translate(sport_key: &str) -> LeagueId {
    SPORT_KEY_TABLE
        .iter()
        .find(|(key, _)| *key == sport_key)
        .map(|(_, league)| *league)
        .unwrap_or(FALLBACK_LEAGUE)
}
