use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::MAX_LOOKAHEAD_DAYS;
use crate::stats::models::UnknownLeague;
use crate::stats::{
    find_matching_event, present_matchup, resolve_window, translate, FeedClient, LeagueId,
    SlateBoard,
};

#[derive(Clone)]
pub struct AppState {
    pub feed: FeedClient,
    pub board: SlateBoard,
    pub lookahead_days: u32,
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/slate", get(slate_handler))
        .route("/api/leagues", get(leagues_handler))
        .route("/api/match", get(match_handler))
        .route("/api/:league/window", get(window_handler))
        .route("/api/:league/teams", get(teams_handler))
        .route("/api/:league/schedule", get(schedule_handler))
        .route("/api/:league/standings", get(standings_handler))
        .route("/api/:league/matchup/:event_id", get(matchup_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn parse_league(raw: &str) -> Result<LeagueId, (StatusCode, String)> {
    raw.parse()
        .map_err(|e: UnknownLeague| (StatusCode::NOT_FOUND, e.to_string()))
}

/// GET /api/slate: latest refreshed slate, `null` before the first refresh
async fn slate_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.board.latest().await)
}

/// GET /api/leagues
async fn leagues_handler() -> impl IntoResponse {
    let leagues: Vec<_> = LeagueId::ALL
        .iter()
        .map(|l| json!({"id": l, "name": l.display_name(), "sport": l.sport()}))
        .collect();
    Json(leagues)
}

#[derive(Debug, Deserialize)]
struct MatchQuery {
    sport_key: String,
    team_a: String,
    team_b: String,
}

/// GET /api/match?sport_key=basketball_nba&team_a=...&team_b=...
async fn match_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MatchQuery>,
) -> impl IntoResponse {
    let league = translate(&q.sport_key);
    let found = find_matching_event(&state.feed, league, &q.team_a, &q.team_b).await;
    Json(json!({ "league": league, "match": found }))
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    days: Option<u32>,
}

/// GET /api/:league/window?days=7
async fn window_handler(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
    Query(q): Query<WindowQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let league = parse_league(&league)?;
    let days = q
        .days
        .unwrap_or(state.lookahead_days)
        .clamp(1, MAX_LOOKAHEAD_DAYS);
    Ok(Json(resolve_window(&state.feed, league, days).await))
}

/// GET /api/:league/teams
async fn teams_handler(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let league = parse_league(&league)?;
    Ok(Json(state.feed.fetch_teams(league).await.unwrap_or_default()))
}

/// GET /api/:league/schedule
async fn schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let league = parse_league(&league)?;
    state
        .feed
        .fetch_schedule(league)
        .await
        .map(Json)
        .ok_or_else(|| unavailable(league, "schedule"))
}

/// GET /api/:league/standings
async fn standings_handler(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let league = parse_league(&league)?;
    state
        .feed
        .fetch_standings(league)
        .await
        .map(Json)
        .ok_or_else(|| unavailable(league, "standings"))
}

fn unavailable(league: LeagueId, kind: &str) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("{} {} not available", league.display_name(), kind),
    )
}

/// GET /api/:league/matchup/:event_id
async fn matchup_handler(
    State(state): State<Arc<AppState>>,
    Path((league, event_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let league = parse_league(&league)?;
    Ok(Json(present_matchup(&state.feed, league, &event_id).await))
}
