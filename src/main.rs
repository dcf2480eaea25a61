use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, warn};

mod config;
mod dashboard;
mod db;
mod stats;

use config::{Command, Config};
use dashboard::AppState;
use db::{SettingsStore, STATS_API_URL_KEY};
use stats::models::ScheduledEvent;
use stats::{
    find_matching_event, present_matchup, resolve_slate, resolve_window, start_slate_refresher,
    translate, FeedClient, SlateBoard,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let store = SettingsStore::open(&config.settings_path)?;

    match &config.command {
        Command::SetStatsUrl { url } => {
            match config::normalize_base_url(url) {
                Some(url) => {
                    store.set(STATS_API_URL_KEY, &url)?;
                    info!("Stats API URL stored: {}", url);
                }
                None => warn!("Empty URL given; nothing stored"),
            }
            return Ok(());
        }
        Command::ClearStatsUrl => {
            if store.remove(STATS_API_URL_KEY)? {
                info!("Stats API URL cleared; snapshot mode from now on");
            } else {
                info!("No stats API URL was stored");
            }
            return Ok(());
        }
        _ => {}
    }

    let base_url = config.resolve_base_url(&store)?;
    let feed =
        FeedClient::from_settings(base_url.as_deref(), &config.data_dir, config.http_timeout())?;

    match config.command.clone() {
        Command::Serve => serve(&config, feed).await?,
        Command::Slate => {
            let slate = resolve_slate(&feed, Local::now().date_naive()).await;
            print!("{}", slate);
        }
        Command::Window { league, days } => {
            let window = resolve_window(&feed, league, days.unwrap_or(config.lookahead_days)).await;
            match &window.label {
                Some(label) => {
                    println!("{} - {}", league.display_name(), label);
                    for event in &window.events {
                        print_event(event);
                    }
                }
                None => println!(
                    "No {} games in the next {} days.",
                    league.display_name(),
                    days.unwrap_or(config.lookahead_days)
                ),
            }
        }
        Command::Match {
            sport_key,
            team_a,
            team_b,
        } => {
            let league = translate(&sport_key);
            match find_matching_event(&feed, league, &team_a, &team_b).await {
                Some(found) => {
                    println!("Matched {} event {}\n", found.league_id, found.event_id);
                    print!(
                        "{}",
                        present_matchup(&feed, found.league_id, &found.event_id).await
                    );
                }
                None => println!(
                    "No matching {} game found for '{}' vs '{}'. The stats feed may not have today's games yet.",
                    league.display_name(),
                    team_a,
                    team_b
                ),
            }
        }
        Command::Matchup { league, event_id } => {
            print!("{}", present_matchup(&feed, league, &event_id).await);
        }
        Command::Teams { league } => match feed.fetch_teams(league).await {
            Some(teams) => {
                for team in teams {
                    println!(
                        "{:<6} {}",
                        team.abbreviation.as_deref().unwrap_or("-"),
                        team.full_name().unwrap_or_default()
                    );
                }
            }
            None => println!("No {} teams available from {}.", league.display_name(), feed.source_name()),
        },
        Command::Schedule { league } => match feed.fetch_schedule(league).await {
            Some(schedule) if !schedule.events.is_empty() => {
                for event in &schedule.events {
                    print_event(event);
                }
            }
            _ => println!("No {} schedule available from {}.", league.display_name(), feed.source_name()),
        },
        Command::Standings { league } => match feed.fetch_standings(league).await {
            Some(standings) => println!("{}", serde_json::to_string_pretty(&standings)?),
            None => println!("No {} standings available from {}.", league.display_name(), feed.source_name()),
        },
        Command::SetStatsUrl { .. } | Command::ClearStatsUrl => {}
    }

    Ok(())
}

fn print_event(event: &ScheduledEvent) {
    let kickoff = event
        .start_time()
        .map(|t| t.with_timezone(&Local).format("%a %H:%M").to_string())
        .unwrap_or_else(|| "TBD".to_string());
    println!("  [{}] {:<9} {}", event.id, kickoff, event.summary_line());
}

/// Run the dashboard with a background slate refresher until shutdown.
async fn serve(config: &Config, feed: FeedClient) -> Result<()> {
    let board = SlateBoard::new();
    let _refresher = start_slate_refresher(feed.clone(), board.clone(), config.refresh_interval());

    let app = dashboard::router(AppState {
        feed,
        board,
        lookahead_days: config.lookahead_days,
    });
    let addr: SocketAddr = config.dashboard_addr.parse()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
