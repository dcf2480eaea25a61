use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::db::{SettingsStore, STATS_API_URL_KEY};
use crate::stats::LeagueId;

/// Odds-to-stats event matcher and scoreboard service
#[derive(Parser, Debug, Clone)]
#[command(name = "stats-link", version, about)]
pub struct Config {
    /// Stats service base URL; overrides the stored setting. Without one,
    /// documents are read from the snapshot directory.
    #[arg(long, env = "STATS_API_URL", global = true)]
    pub stats_api_url: Option<String>,

    /// Directory of harvested JSON snapshots used when no base URL is set
    #[arg(long, env = "STATS_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// SQLite settings store path
    #[arg(long, env = "SETTINGS_DB_PATH", default_value = "stats-link.db", global = true)]
    pub settings_path: String,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "10", global = true)]
    pub http_timeout_secs: u64,

    /// How many days ahead the scoreboard window may look (today included)
    #[arg(long, env = "LOOKAHEAD_DAYS", default_value = "7", global = true)]
    pub lookahead_days: u32,

    /// Slate refresh interval in seconds
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value = "60", global = true)]
    pub refresh_interval_secs: u64,

    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080", global = true)]
    pub dashboard_addr: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the JSON dashboard with a periodically refreshed slate
    Serve,
    /// Print today's games across all leagues (or tomorrow's)
    Slate,
    /// Print the next day with games for one league
    Window {
        league: LeagueId,
        /// Lookahead override
        #[arg(long)]
        days: Option<u32>,
    },
    /// Match an odds-feed game to a scoreboard event and show the matchup
    Match {
        /// Odds-feed sport key, e.g. basketball_nba
        sport_key: String,
        team_a: String,
        team_b: String,
    },
    /// Show head-to-head data for a known event
    Matchup { league: LeagueId, event_id: String },
    /// List a league's teams
    Teams { league: LeagueId },
    /// Print a league's season schedule
    Schedule { league: LeagueId },
    /// Dump a league's standings document
    Standings { league: LeagueId },
    /// Store the stats service base URL
    SetStatsUrl { url: String },
    /// Forget the stored stats service base URL
    ClearStatsUrl,
}

pub const MAX_LOOKAHEAD_DAYS: u32 = 30;

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(url) = self.cli_base_url() {
            validate_base_url(&url)?;
        }
        if let Command::SetStatsUrl { url } = &self.command {
            validate_base_url(url)?;
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be positive");
        }
        if self.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be positive");
        }
        if !(1..=MAX_LOOKAHEAD_DAYS).contains(&self.lookahead_days) {
            anyhow::bail!("lookahead_days must be between 1 and {}", MAX_LOOKAHEAD_DAYS);
        }
        if let Command::Window { days: Some(days), .. } = &self.command {
            if !(1..=MAX_LOOKAHEAD_DAYS).contains(days) {
                anyhow::bail!("--days must be between 1 and {}", MAX_LOOKAHEAD_DAYS);
            }
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    fn cli_base_url(&self) -> Option<String> {
        self.stats_api_url.as_deref().and_then(normalize_base_url)
    }

    /// Flag or env first, then the stored setting. `None` selects snapshot mode.
    pub fn resolve_base_url(&self, store: &SettingsStore) -> anyhow::Result<Option<String>> {
        if let Some(url) = self.cli_base_url() {
            return Ok(Some(url));
        }
        Ok(store
            .get(STATS_API_URL_KEY)?
            .as_deref()
            .and_then(normalize_base_url))
    }
}

/// Trim whitespace and trailing slashes; blank means unset.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn validate_base_url(raw: &str) -> anyhow::Result<()> {
    let Some(url) = normalize_base_url(raw) else {
        return Ok(());
    };
    let parsed = url::Url::parse(&url).with_context(|| format!("invalid stats API URL '{}'", url))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("stats API URL must be http or https, got '{}'", parsed.scheme());
    }
    Ok(())
}
