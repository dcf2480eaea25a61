pub mod adapter;
pub mod feed;
pub mod matcher;
pub mod matchup;
pub mod models;
pub mod provider;
pub mod remote;
pub mod slate;
pub mod snapshot;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::translate;
pub use feed::FeedClient;
pub use matcher::find_matching_event;
pub use matchup::present_matchup;
pub use models::LeagueId;
pub use slate::{resolve_slate, start_slate_refresher, SlateBoard};
pub use window::resolve_window;
