pub mod odds_client;
pub mod stats_client;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FeatureMap, Game};

pub use odds_client::OddsApiClient;
pub use stats_client::StatsApiClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Rolling per-game averages for one team over a recent window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RollingStats {
    pub ppg: f64,
    pub rpg: f64,
    pub apg: f64,
}

/// Latest published line for a game. Individual markets may be missing when
/// the books have not posted them yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct BettingLine {
    /// Spread from the home team's perspective (negative = home favored).
    pub spread_line: Option<f64>,
    pub total_line: Option<f64>,
    pub home_moneyline: Option<i32>,
    pub away_moneyline: Option<i32>,
}

/// Source of team statistics used to build feature snapshots.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Per-game scoring/rebounding/assist averages over the team's last
    /// `window` games before `as_of`.
    async fn rolling_team_stats(
        &self,
        team: &str,
        as_of: NaiveDate,
        window: u32,
    ) -> Result<RollingStats, ProviderError>;

    /// Season-to-date hustle and defense metrics, keyed by metric name.
    async fn hustle_defense_stats(
        &self,
        team: &str,
        season: &str,
    ) -> Result<FeatureMap, ProviderError>;
}

/// Source of betting lines used to build feature snapshots.
#[async_trait]
pub trait OddsProvider: Send + Sync {
    /// Latest line for the game, or None when no book has posted one yet.
    async fn latest_line(&self, game: &Game) -> Result<Option<BettingLine>, ProviderError>;
}
