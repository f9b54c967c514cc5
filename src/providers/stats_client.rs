use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::models::FeatureMap;

use super::{ProviderError, RollingStats, StatsProvider};

#[derive(Debug, Deserialize)]
struct RollingAveragesResponse {
    ppg: f64,
    rpg: f64,
    apg: f64,
}

/// Client for the stats service that fronts ingested box scores.
#[derive(Debug, Clone)]
pub struct StatsApiClient {
    http: Client,
    base_url: String,
}

impl StatsApiClient {
    pub fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl StatsProvider for StatsApiClient {
    async fn rolling_team_stats(
        &self,
        team: &str,
        as_of: NaiveDate,
        window: u32,
    ) -> Result<RollingStats, ProviderError> {
        let url = format!("{}/teams/{}/rolling-averages", self.base_url, team);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("window", window.to_string()),
                ("as_of", as_of.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: RollingAveragesResponse = resp.json().await?;
        Ok(RollingStats {
            ppg: body.ppg,
            rpg: body.rpg,
            apg: body.apg,
        })
    }

    async fn hustle_defense_stats(
        &self,
        team: &str,
        season: &str,
    ) -> Result<FeatureMap, ProviderError> {
        let url = format!("{}/teams/{}/hustle", self.base_url, team);
        let resp = self
            .http
            .get(&url)
            .query(&[("season", season)])
            .send()
            .await?
            .error_for_status()?;

        let stats: FeatureMap = resp.json().await?;
        Ok(stats)
    }
}
