use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::models::Game;

use super::{BettingLine, OddsProvider, ProviderError};

const NBA_SPORT_KEY: &str = "basketball_nba";

#[derive(Debug, Deserialize)]
struct OddsEvent {
    home_team: String,
    away_team: String,
    bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Deserialize)]
struct Bookmaker {
    markets: Vec<Market>,
}

#[derive(Debug, Deserialize)]
struct Market {
    key: String,
    outcomes: Vec<MarketOutcome>,
}

#[derive(Debug, Deserialize)]
struct MarketOutcome {
    name: String,
    price: f64,
    #[serde(default)]
    point: Option<f64>,
}

/// The Odds API client. Lines come back in American format with the spread
/// and total carried on the outcome's `point` field.
#[derive(Debug, Clone)]
pub struct OddsApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OddsApiClient {
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    async fn fetch_events(&self) -> Result<Vec<OddsEvent>, ProviderError> {
        let url = format!("{}/sports/{}/odds", self.base_url, NBA_SPORT_KEY);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", "us"),
                ("markets", "h2h,spreads,totals"),
                ("oddsFormat", "american"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let events: Vec<OddsEvent> = resp.json().await?;
        Ok(events)
    }
}

fn teams_match(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

fn extract_line(event: &OddsEvent) -> BettingLine {
    let mut line = BettingLine::default();

    for bookie in &event.bookmakers {
        for market in &bookie.markets {
            match market.key.as_str() {
                "spreads" if line.spread_line.is_none() => {
                    line.spread_line = market
                        .outcomes
                        .iter()
                        .find(|o| teams_match(&o.name, &event.home_team))
                        .and_then(|o| o.point);
                }
                "totals" if line.total_line.is_none() => {
                    line.total_line = market
                        .outcomes
                        .iter()
                        .find(|o| o.name.eq_ignore_ascii_case("over"))
                        .and_then(|o| o.point);
                }
                "h2h" => {
                    if line.home_moneyline.is_none() {
                        line.home_moneyline = market
                            .outcomes
                            .iter()
                            .find(|o| teams_match(&o.name, &event.home_team))
                            .map(|o| o.price.round() as i32);
                    }
                    if line.away_moneyline.is_none() {
                        line.away_moneyline = market
                            .outcomes
                            .iter()
                            .find(|o| teams_match(&o.name, &event.away_team))
                            .map(|o| o.price.round() as i32);
                    }
                }
                _ => {}
            }
        }
    }

    line
}

#[async_trait]
impl OddsProvider for OddsApiClient {
    async fn latest_line(&self, game: &Game) -> Result<Option<BettingLine>, ProviderError> {
        let events = self.fetch_events().await?;

        let event = events.iter().find(|e| {
            teams_match(&e.home_team, &game.home_team) && teams_match(&e.away_team, &game.away_team)
        });

        Ok(event.map(extract_line))
    }
}
