use rust_decimal::Decimal;
use std::env;

const DEFAULT_STATS_API_URL: &str = "https://stats.nba.com/stats";
const DEFAULT_ODDS_API_URL: &str = "https://api.the-odds-api.com/v4";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,

    // Upstream data providers
    pub stats_api_url: String,
    pub odds_api_url: String,
    pub odds_api_key: Option<String>,
    pub provider_timeout_secs: u64,
    pub stats_window_games: u32,
    pub season: String,

    // Improvement cycle cadence
    pub cycle_period_secs: u64,
    pub cycle_cooldown_secs: u64,

    // Retrain policy
    pub retrain_min_sample: i64,
    pub retrain_win_rate_floor: Decimal,
    pub report_window_days: i64,
    pub policy_window_days: i64,

    // Model artifacts
    pub artifact_dir: String,

    // Prometheus exporter
    pub metrics_host: String,
    pub metrics_port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,

            stats_api_url: env::var("STATS_API_URL")
                .unwrap_or_else(|_| DEFAULT_STATS_API_URL.into()),
            odds_api_url: env::var("ODDS_API_URL")
                .unwrap_or_else(|_| DEFAULT_ODDS_API_URL.into()),
            odds_api_key: env::var("ODDS_API_KEY").ok(),
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            stats_window_games: env::var("STATS_WINDOW_GAMES")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            season: env::var("SEASON").unwrap_or_else(|_| "2025-26".into()),

            cycle_period_secs: env::var("CYCLE_PERIOD_SECS")
                .unwrap_or_else(|_| "86400".into())
                .parse()
                .unwrap_or(86_400),
            cycle_cooldown_secs: env::var("CYCLE_COOLDOWN_SECS")
                .unwrap_or_else(|_| "3600".into())
                .parse()
                .unwrap_or(3_600),

            retrain_min_sample: env::var("RETRAIN_MIN_SAMPLE")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .unwrap_or(20),
            retrain_win_rate_floor: env::var("RETRAIN_WIN_RATE_FLOOR")
                .unwrap_or_else(|_| "0.45".into())
                .parse()
                .unwrap_or(Decimal::new(45, 2)),
            report_window_days: env::var("REPORT_WINDOW_DAYS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
            policy_window_days: env::var("POLICY_WINDOW_DAYS")
                .unwrap_or_else(|_| "7".into())
                .parse()
                .unwrap_or(7),

            artifact_dir: env::var("ARTIFACT_DIR").unwrap_or_else(|_| "artifacts".into()),

            metrics_host: env::var("METRICS_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            metrics_port: env::var("METRICS_PORT")
                .unwrap_or_else(|_| "9090".into())
                .parse()?,
        })
    }
}
