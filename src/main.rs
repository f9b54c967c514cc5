use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fastbreak::config::AppConfig;
use fastbreak::db::{self, model_repo};
use fastbreak::intelligence::RetrainThresholds;
use fastbreak::metrics::init_metrics;
use fastbreak::ml::logistic::LogisticTrainer;
use fastbreak::ml::Trainable;
use fastbreak::providers::{OddsApiClient, StatsApiClient};
use fastbreak::services::{
    run_improvement_loop, CycleSettings, ImprovementEngine, ModelLifecycleManager,
    SnapshotCapturer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let metrics_addr: SocketAddr =
        format!("{}:{}", config.metrics_host, config.metrics_port).parse()?;
    init_metrics(metrics_addr)?;
    tracing::info!(addr = %metrics_addr, "Prometheus exporter listening");

    // --- Upstream providers ---
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider_timeout_secs))
        .build()?;

    let stats = StatsApiClient::new(http.clone(), config.stats_api_url.clone());
    let api_key = config.odds_api_key.clone().unwrap_or_else(|| {
        tracing::warn!("ODDS_API_KEY not set; betting lines will be missing from snapshots");
        String::new()
    });
    let odds = OddsApiClient::new(http, config.odds_api_url.clone(), api_key);

    let capturer = SnapshotCapturer::new(
        Arc::new(stats),
        Arc::new(odds),
        config.stats_window_games,
        config.season.clone(),
    );

    // --- Models ---
    let trainer = LogisticTrainer::new("logistic", config.artifact_dir.clone());
    if let Some(version) = model_repo::get_active_version(&pool, trainer.model_name()).await? {
        match trainer.load_artifact(&version.artifact_path).await {
            Ok(()) => tracing::info!(
                model = %version.model_name,
                version = %version.version,
                "Active model artifact loaded"
            ),
            Err(e) => tracing::warn!(
                model = %version.model_name,
                version = %version.version,
                error = %e,
                "Could not load active model artifact; model starts cold"
            ),
        }
    }

    let lifecycle = ModelLifecycleManager::new(pool.clone(), vec![Arc::new(trainer)]);

    // --- Improvement engine ---
    let settings = CycleSettings {
        thresholds: RetrainThresholds {
            min_sample: config.retrain_min_sample,
            win_rate_floor: config.retrain_win_rate_floor,
        },
        report_window_days: config.report_window_days,
        policy_window_days: config.policy_window_days,
    };
    let engine = Arc::new(ImprovementEngine::new(pool, capturer, lifecycle, settings));

    tokio::spawn(run_improvement_loop(
        engine,
        config.cycle_period_secs,
        config.cycle_cooldown_secs,
    ));
    tracing::info!(
        period_secs = config.cycle_period_secs,
        cooldown_secs = config.cycle_cooldown_secs,
        "Improvement loop spawned"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
