use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use fastbreak::ml::{TrainError, Trainable, TrainedArtifact, TrainingFrame};
use fastbreak::models::{FeatureMap, Game, PredictionOutcome, Recommendation};
use fastbreak::providers::{
    BettingLine, OddsProvider, ProviderError, RollingStats, StatsProvider,
};
use fastbreak::services::{
    CycleSettings, ImprovementEngine, ModelLifecycleManager, SnapshotCapturer,
};

static DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Tests share one database and the setup below wipes tables, so every test
/// takes this lock before touching the pool.
#[allow(dead_code)]
pub async fn db_lock() -> MutexGuard<'static, ()> {
    DB_LOCK.get_or_init(|| Mutex::new(())).lock().await
}

/// Connect to the test database and run all migrations. Returns None with a
/// notice when TEST_DATABASE_URL is unset, so the suite still passes on
/// machines without Postgres.
#[allow(dead_code)]
pub async fn setup_test_db() -> Option<PgPool> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Clean tables for test isolation
    sqlx::query("DELETE FROM prediction_outcomes").execute(&pool).await.ok();
    sqlx::query("DELETE FROM recommendations").execute(&pool).await.ok();
    sqlx::query("DELETE FROM model_versions").execute(&pool).await.ok();
    sqlx::query("DELETE FROM games").execute(&pool).await.ok();

    Some(pool)
}

/// Seed a scheduled game for testing.
#[allow(dead_code)]
pub async fn seed_game(pool: &PgPool, home_team: &str, away_team: &str) -> Game {
    let game_date: NaiveDate = Utc::now().date_naive();

    sqlx::query_as::<_, Game>(
        r#"
        INSERT INTO games (home_team, away_team, game_date, season, status)
        VALUES ($1, $2, $3, '2025-26', 'scheduled')
        RETURNING *
        "#,
    )
    .bind(home_team)
    .bind(away_team)
    .bind(game_date)
    .fetch_one(pool)
    .await
    .expect("Failed to seed game")
}

/// Seed a recommendation for a game.
#[allow(dead_code)]
pub async fn seed_recommendation(
    pool: &PgPool,
    game_id: Uuid,
    pick: &str,
    bet_type: &str,
    odds: i32,
) -> Recommendation {
    sqlx::query_as::<_, Recommendation>(
        r#"
        INSERT INTO recommendations (game_id, pick, bet_type, confidence, odds)
        VALUES ($1, $2, $3, 0.62, $4)
        RETURNING *
        "#,
    )
    .bind(game_id)
    .bind(pick)
    .bind(bet_type)
    .bind(odds)
    .fetch_one(pool)
    .await
    .expect("Failed to seed recommendation")
}

/// Seed an already-settled outcome `days_ago` in the past, backed by its own
/// game and recommendation. The snapshot carries a couple of features keyed
/// off the result so the row is usable as training data.
#[allow(dead_code)]
pub async fn seed_settled_outcome(
    pool: &PgPool,
    model: &str,
    result: &str,
    profit: Decimal,
    days_ago: i64,
) -> PredictionOutcome {
    let game = seed_game(pool, "Boston Celtics", "Miami Heat").await;
    let rec = seed_recommendation(pool, game.id, "Celtics -6.5", "spread", -110).await;

    let created_at = Utc::now() - Duration::days(days_ago);
    let home_ppg = if result == "win" { 115.0 } else { 102.0 };
    let snapshot = serde_json::json!({
        "schema_version": 1,
        "captured_at": created_at,
        "features": { "home_ppg": home_ppg, "away_ppg": 108.0 },
    });

    sqlx::query_as::<_, PredictionOutcome>(
        r#"
        INSERT INTO prediction_outcomes
            (recommendation_id, game_id, predicted_pick, predicted_confidence,
             bet_type, model_used, feature_snapshot, actual_result,
             actual_score_home, actual_score_away, profit_loss, odds_at_bet,
             created_at, resolved_at)
        VALUES ($1, $2, $3, 0.62, 'spread', $4, $5, $6, 110, 102, $7, -110, $8, $8)
        RETURNING *
        "#,
    )
    .bind(rec.id)
    .bind(game.id)
    .bind(&rec.pick)
    .bind(model)
    .bind(snapshot)
    .bind(result)
    .bind(profit)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .expect("Failed to seed settled outcome")
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Stats provider that always answers with fixed numbers.
#[allow(dead_code)]
pub struct FakeStats;

#[async_trait]
impl StatsProvider for FakeStats {
    async fn rolling_team_stats(
        &self,
        _team: &str,
        _as_of: NaiveDate,
        _window: u32,
    ) -> Result<RollingStats, ProviderError> {
        Ok(RollingStats {
            ppg: 112.0,
            rpg: 44.5,
            apg: 25.0,
        })
    }

    async fn hustle_defense_stats(
        &self,
        _team: &str,
        _season: &str,
    ) -> Result<FeatureMap, ProviderError> {
        let mut m = FeatureMap::new();
        m.insert("deflections".into(), 14.0);
        Ok(m)
    }
}

/// Odds provider with no published line.
#[allow(dead_code)]
pub struct FakeOdds;

#[async_trait]
impl OddsProvider for FakeOdds {
    async fn latest_line(&self, _game: &Game) -> Result<Option<BettingLine>, ProviderError> {
        Ok(None)
    }
}

/// Trainer that reports success on any non-empty frame without touching disk.
#[allow(dead_code)]
pub struct FakeTrainer {
    pub name: String,
}

#[async_trait]
impl Trainable for FakeTrainer {
    fn model_name(&self) -> &str {
        &self.name
    }

    async fn train(&self, frame: &TrainingFrame) -> Result<Option<TrainedArtifact>, TrainError> {
        if frame.is_empty() {
            return Ok(None);
        }
        Ok(Some(TrainedArtifact {
            accuracy: 0.61,
            artifact_path: format!("/tmp/fastbreak-test-{}.json", self.name),
        }))
    }

    async fn predict(&self, _features: &FeatureMap) -> Result<f64, TrainError> {
        Ok(0.5)
    }
}

/// Build an engine over fake providers with default cycle settings.
#[allow(dead_code)]
pub fn test_engine(pool: PgPool, trainers: Vec<Arc<dyn Trainable>>) -> ImprovementEngine {
    let capturer = SnapshotCapturer::new(Arc::new(FakeStats), Arc::new(FakeOdds), 10, "2025-26");
    let lifecycle = ModelLifecycleManager::new(pool.clone(), trainers);
    ImprovementEngine::new(pool, capturer, lifecycle, CycleSettings::default())
}
