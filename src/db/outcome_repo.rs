use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{PredictionOutcome, Recommendation};

/// Record a recommendation as a pending outcome awaiting settlement.
pub async fn insert_outcome(
    pool: &PgPool,
    rec: &Recommendation,
    model_used: &str,
    feature_snapshot: serde_json::Value,
) -> Result<PredictionOutcome, sqlx::Error> {
    let outcome = sqlx::query_as::<_, PredictionOutcome>(
        r#"
        INSERT INTO prediction_outcomes
            (recommendation_id, game_id, predicted_pick, predicted_confidence,
             bet_type, model_used, feature_snapshot, pick_side, pick_line, odds_at_bet)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(rec.id)
    .bind(rec.game_id)
    .bind(&rec.pick)
    .bind(rec.confidence)
    .bind(&rec.bet_type)
    .bind(model_used)
    .bind(feature_snapshot)
    .bind(&rec.pick_side)
    .bind(rec.line)
    .bind(rec.odds)
    .fetch_one(pool)
    .await?;

    Ok(outcome)
}

/// Get all outcomes still awaiting settlement, oldest first.
pub async fn get_pending_outcomes(pool: &PgPool) -> Result<Vec<PredictionOutcome>, sqlx::Error> {
    sqlx::query_as::<_, PredictionOutcome>(
        "SELECT * FROM prediction_outcomes WHERE actual_result = 'pending' ORDER BY created_at",
    )
    .fetch_all(pool)
    .await
}

/// Count outcomes still awaiting settlement.
pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM prediction_outcomes WHERE actual_result = 'pending'")
            .fetch_one(pool)
            .await?;

    Ok(row.0)
}

/// Settle a pending outcome with its graded result, final scores and P/L.
///
/// The `actual_result = 'pending'` guard makes settlement idempotent: a row
/// already settled by a concurrent pass is left untouched and this returns
/// false.
pub async fn settle_outcome(
    pool: &PgPool,
    outcome_id: Uuid,
    result: &str,
    home_score: i32,
    away_score: i32,
    profit_loss: Decimal,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        r#"
        UPDATE prediction_outcomes
        SET actual_result = $2,
            actual_score_home = $3,
            actual_score_away = $4,
            profit_loss = $5,
            resolved_at = NOW()
        WHERE id = $1 AND actual_result = 'pending'
        "#,
    )
    .bind(outcome_id)
    .bind(result)
    .bind(home_score)
    .bind(away_score)
    .bind(profit_loss)
    .execute(pool)
    .await?;

    Ok(res.rows_affected() > 0)
}

/// Get all settled outcomes created in the window, across every model.
pub async fn get_settled_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<PredictionOutcome>, sqlx::Error> {
    sqlx::query_as::<_, PredictionOutcome>(
        r#"
        SELECT * FROM prediction_outcomes
        WHERE actual_result <> 'pending' AND created_at >= $1
        ORDER BY created_at
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await
}

/// Get one model's settled outcomes created in the window.
pub async fn get_settled_for_model_since(
    pool: &PgPool,
    model_used: &str,
    since: DateTime<Utc>,
) -> Result<Vec<PredictionOutcome>, sqlx::Error> {
    sqlx::query_as::<_, PredictionOutcome>(
        r#"
        SELECT * FROM prediction_outcomes
        WHERE model_used = $1 AND actual_result <> 'pending' AND created_at >= $2
        ORDER BY created_at
        "#,
    )
    .bind(model_used)
    .bind(since)
    .fetch_all(pool)
    .await
}

/// Get the most recent decided outcomes (win/loss) for a model, newest first.
/// Pushes carry no signal about pick quality and are excluded from training.
pub async fn get_training_rows(
    pool: &PgPool,
    model_used: &str,
    limit: i64,
) -> Result<Vec<PredictionOutcome>, sqlx::Error> {
    sqlx::query_as::<_, PredictionOutcome>(
        r#"
        SELECT * FROM prediction_outcomes
        WHERE model_used = $1 AND actual_result IN ('win', 'loss')
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(model_used)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Get a single outcome by id.
pub async fn get_outcome(
    pool: &PgPool,
    outcome_id: Uuid,
) -> Result<Option<PredictionOutcome>, sqlx::Error> {
    sqlx::query_as::<_, PredictionOutcome>("SELECT * FROM prediction_outcomes WHERE id = $1")
        .bind(outcome_id)
        .fetch_optional(pool)
        .await
}
