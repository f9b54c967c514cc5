use metrics::counter;
use sqlx::PgPool;

use crate::db::outcome_repo;
use crate::errors::EngineError;
use crate::models::{FeatureSnapshot, PredictionOutcome, Recommendation};

/// Writes the pending outcome row for a recommendation at prediction time.
pub struct PredictionRecorder {
    pool: PgPool,
}

impl PredictionRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a recommendation as a pending outcome, copying its pick,
    /// confidence and bet type, and serializing the snapshot alongside.
    /// One insert; a failure writes nothing.
    pub async fn record(
        &self,
        rec: &Recommendation,
        model_used: &str,
        snapshot: &FeatureSnapshot,
    ) -> Result<PredictionOutcome, EngineError> {
        let blob = serde_json::to_value(snapshot)?;
        let outcome = outcome_repo::insert_outcome(&self.pool, rec, model_used, blob).await?;

        counter!("predictions_recorded_total").increment(1);
        tracing::info!(
            outcome_id = %outcome.id,
            game_id = %outcome.game_id,
            model = %model_used,
            bet_type = %outcome.bet_type,
            pick = %outcome.predicted_pick,
            degraded = snapshot.is_degraded(),
            "Prediction recorded"
        );

        Ok(outcome)
    }
}
