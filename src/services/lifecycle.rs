use std::sync::Arc;

use chrono::Utc;
use metrics::{counter, gauge};
use sqlx::PgPool;

use crate::db::{model_repo, outcome_repo};
use crate::errors::EngineError;
use crate::ml::{Trainable, TrainingFrame};
use crate::models::ModelVersion;

/// How many recent decided outcomes feed one retrain.
const TRAINING_ROWS_LIMIT: i64 = 500;

/// Retrains registered models and promotes the resulting versions.
pub struct ModelLifecycleManager {
    pool: PgPool,
    trainers: Vec<Arc<dyn Trainable>>,
}

impl ModelLifecycleManager {
    pub fn new(pool: PgPool, trainers: Vec<Arc<dyn Trainable>>) -> Self {
        Self { pool, trainers }
    }

    fn trainer_for(&self, model_name: &str) -> Option<&Arc<dyn Trainable>> {
        self.trainers.iter().find(|t| t.model_name() == model_name)
    }

    /// Retrain a model from its recent decided outcomes and promote the new
    /// version. Returns false when there was nothing to train on; metadata
    /// is untouched in that case.
    pub async fn retrain(&self, model_name: &str) -> Result<bool, EngineError> {
        let trainer = self
            .trainer_for(model_name)
            .ok_or_else(|| EngineError::UnknownModel(model_name.to_string()))?;

        let rows =
            outcome_repo::get_training_rows(&self.pool, model_name, TRAINING_ROWS_LIMIT).await?;
        let frame = TrainingFrame::from_outcomes(&rows);

        let Some(artifact) = trainer.train(&frame).await? else {
            counter!("retrains_failed_total").increment(1);
            tracing::warn!(
                model = %model_name,
                rows = rows.len(),
                "Retrain aborted: no usable training data"
            );
            return Ok(false);
        };

        let version = format!("v{}", Utc::now().format("%Y%m%d%H%M%S%3f"));
        let promoted = model_repo::promote_version(
            &self.pool,
            model_name,
            &version,
            artifact.accuracy,
            &artifact.artifact_path,
        )
        .await?;

        counter!("retrains_succeeded_total").increment(1);
        gauge!("active_model_accuracy", "model" => model_name.to_string())
            .set(artifact.accuracy);
        tracing::info!(
            model = %model_name,
            version = %promoted.version,
            accuracy = artifact.accuracy,
            artifact = %artifact.artifact_path,
            "Model retrained and promoted"
        );

        Ok(true)
    }

    /// The currently active version for a model, if one was ever promoted.
    pub async fn active_version(
        &self,
        model_name: &str,
    ) -> Result<Option<ModelVersion>, EngineError> {
        Ok(model_repo::get_active_version(&self.pool, model_name).await?)
    }

    /// Names of all models this manager can retrain.
    pub fn registered_models(&self) -> Vec<&str> {
        self.trainers.iter().map(|t| t.model_name()).collect()
    }
}
