//! Trainable prediction models.
//!
//! The lifecycle manager treats models as opaque: anything implementing
//! [`Trainable`] can be fit on a frame of settled outcomes and asked for a
//! win probability. Artifacts are JSON on disk so a fit survives restarts.

pub mod logistic;

pub use logistic::{LogisticModel, LogisticTrainer};

use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::models::{BetResult, FeatureMap, FeatureSnapshot, PredictionOutcome};

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("no trained model loaded")]
    NotTrained,
}

/// Result of a successful training run: the in-sample accuracy and where
/// the artifact landed.
#[derive(Debug, Clone)]
pub struct TrainedArtifact {
    pub accuracy: f64,
    pub artifact_path: String,
}

/// A model the lifecycle manager can retrain and query.
#[async_trait]
pub trait Trainable: Send + Sync {
    /// Name this component trains under, matching `model_used` on outcomes.
    fn model_name(&self) -> &str;

    /// Fit on the frame and persist a fresh artifact. `Ok(None)` when the
    /// frame is empty: nothing was trained and nothing should be promoted.
    async fn train(&self, frame: &TrainingFrame) -> Result<Option<TrainedArtifact>, TrainError>;

    /// Win probability in [0, 1] for one feature map under the current fit.
    async fn predict(&self, features: &FeatureMap) -> Result<f64, TrainError>;
}

/// Dense labeled rows assembled from settled outcomes. The label is 1.0 for
/// a win and 0.0 for a loss; pushes are excluded upstream since they say
/// nothing about pick quality.
#[derive(Debug, Clone, Default)]
pub struct TrainingFrame {
    /// Sorted union of feature names across all rows. Every row is dense in
    /// this order; features a snapshot lacks fill with 0.0.
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
}

impl TrainingFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build a frame from settled outcomes. Rows that are not a decided
    /// win/loss, or whose snapshot decodes to no features, are skipped.
    pub fn from_outcomes(outcomes: &[PredictionOutcome]) -> Self {
        let mut labeled: Vec<(FeatureMap, f64)> = Vec::new();

        for outcome in outcomes {
            let label = match outcome.result() {
                BetResult::Win => 1.0,
                BetResult::Loss => 0.0,
                BetResult::Push | BetResult::Pending => continue,
            };

            let Ok(snapshot) = FeatureSnapshot::from_value(&outcome.feature_snapshot) else {
                continue;
            };
            if snapshot.features.is_empty() {
                continue;
            }
            labeled.push((snapshot.features, label));
        }

        let names: BTreeSet<&str> = labeled
            .iter()
            .flat_map(|(features, _)| features.keys().map(String::as_str))
            .collect();
        let feature_names: Vec<String> = names.into_iter().map(str::to_string).collect();

        let mut rows = Vec::with_capacity(labeled.len());
        let mut labels = Vec::with_capacity(labeled.len());
        for (features, label) in &labeled {
            let row: Vec<f64> = feature_names
                .iter()
                .map(|name| features.get(name).copied().unwrap_or(0.0))
                .collect();
            rows.push(row);
            labels.push(*label);
        }

        Self {
            feature_names,
            rows,
            labels,
        }
    }
}
