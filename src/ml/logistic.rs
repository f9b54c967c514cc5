//! Logistic regression over snapshot features.
//!
//! Deliberately small: deterministic full-batch gradient descent, z-score
//! input normalization, JSON artifacts. Explicit shape validation so a
//! corrupt artifact fails fast at load instead of scoring garbage.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::info;

use crate::models::FeatureMap;

use super::{TrainError, Trainable, TrainedArtifact, TrainingFrame};

const EPOCHS: usize = 300;
const LEARNING_RATE: f64 = 0.1;

/// Serialized fit: one weight per feature name plus a bias, with the
/// normalization constants baked in at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub feature_mean: Vec<f64>,
    pub feature_std: Vec<f64>,

    /// Free-form training info (row count, timestamp).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl LogisticModel {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainError> {
        let content = std::fs::read_to_string(&path)?;
        let model: Self = serde_json::from_str(&content)?;
        model.validate().map_err(TrainError::Invalid)?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), String> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err("feature_names must not be empty".to_string());
        }
        if self.weights.len() != n {
            return Err(format!("weights len {} != features {n}", self.weights.len()));
        }
        if self.feature_mean.len() != n || self.feature_std.len() != n {
            return Err(format!(
                "normalization len {}/{} != features {n}",
                self.feature_mean.len(),
                self.feature_std.len()
            ));
        }
        if self.weights.iter().any(|w| !w.is_finite()) || !self.bias.is_finite() {
            return Err("weights contain non-finite values".to_string());
        }
        if self.feature_std.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err("feature_std must be finite and > 0".to_string());
        }
        Ok(())
    }

    /// Win probability for one feature map. Features the model was not
    /// trained on are ignored; trained features missing from the map read
    /// as 0.0 before normalization.
    pub fn score(&self, features: &FeatureMap) -> f64 {
        let mut z = self.bias;
        for (i, name) in self.feature_names.iter().enumerate() {
            let raw = features.get(name).copied().unwrap_or(0.0);
            let x = (raw - self.feature_mean[i]) / self.feature_std[i];
            z += self.weights[i] * x;
        }
        sigmoid(z)
    }
}

fn sigmoid(x: f64) -> f64 {
    // Numerically-stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

// ---------------------------------------------------------------------------
// Trainer
// ---------------------------------------------------------------------------

/// Owns the current fit for one model name and knows how to refit it from a
/// training frame. The fit is shared state: the improvement loop retrains it
/// while other tasks may be scoring.
pub struct LogisticTrainer {
    model_name: String,
    artifact_dir: PathBuf,
    state: RwLock<Option<LogisticModel>>,
}

impl LogisticTrainer {
    pub fn new(model_name: impl Into<String>, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_name: model_name.into(),
            artifact_dir: artifact_dir.into(),
            state: RwLock::new(None),
        }
    }

    /// Warm-start from a previously promoted artifact.
    pub async fn load_artifact(&self, path: &str) -> Result<(), TrainError> {
        let model = LogisticModel::from_file(path)?;
        *self.state.write().await = Some(model);
        info!(model = %self.model_name, path = %path, "Loaded model artifact");
        Ok(())
    }
}

#[async_trait]
impl Trainable for LogisticTrainer {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn train(&self, frame: &TrainingFrame) -> Result<Option<TrainedArtifact>, TrainError> {
        if frame.is_empty() {
            return Ok(None);
        }

        let model = fit(frame);
        let accuracy = in_sample_accuracy(&model, frame);

        std::fs::create_dir_all(&self.artifact_dir)?;
        let filename = format!(
            "{}-{}.json",
            self.model_name,
            Utc::now().format("%Y%m%d%H%M%S")
        );
        let path = self.artifact_dir.join(filename);
        std::fs::write(&path, serde_json::to_string_pretty(&model)?)?;

        let artifact_path = path.to_string_lossy().into_owned();
        info!(
            model = %self.model_name,
            rows = frame.len(),
            accuracy = accuracy,
            path = %artifact_path,
            "Trained model"
        );

        *self.state.write().await = Some(model);

        Ok(Some(TrainedArtifact {
            accuracy,
            artifact_path,
        }))
    }

    async fn predict(&self, features: &FeatureMap) -> Result<f64, TrainError> {
        let state = self.state.read().await;
        let model = state.as_ref().ok_or(TrainError::NotTrained)?;
        Ok(model.score(features))
    }
}

/// Full-batch gradient descent on the log loss. No randomness anywhere, so
/// the same frame always yields the same fit.
fn fit(frame: &TrainingFrame) -> LogisticModel {
    let n_rows = frame.rows.len();
    let n_features = frame.feature_names.len();

    let (mean, std) = column_stats(&frame.rows, n_features);

    // Normalize once up front.
    let normalized: Vec<Vec<f64>> = frame
        .rows
        .iter()
        .map(|row| {
            (0..n_features)
                .map(|i| (row[i] - mean[i]) / std[i])
                .collect()
        })
        .collect();

    let mut weights = vec![0.0_f64; n_features];
    let mut bias = 0.0_f64;
    let scale = 1.0 / n_rows as f64;

    for _ in 0..EPOCHS {
        let mut grad_w = vec![0.0_f64; n_features];
        let mut grad_b = 0.0_f64;

        for (row, &label) in normalized.iter().zip(&frame.labels) {
            let mut z = bias;
            for i in 0..n_features {
                z += weights[i] * row[i];
            }
            let err = sigmoid(z) - label;
            for i in 0..n_features {
                grad_w[i] += err * row[i];
            }
            grad_b += err;
        }

        for i in 0..n_features {
            weights[i] -= LEARNING_RATE * grad_w[i] * scale;
        }
        bias -= LEARNING_RATE * grad_b * scale;
    }

    LogisticModel {
        feature_names: frame.feature_names.clone(),
        weights,
        bias,
        feature_mean: mean,
        feature_std: std,
        metadata: serde_json::json!({
            "trained_at": Utc::now(),
            "rows": n_rows,
            "epochs": EPOCHS,
        }),
    }
}

fn column_stats(rows: &[Vec<f64>], n_features: usize) -> (Vec<f64>, Vec<f64>) {
    let n = rows.len() as f64;
    let mut mean = vec![0.0_f64; n_features];
    for row in rows {
        for i in 0..n_features {
            mean[i] += row[i];
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut std = vec![0.0_f64; n_features];
    for row in rows {
        for i in 0..n_features {
            let d = row[i] - mean[i];
            std[i] += d * d;
        }
    }
    for s in &mut std {
        *s = (*s / n).sqrt();
        // Constant columns normalize to zero instead of dividing by zero.
        if *s <= 1e-12 {
            *s = 1.0;
        }
    }

    (mean, std)
}

fn in_sample_accuracy(model: &LogisticModel, frame: &TrainingFrame) -> f64 {
    let mut correct = 0usize;
    for (row, &label) in frame.rows.iter().zip(&frame.labels) {
        let features: FeatureMap = frame
            .feature_names
            .iter()
            .cloned()
            .zip(row.iter().copied())
            .collect();
        let predicted = if model.score(&features) >= 0.5 { 1.0 } else { 0.0 };
        if (predicted - label).abs() < f64::EPSILON {
            correct += 1;
        }
    }
    correct as f64 / frame.rows.len() as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
