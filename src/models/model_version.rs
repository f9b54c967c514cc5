use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the model_versions table: one trained artifact for a
/// named model. At most one row per model_name is active at a time,
/// enforced by the transactional promote plus a partial unique index.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModelVersion {
    pub id: Uuid,
    pub model_name: String,
    pub version: String,
    pub is_active: bool,
    pub accuracy: Option<f64>,
    pub artifact_path: String,
    pub created_at: Option<DateTime<Utc>>,
}
