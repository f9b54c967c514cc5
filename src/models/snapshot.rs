use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat metric-name -> value map used for feature snapshots and model input.
pub type FeatureMap = BTreeMap<String, f64>;

/// Bump when the snapshot field layout changes so stored blobs stay
/// interpretable.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Point-in-time capture of the inputs a prediction was made from.
///
/// Stored as an opaque JSONB blob; this struct is the agreed-upon shape at
/// the application boundary so producers and consumers cannot drift apart
/// silently. A snapshot is always produced, even when providers fail — the
/// failed metrics are zeroed and `error` describes what degraded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    pub schema_version: u32,
    pub captured_at: DateTime<Utc>,
    pub features: FeatureMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FeatureSnapshot {
    pub fn new(features: FeatureMap) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            captured_at: Utc::now(),
            features,
            error: None,
        }
    }

    /// True when at least one provider failed during capture.
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Decode a stored blob. Blobs written by older producers that predate
    /// the schema_version field decode with version 0.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Stored {
            #[serde(default)]
            schema_version: u32,
            #[serde(default = "Utc::now")]
            captured_at: DateTime<Utc>,
            #[serde(default)]
            features: FeatureMap,
            #[serde(default)]
            error: Option<String>,
        }

        let stored: Stored = serde_json::from_value(value.clone())?;
        Ok(Self {
            schema_version: stored.schema_version,
            captured_at: stored.captured_at,
            features: stored.features,
            error: stored.error,
        })
    }
}
