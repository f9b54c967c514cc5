use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::intelligence::performance::ModelPerformance;

/// Outcome of one retrain attempt inside a cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainAction {
    pub model_name: String,
    pub succeeded: bool,
    pub detail: String,
}

/// Qualitative observation derived from the cycle's metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    /// Two models with enough samples diverge materially on win rate.
    WinRateGap {
        leader: String,
        laggard: String,
        gap_pct_points: Decimal,
    },
    /// A model's recent window is well below its longer baseline.
    PerformanceDecline {
        model_name: String,
        recent_win_rate: Decimal,
        baseline_win_rate: Decimal,
        drop_pct_points: Decimal,
    },
}

/// Structured result of one improvement cycle: what got settled, how each
/// model is doing, what was retrained, and anything worth a human look.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Predictions settled by this cycle's resolution pass.
    pub resolved: u64,
    /// Pending rows the pass could not settle despite a Final game:
    /// unparseable picks and unsupported bet types.
    pub stuck_pending: u64,
    /// Per-model metrics over the report window (30 days by default).
    pub model_metrics: BTreeMap<String, ModelPerformance>,
    pub retrain_actions: Vec<RetrainAction>,
    pub insights: Vec<Insight>,
}

impl CycleReport {
    pub fn retrains_attempted(&self) -> usize {
        self.retrain_actions.len()
    }

    pub fn retrains_succeeded(&self) -> usize {
        self.retrain_actions.iter().filter(|a| a.succeeded).count()
    }
}
