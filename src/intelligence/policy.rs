use rust_decimal::Decimal;

use super::performance::ModelPerformance;

/// Gates for the retrain decision. Defaults follow the production policy:
/// at least 20 settled bets before the win rate is trusted, retrain once it
/// sits under 45%.
#[derive(Debug, Clone, Copy)]
pub struct RetrainThresholds {
    pub min_sample: i64,
    pub win_rate_floor: Decimal,
}

impl Default for RetrainThresholds {
    fn default() -> Self {
        Self {
            min_sample: 20,
            win_rate_floor: Decimal::new(45, 2),
        }
    }
}

/// Pure retrain decision: enough sample AND win rate under the floor.
/// Deliberately free of I/O so it stays independently testable.
pub fn should_retrain(metrics: &ModelPerformance, thresholds: &RetrainThresholds) -> bool {
    metrics.total_bets >= thresholds.min_sample && metrics.win_rate < thresholds.win_rate_floor
}
