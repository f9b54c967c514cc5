use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::Insight;

use super::performance::ModelPerformance;

/// Both models need this many settled bets before a pairwise comparison
/// means anything.
const PAIRWISE_MIN_SAMPLE: i64 = 20;

/// Win-rate gap, in percentage points, worth flagging between two models.
const GAP_THRESHOLD_PP: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Recent-vs-baseline drop, in percentage points, worth flagging for one model.
const DECLINE_THRESHOLD_PP: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Derive qualitative observations from the cycle's metrics windows:
/// material pairwise win-rate gaps on the report window, and per-model
/// declines of the recent window against the baseline.
pub fn derive_insights(
    baseline: &BTreeMap<String, ModelPerformance>,
    recent: &BTreeMap<String, ModelPerformance>,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    // Pairwise gaps. BTreeMap iteration is name-ordered, so the output is
    // deterministic for a given set of metrics.
    let models: Vec<(&String, &ModelPerformance)> = baseline.iter().collect();
    for (i, (name_a, perf_a)) in models.iter().enumerate() {
        for (name_b, perf_b) in models.iter().skip(i + 1) {
            if perf_a.total_bets < PAIRWISE_MIN_SAMPLE || perf_b.total_bets < PAIRWISE_MIN_SAMPLE {
                continue;
            }

            let gap_pp = (perf_a.win_rate - perf_b.win_rate) * Decimal::ONE_HUNDRED;
            if gap_pp.abs() > GAP_THRESHOLD_PP {
                let (leader, laggard) = if gap_pp > Decimal::ZERO {
                    (name_a.as_str(), name_b.as_str())
                } else {
                    (name_b.as_str(), name_a.as_str())
                };
                insights.push(Insight::WinRateGap {
                    leader: leader.to_string(),
                    laggard: laggard.to_string(),
                    gap_pct_points: gap_pp.abs(),
                });
            }
        }
    }

    // Declines. Only meaningful when both windows actually contain bets.
    for (name, base) in baseline {
        let Some(recent_perf) = recent.get(name) else {
            continue;
        };
        if base.total_bets == 0 || recent_perf.total_bets == 0 {
            continue;
        }

        let drop_pp = (base.win_rate - recent_perf.win_rate) * Decimal::ONE_HUNDRED;
        if drop_pp > DECLINE_THRESHOLD_PP {
            insights.push(Insight::PerformanceDecline {
                model_name: name.clone(),
                recent_win_rate: recent_perf.win_rate,
                baseline_win_rate: base.win_rate,
                drop_pct_points: drop_pp,
            });
        }
    }

    insights
}
