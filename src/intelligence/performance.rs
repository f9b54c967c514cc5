use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{BetResult, PredictionOutcome};

use super::settlement::STAKE;

/// Aggregated betting performance for one model over a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub total_bets: i64,
    pub wins: i64,
    pub losses: i64,
    pub pushes: i64,
    pub win_rate: Decimal,
    pub total_profit: Decimal,
    pub roi_pct: Decimal,
}

impl ModelPerformance {
    pub fn empty() -> Self {
        Self {
            total_bets: 0,
            wins: 0,
            losses: 0,
            pushes: 0,
            win_rate: Decimal::ZERO,
            total_profit: Decimal::ZERO,
            roi_pct: Decimal::ZERO,
        }
    }
}

/// Compute performance over a set of outcomes. Pending rows are ignored;
/// only settled bets count toward the totals.
pub fn summarize(outcomes: &[PredictionOutcome]) -> ModelPerformance {
    summarize_iter(outcomes.iter())
}

/// Performance over only the outcomes created at or after `since`.
pub fn summarize_window(outcomes: &[PredictionOutcome], since: DateTime<Utc>) -> ModelPerformance {
    summarize_iter(outcomes.iter().filter(|o| o.created_at >= since))
}

/// Group outcomes by `model_used` and compute performance per model.
pub fn summarize_by_model(outcomes: &[PredictionOutcome]) -> BTreeMap<String, ModelPerformance> {
    let mut groups: BTreeMap<&str, Vec<&PredictionOutcome>> = BTreeMap::new();
    for outcome in outcomes {
        groups
            .entry(outcome.model_used.as_str())
            .or_default()
            .push(outcome);
    }

    groups
        .into_iter()
        .map(|(model, rows)| (model.to_string(), summarize_iter(rows.into_iter())))
        .collect()
}

fn summarize_iter<'a>(outcomes: impl Iterator<Item = &'a PredictionOutcome>) -> ModelPerformance {
    let mut wins = 0i64;
    let mut losses = 0i64;
    let mut pushes = 0i64;
    let mut total_profit = Decimal::ZERO;

    for outcome in outcomes {
        match outcome.result() {
            BetResult::Win => wins += 1,
            BetResult::Loss => losses += 1,
            BetResult::Push => pushes += 1,
            BetResult::Pending => continue,
        }
        total_profit += outcome.profit_loss;
    }

    let total_bets = wins + losses + pushes;
    if total_bets == 0 {
        return ModelPerformance::empty();
    }

    let total = Decimal::from(total_bets);
    let win_rate = Decimal::from(wins) / total;
    // ROI is profit over total notional staked, as a percentage.
    let roi_pct = total_profit / (total * STAKE) * Decimal::ONE_HUNDRED;

    ModelPerformance {
        total_bets,
        wins,
        losses,
        pushes,
        win_rate,
        total_profit,
        roi_pct,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
