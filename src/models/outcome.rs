use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{BetResult, BetType};

/// Database row for the prediction_outcomes table: one recorded prediction
/// and, once the game is Final, its settlement. Append-then-single-mutate;
/// rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PredictionOutcome {
    pub id: Uuid,
    pub recommendation_id: Uuid,
    pub game_id: Uuid,
    pub predicted_pick: String,
    pub predicted_confidence: Decimal,
    pub bet_type: String,
    pub model_used: String,
    pub feature_snapshot: serde_json::Value,
    pub pick_side: Option<String>,
    pub pick_line: Option<Decimal>,
    pub actual_result: String,
    pub actual_score_home: Option<i32>,
    pub actual_score_away: Option<i32>,
    pub profit_loss: Decimal,
    pub odds_at_bet: i32,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PredictionOutcome {
    /// Typed view of the stored result string. Unknown values read as
    /// pending so they are never treated as settled.
    pub fn result(&self) -> BetResult {
        BetResult::parse(&self.actual_result).unwrap_or(BetResult::Pending)
    }

    /// Typed view of the stored bet type, if recognized.
    pub fn bet_kind(&self) -> Option<BetType> {
        BetType::parse(&self.bet_type)
    }

    pub fn is_pending(&self) -> bool {
        self.result() == BetResult::Pending
    }
}
