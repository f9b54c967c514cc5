pub mod game;
pub mod model_version;
pub mod outcome;
pub mod report;
pub mod snapshot;

pub use game::{Game, Recommendation};
pub use model_version::ModelVersion;
pub use outcome::PredictionOutcome;
pub use report::{CycleReport, Insight, RetrainAction};
pub use snapshot::{FeatureMap, FeatureSnapshot};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// BetType
// ---------------------------------------------------------------------------

/// The kind of wager a recommendation represents. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    Spread,
    Total,
    Moneyline,
    Prop,
}

impl BetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetType::Spread => "spread",
            BetType::Total => "total",
            BetType::Moneyline => "moneyline",
            BetType::Prop => "prop",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "spread" => Some(BetType::Spread),
            "total" | "over_under" => Some(BetType::Total),
            "moneyline" | "ml" => Some(BetType::Moneyline),
            "prop" => Some(BetType::Prop),
            _ => None,
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BetResult
// ---------------------------------------------------------------------------

/// Settlement state of a recorded prediction. Transitions only
/// `pending -> {win, loss, push}`, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Pending,
    Win,
    Loss,
    Push,
}

impl BetResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetResult::Pending => "pending",
            BetResult::Win => "win",
            BetResult::Loss => "loss",
            BetResult::Push => "push",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(BetResult::Pending),
            "win" => Some(BetResult::Win),
            "loss" => Some(BetResult::Loss),
            "push" => Some(BetResult::Push),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, BetResult::Pending)
    }
}

impl fmt::Display for BetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
