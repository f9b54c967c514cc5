use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Game status value that marks a game as settled-eligible.
pub const GAME_STATUS_FINAL: &str = "Final";

/// Database row for the games table. Populated by the ingestion side;
/// read-only in this service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub game_date: NaiveDate,
    pub season: String,
    pub status: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Terminal state check: only Final games are eligible for settlement.
    pub fn is_final(&self) -> bool {
        self.status.eq_ignore_ascii_case(GAME_STATUS_FINAL)
    }

    /// Both final scores, present only once the game has been scored.
    pub fn final_scores(&self) -> Option<(i32, i32)> {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => Some((h, a)),
            _ => None,
        }
    }
}

/// Database row for the recommendations table: the pick a model produced
/// for a game, as published to bettors. Read-only here; the recorder copies
/// its fields into a PredictionOutcome.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recommendation {
    pub id: Uuid,
    pub game_id: Uuid,
    pub pick: String,
    pub bet_type: String,
    pub confidence: Decimal,
    pub pick_side: Option<String>,
    pub line: Option<Decimal>,
    pub odds: i32,
    pub created_at: Option<DateTime<Utc>>,
}
