use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{BetResult, BetType, Game, PredictionOutcome};

/// Notional stake per recorded bet, in units. American odds quote profit
/// against a 100-unit stake, so P/L lands in the same units.
pub const STAKE: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickParseError {
    #[error("no line found in pick text")]
    MissingLine,

    #[error("pick names neither team")]
    UnknownSide,

    #[error("pick text matches both teams")]
    AmbiguousTeam,

    #[error("total pick has no over/under direction")]
    MissingDirection,

    #[error("bet type not settleable: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Some(TeamSide::Home),
            "away" => Some(TeamSide::Away),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalSide {
    Over,
    Under,
}

impl TotalSide {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "over" => Some(TotalSide::Over),
            "under" => Some(TotalSide::Under),
            _ => None,
        }
    }
}

/// A pick reduced to the fields settlement needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradedPick {
    /// `line` is signed from the picked side's perspective: negative means
    /// the pick must win by more than |line|, positive means it may lose by
    /// less than line.
    Spread { side: TeamSide, line: Decimal },
    Total { side: TotalSide, line: Decimal },
    Moneyline { side: TeamSide },
}

// ---------------------------------------------------------------------------
// Pick extraction
// ---------------------------------------------------------------------------

/// Recover the settleable pick for an outcome.
///
/// Structured `pick_side`/`pick_line` columns written at record time are
/// authoritative. Rows recorded before those columns existed fall back to
/// parsing the free-text pick; anything the parser cannot pin down is an
/// error, never a guess, and the outcome stays pending.
pub fn pick_for_outcome(
    outcome: &PredictionOutcome,
    game: &Game,
) -> Result<GradedPick, PickParseError> {
    let bet_type = outcome
        .bet_kind()
        .ok_or_else(|| PickParseError::Unsupported(outcome.bet_type.clone()))?;

    match bet_type {
        BetType::Spread => {
            if let (Some(side), Some(line)) = (structured_team_side(outcome), outcome.pick_line) {
                return Ok(GradedPick::Spread { side, line });
            }
            parse_spread_pick(&outcome.predicted_pick, game)
        }
        BetType::Total => {
            if let (Some(side), Some(line)) = (structured_total_side(outcome), outcome.pick_line) {
                return Ok(GradedPick::Total { side, line });
            }
            parse_total_pick(&outcome.predicted_pick)
        }
        BetType::Moneyline => {
            if let Some(side) = structured_team_side(outcome) {
                return Ok(GradedPick::Moneyline { side });
            }
            let side = team_side_from_text(&outcome.predicted_pick, game)?;
            Ok(GradedPick::Moneyline { side })
        }
        BetType::Prop => Err(PickParseError::Unsupported("prop".into())),
    }
}

fn structured_team_side(outcome: &PredictionOutcome) -> Option<TeamSide> {
    outcome.pick_side.as_deref().and_then(TeamSide::parse)
}

fn structured_total_side(outcome: &PredictionOutcome) -> Option<TotalSide> {
    outcome.pick_side.as_deref().and_then(TotalSide::parse)
}

/// Parse a spread pick like "Celtics -6.5" against the game's teams.
fn parse_spread_pick(pick: &str, game: &Game) -> Result<GradedPick, PickParseError> {
    let side = team_side_from_text(pick, game)?;
    let line = first_number(pick).ok_or(PickParseError::MissingLine)?;
    Ok(GradedPick::Spread { side, line })
}

/// Parse a total pick like "Over 220.5".
fn parse_total_pick(pick: &str) -> Result<GradedPick, PickParseError> {
    let side = pick
        .split_whitespace()
        .find_map(TotalSide::parse)
        .ok_or(PickParseError::MissingDirection)?;
    let line = first_number(pick).ok_or(PickParseError::MissingLine)?;
    Ok(GradedPick::Total { side, line })
}

/// Which of the game's teams the pick text names. Matching either both or
/// neither team is an error, not a coin flip.
fn team_side_from_text(pick: &str, game: &Game) -> Result<TeamSide, PickParseError> {
    let home = mentions_team(pick, &game.home_team);
    let away = mentions_team(pick, &game.away_team);

    match (home, away) {
        (true, true) => Err(PickParseError::AmbiguousTeam),
        (true, false) => Ok(TeamSide::Home),
        (false, true) => Ok(TeamSide::Away),
        (false, false) => Err(PickParseError::UnknownSide),
    }
}

fn mentions_team(pick: &str, team: &str) -> bool {
    let pick = pick.to_lowercase();
    let team = team.to_lowercase();

    if pick.contains(&team) {
        return true;
    }

    // Picks usually carry just the nickname ("Celtics -6.5"), the last word
    // of the full team name. Whole-word match so "Heat" never hits "heater".
    match team.split_whitespace().last() {
        Some(nick) => pick.split_whitespace().any(|w| w == nick),
        None => false,
    }
}

/// First token that parses as a number, with a leading '+' tolerated
/// ("+5.5" is a valid underdog line).
fn first_number(pick: &str) -> Option<Decimal> {
    pick.split_whitespace()
        .find_map(|token| token.trim_start_matches('+').parse::<Decimal>().ok())
}

// ---------------------------------------------------------------------------
// Grading
// ---------------------------------------------------------------------------

/// Grade a pick against the final score.
///
/// Spread and total use the adjusted-margin rule: a result landing exactly
/// on the line is a push (impossible on half-point lines). A tied moneyline
/// game also pushes.
pub fn grade(pick: &GradedPick, home_score: i32, away_score: i32) -> BetResult {
    match *pick {
        GradedPick::Spread { side, line } => {
            let margin = match side {
                TeamSide::Home => home_score - away_score,
                TeamSide::Away => away_score - home_score,
            };
            let adjusted = Decimal::from(margin) + line;
            decide(adjusted)
        }
        GradedPick::Total { side, line } => {
            let total = Decimal::from(home_score + away_score);
            let edge = match side {
                TotalSide::Over => total - line,
                TotalSide::Under => line - total,
            };
            decide(edge)
        }
        GradedPick::Moneyline { side } => {
            let margin = match side {
                TeamSide::Home => home_score - away_score,
                TeamSide::Away => away_score - home_score,
            };
            decide(Decimal::from(margin))
        }
    }
}

fn decide(edge: Decimal) -> BetResult {
    if edge > Decimal::ZERO {
        BetResult::Win
    } else if edge < Decimal::ZERO {
        BetResult::Loss
    } else {
        BetResult::Push
    }
}

// ---------------------------------------------------------------------------
// Profit / loss
// ---------------------------------------------------------------------------

/// P/L for a settled bet at the given American odds, 100-unit stake.
/// Positive odds pay the quoted number; negative odds pay 100 units per
/// |odds| staked. A push returns the stake, so P/L is zero.
pub fn profit_loss(result: BetResult, odds: i32) -> Decimal {
    match result {
        BetResult::Win => {
            if odds > 0 {
                Decimal::from(odds)
            } else if odds < 0 {
                STAKE * Decimal::ONE_HUNDRED / Decimal::from(-odds)
            } else {
                Decimal::ZERO
            }
        }
        BetResult::Loss => -STAKE,
        BetResult::Push | BetResult::Pending => Decimal::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
