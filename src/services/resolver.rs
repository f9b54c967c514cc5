use metrics::{counter, gauge};
use serde::Serialize;
use sqlx::PgPool;

use crate::db::{game_repo, outcome_repo};
use crate::errors::EngineError;
use crate::intelligence::settlement::{self, PickParseError};
use crate::models::{Game, PredictionOutcome};

/// What one resolution pass did with the pending backlog.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ResolutionSummary {
    /// Rows settled by this pass.
    pub resolved: u64,
    /// Rows whose game is not Final yet (or has no score), left pending.
    pub skipped_not_final: u64,
    /// Rows whose pick could not be parsed, left pending.
    pub parse_failures: u64,
    /// Rows with a bet type this service does not settle (props).
    pub unsupported: u64,
}

impl ResolutionSummary {
    /// Pending rows that will never settle without upstream fixes.
    pub fn stuck(&self) -> u64 {
        self.parse_failures + self.unsupported
    }
}

enum ResolveOutcome {
    Settled,
    AlreadySettled,
    NotFinal,
    ParseFailed(PickParseError),
}

/// Settles pending outcomes against Final games.
pub struct OutcomeResolver {
    pool: PgPool,
}

impl OutcomeResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Settle every pending outcome whose game has gone Final.
    ///
    /// Idempotent: only `actual_result = 'pending'` rows are read, and the
    /// settle update re-checks that guard, so a second pass (or a concurrent
    /// one) resolves nothing twice.
    pub async fn resolve_all_pending(&self) -> Result<ResolutionSummary, EngineError> {
        let pending = outcome_repo::get_pending_outcomes(&self.pool).await?;
        let mut summary = ResolutionSummary::default();

        for outcome in &pending {
            let game = match game_repo::get_game(&self.pool, outcome.game_id).await? {
                Some(game) => game,
                None => {
                    tracing::warn!(
                        outcome_id = %outcome.id,
                        game_id = %outcome.game_id,
                        "Pending outcome references a missing game"
                    );
                    summary.skipped_not_final += 1;
                    continue;
                }
            };

            match self.resolve_inner(outcome, &game).await? {
                ResolveOutcome::Settled => summary.resolved += 1,
                ResolveOutcome::AlreadySettled => {}
                ResolveOutcome::NotFinal => summary.skipped_not_final += 1,
                ResolveOutcome::ParseFailed(PickParseError::Unsupported(_)) => {
                    summary.unsupported += 1
                }
                ResolveOutcome::ParseFailed(_) => summary.parse_failures += 1,
            }
        }

        let still_pending = outcome_repo::count_pending(&self.pool).await?;
        gauge!("pending_outcomes").set(still_pending as f64);

        tracing::info!(
            resolved = summary.resolved,
            skipped_not_final = summary.skipped_not_final,
            parse_failures = summary.parse_failures,
            unsupported = summary.unsupported,
            "Resolution pass complete"
        );

        Ok(summary)
    }

    /// Settle a single outcome. Returns true only when this call moved the
    /// row out of pending.
    pub async fn resolve(
        &self,
        outcome: &PredictionOutcome,
        game: &Game,
    ) -> Result<bool, EngineError> {
        Ok(matches!(
            self.resolve_inner(outcome, game).await?,
            ResolveOutcome::Settled
        ))
    }

    async fn resolve_inner(
        &self,
        outcome: &PredictionOutcome,
        game: &Game,
    ) -> Result<ResolveOutcome, EngineError> {
        if !game.is_final() {
            return Ok(ResolveOutcome::NotFinal);
        }
        let Some((home_score, away_score)) = game.final_scores() else {
            tracing::warn!(game_id = %game.id, "Final game has no score yet");
            return Ok(ResolveOutcome::NotFinal);
        };

        let pick = match settlement::pick_for_outcome(outcome, game) {
            Ok(pick) => pick,
            Err(e) => {
                // Never guess a settlement. The row stays pending and shows
                // up in the stuck counts.
                counter!("outcome_parse_failures_total").increment(1);
                tracing::warn!(
                    outcome_id = %outcome.id,
                    pick = %outcome.predicted_pick,
                    bet_type = %outcome.bet_type,
                    error = %e,
                    "Could not derive settlement from pick"
                );
                return Ok(ResolveOutcome::ParseFailed(e));
            }
        };

        let result = settlement::grade(&pick, home_score, away_score);
        let profit = settlement::profit_loss(result, outcome.odds_at_bet);

        let updated = outcome_repo::settle_outcome(
            &self.pool,
            outcome.id,
            result.as_str(),
            home_score,
            away_score,
            profit,
        )
        .await?;

        if !updated {
            tracing::debug!(outcome_id = %outcome.id, "Outcome already settled elsewhere");
            return Ok(ResolveOutcome::AlreadySettled);
        }

        counter!("outcomes_resolved_total").increment(1);
        tracing::info!(
            outcome_id = %outcome.id,
            result = %result,
            profit = %profit,
            home_score = home_score,
            away_score = away_score,
            "Outcome settled"
        );

        Ok(ResolveOutcome::Settled)
    }
}
