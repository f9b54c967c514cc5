use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Utc};
use metrics::{counter, histogram};
use sqlx::PgPool;
use tokio::time::{sleep, Duration as TokioDuration};

use crate::db::outcome_repo;
use crate::errors::EngineError;
use crate::intelligence::performance::{self, ModelPerformance};
use crate::intelligence::{derive_insights, policy, RetrainThresholds};
use crate::models::{
    CycleReport, FeatureSnapshot, Game, PredictionOutcome, Recommendation, RetrainAction,
};

use super::{
    ModelLifecycleManager, OutcomeResolver, PredictionRecorder, ResolutionSummary,
    SnapshotCapturer,
};

/// Windows and thresholds for the improvement cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleSettings {
    pub thresholds: RetrainThresholds,
    /// Lookback for report metrics and insight baselines.
    pub report_window_days: i64,
    /// Lookback the retrain policy and decline detection run on.
    pub policy_window_days: i64,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            thresholds: RetrainThresholds::default(),
            report_window_days: 30,
            policy_window_days: 7,
        }
    }
}

/// The feedback-control core, wired once at startup: record predictions,
/// settle them, measure the models, retrain the laggards.
pub struct ImprovementEngine {
    pool: PgPool,
    capturer: SnapshotCapturer,
    recorder: PredictionRecorder,
    resolver: OutcomeResolver,
    lifecycle: ModelLifecycleManager,
    settings: CycleSettings,
}

impl ImprovementEngine {
    pub fn new(
        pool: PgPool,
        capturer: SnapshotCapturer,
        lifecycle: ModelLifecycleManager,
        settings: CycleSettings,
    ) -> Self {
        let recorder = PredictionRecorder::new(pool.clone());
        let resolver = OutcomeResolver::new(pool.clone());
        Self {
            pool,
            capturer,
            recorder,
            resolver,
            lifecycle,
            settings,
        }
    }

    // -- operations exposed to the rest of the platform ----------------------

    /// Snapshot the inputs for a game right now. Never fails; provider
    /// trouble degrades the snapshot instead.
    pub async fn capture_snapshot(&self, game: &Game) -> FeatureSnapshot {
        self.capturer.capture(game).await
    }

    /// Record a recommendation as a pending outcome.
    pub async fn record_prediction(
        &self,
        rec: &Recommendation,
        model_used: &str,
        snapshot: &FeatureSnapshot,
    ) -> Result<PredictionOutcome, EngineError> {
        self.recorder.record(rec, model_used, snapshot).await
    }

    /// Settle everything settleable.
    pub async fn resolve_all_pending(&self) -> Result<ResolutionSummary, EngineError> {
        self.resolver.resolve_all_pending().await
    }

    /// One model's settled performance over the trailing window.
    pub async fn model_performance(
        &self,
        model_name: &str,
        days_back: i64,
    ) -> Result<ModelPerformance, EngineError> {
        let since = Utc::now() - Duration::days(days_back);
        let rows = outcome_repo::get_settled_for_model_since(&self.pool, model_name, since).await?;
        Ok(performance::summarize(&rows))
    }

    /// Settled performance per model over the trailing window.
    pub async fn all_models_performance(
        &self,
        days_back: i64,
    ) -> Result<BTreeMap<String, ModelPerformance>, EngineError> {
        let since = Utc::now() - Duration::days(days_back);
        let rows = outcome_repo::get_settled_since(&self.pool, since).await?;
        Ok(performance::summarize_by_model(&rows))
    }

    /// Force a retrain outside the cycle (manual trigger).
    pub async fn retrain_model(&self, model_name: &str) -> Result<bool, EngineError> {
        self.lifecycle.retrain(model_name).await
    }

    // -- the cycle ------------------------------------------------------------

    /// One full improvement cycle: settle, measure, retrain what the policy
    /// flags, derive insights. A single model's retrain failure is recorded
    /// in the report and does not abort the rest.
    pub async fn run_daily_cycle(&self) -> Result<CycleReport, EngineError> {
        let started_at = Utc::now();
        let timer = Instant::now();
        tracing::info!("Improvement cycle starting");

        // 1. Settlement first so the metrics below see today's results.
        let resolution = self.resolver.resolve_all_pending().await?;

        // 2. Metrics over the report window, split per model.
        let report_since = started_at - Duration::days(self.settings.report_window_days);
        let rows = outcome_repo::get_settled_since(&self.pool, report_since).await?;

        let mut by_model: BTreeMap<String, Vec<PredictionOutcome>> = BTreeMap::new();
        for row in rows {
            by_model.entry(row.model_used.clone()).or_default().push(row);
        }

        let policy_since = started_at - Duration::days(self.settings.policy_window_days);
        let mut baseline: BTreeMap<String, ModelPerformance> = BTreeMap::new();
        let mut recent: BTreeMap<String, ModelPerformance> = BTreeMap::new();
        for (model, outcomes) in &by_model {
            baseline.insert(model.clone(), performance::summarize(outcomes));
            recent.insert(
                model.clone(),
                performance::summarize_window(outcomes, policy_since),
            );
        }

        // 3 + 4. Policy runs on the recent window; retrain whatever it flags.
        let mut retrain_actions = Vec::new();
        for (model, perf) in &recent {
            if !policy::should_retrain(perf, &self.settings.thresholds) {
                continue;
            }
            tracing::info!(
                model = %model,
                win_rate = %perf.win_rate,
                total_bets = perf.total_bets,
                "Retrain flagged"
            );

            let action = match self.lifecycle.retrain(model).await {
                Ok(true) => RetrainAction {
                    model_name: model.clone(),
                    succeeded: true,
                    detail: "retrained and promoted".into(),
                },
                Ok(false) => RetrainAction {
                    model_name: model.clone(),
                    succeeded: false,
                    detail: "no training data".into(),
                },
                Err(e) => {
                    // One model's failure must not sink the others.
                    tracing::error!(model = %model, error = %e, "Retrain failed");
                    RetrainAction {
                        model_name: model.clone(),
                        succeeded: false,
                        detail: e.to_string(),
                    }
                }
            };
            retrain_actions.push(action);
        }

        // 5. Qualitative read on the same windows.
        let insights = derive_insights(&baseline, &recent);

        counter!("improvement_cycles_total").increment(1);
        histogram!("improvement_cycle_seconds").record(timer.elapsed().as_secs_f64());

        let report = CycleReport {
            started_at,
            finished_at: Utc::now(),
            resolved: resolution.resolved,
            stuck_pending: resolution.stuck(),
            model_metrics: baseline,
            retrain_actions,
            insights,
        };

        tracing::info!(
            resolved = report.resolved,
            stuck_pending = report.stuck_pending,
            models = report.model_metrics.len(),
            retrains = report.retrains_attempted(),
            insights = report.insights.len(),
            "Improvement cycle complete"
        );

        Ok(report)
    }
}

/// Host loop for the cycle: run, sleep a period, repeat. A failed cycle is
/// logged and retried after the (shorter) cooldown instead of the full
/// period.
pub async fn run_improvement_loop(
    engine: Arc<ImprovementEngine>,
    period_secs: u64,
    cooldown_secs: u64,
) {
    loop {
        match engine.run_daily_cycle().await {
            Ok(_) => {
                sleep(TokioDuration::from_secs(period_secs)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Improvement cycle failed; retrying after cooldown");
                sleep(TokioDuration::from_secs(cooldown_secs)).await;
            }
        }
    }
}
