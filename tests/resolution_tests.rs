mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use fastbreak::db::{game_repo, outcome_repo};
use fastbreak::models::{FeatureMap, FeatureSnapshot};
use fastbreak::services::{OutcomeResolver, PredictionRecorder};

#[tokio::test]
async fn test_spread_prediction_settles_as_win() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else { return };

    let game = common::seed_game(&pool, "Boston Celtics", "Miami Heat").await;
    let rec = common::seed_recommendation(&pool, game.id, "Celtics -6", "spread", 120).await;

    let recorder = PredictionRecorder::new(pool.clone());
    let snapshot = FeatureSnapshot::new(FeatureMap::new());
    let outcome = recorder
        .record(&rec, "heuristic", &snapshot)
        .await
        .expect("Recording should succeed");

    assert_eq!(outcome.actual_result, "pending");
    assert!(outcome.resolved_at.is_none());

    // Celtics win by 8, covering the -6 line.
    game_repo::set_final_score(&pool, game.id, 110, 102)
        .await
        .expect("Game should go final");

    let resolver = OutcomeResolver::new(pool.clone());
    let summary = resolver
        .resolve_all_pending()
        .await
        .expect("Resolution should succeed");
    assert_eq!(summary.resolved, 1);

    let settled = outcome_repo::get_outcome(&pool, outcome.id)
        .await
        .expect("DB query should succeed")
        .expect("Outcome should exist");

    assert_eq!(settled.actual_result, "win");
    assert_eq!(settled.profit_loss, dec!(120), "profit comes from the stored odds");
    assert_eq!(settled.actual_score_home, Some(110));
    assert_eq!(settled.actual_score_away, Some(102));
    assert!(settled.resolved_at.is_some());

    // Settled rows leave the pending queue.
    let pending = outcome_repo::get_pending_outcomes(&pool)
        .await
        .expect("DB query should succeed");
    assert!(pending.iter().all(|o| o.id != outcome.id));
}

#[tokio::test]
async fn test_second_resolution_pass_settles_nothing() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else { return };

    let game = common::seed_game(&pool, "Boston Celtics", "Miami Heat").await;
    let rec = common::seed_recommendation(&pool, game.id, "Over 220.5", "total", -110).await;

    let recorder = PredictionRecorder::new(pool.clone());
    let snapshot = FeatureSnapshot::new(FeatureMap::new());
    let outcome = recorder
        .record(&rec, "heuristic", &snapshot)
        .await
        .expect("Recording should succeed");

    game_repo::set_final_score(&pool, game.id, 115, 110)
        .await
        .expect("Game should go final");

    let resolver = OutcomeResolver::new(pool.clone());
    let first = resolver
        .resolve_all_pending()
        .await
        .expect("First pass should succeed");
    assert_eq!(first.resolved, 1);

    let settled = outcome_repo::get_outcome(&pool, outcome.id)
        .await
        .expect("DB query should succeed")
        .expect("Outcome should exist");
    assert_eq!(settled.actual_result, "win"); // 225 over 220.5

    // Second pass sees no pending rows and changes nothing.
    let second = resolver
        .resolve_all_pending()
        .await
        .expect("Second pass should succeed");
    assert_eq!(second.resolved, 0);

    let unchanged = outcome_repo::get_outcome(&pool, outcome.id)
        .await
        .expect("DB query should succeed")
        .expect("Outcome should exist");
    assert_eq!(unchanged.actual_result, "win");
    assert_eq!(unchanged.resolved_at, settled.resolved_at);
    assert_eq!(unchanged.profit_loss, settled.profit_loss);
}

#[tokio::test]
async fn test_unfinished_game_is_left_pending() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else { return };

    let game = common::seed_game(&pool, "Boston Celtics", "Miami Heat").await;
    let rec = common::seed_recommendation(&pool, game.id, "Heat +5.5", "spread", -110).await;

    let recorder = PredictionRecorder::new(pool.clone());
    let snapshot = FeatureSnapshot::new(FeatureMap::new());
    let outcome = recorder
        .record(&rec, "heuristic", &snapshot)
        .await
        .expect("Recording should succeed");

    let resolver = OutcomeResolver::new(pool.clone());

    // Direct resolve of a scheduled game is a no-op returning false.
    let settled = resolver
        .resolve(&outcome, &game)
        .await
        .expect("Resolve should not error");
    assert!(!settled);

    let summary = resolver
        .resolve_all_pending()
        .await
        .expect("Resolution should succeed");
    assert_eq!(summary.resolved, 0);
    assert_eq!(summary.skipped_not_final, 1);

    let row = outcome_repo::get_outcome(&pool, outcome.id)
        .await
        .expect("DB query should succeed")
        .expect("Outcome should exist");
    assert_eq!(row.actual_result, "pending");
    assert!(row.resolved_at.is_none());
}

#[tokio::test]
async fn test_unparseable_pick_stays_pending() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else { return };

    let game = common::seed_game(&pool, "Boston Celtics", "Miami Heat").await;
    // No line anywhere in the text; the resolver must not guess one.
    let rec =
        common::seed_recommendation(&pool, game.id, "hammer the favorite", "spread", -110).await;

    let recorder = PredictionRecorder::new(pool.clone());
    let snapshot = FeatureSnapshot::new(FeatureMap::new());
    let outcome = recorder
        .record(&rec, "heuristic", &snapshot)
        .await
        .expect("Recording should succeed");

    game_repo::set_final_score(&pool, game.id, 110, 102)
        .await
        .expect("Game should go final");

    let resolver = OutcomeResolver::new(pool.clone());
    let summary = resolver
        .resolve_all_pending()
        .await
        .expect("Resolution should succeed");
    assert_eq!(summary.resolved, 0);
    assert_eq!(summary.parse_failures, 1);
    assert_eq!(summary.stuck(), 1);

    let row = outcome_repo::get_outcome(&pool, outcome.id)
        .await
        .expect("DB query should succeed")
        .expect("Outcome should exist");
    assert_eq!(row.actual_result, "pending");
    assert_eq!(row.profit_loss, Decimal::ZERO);
    assert!(row.resolved_at.is_none());
}

#[tokio::test]
async fn test_prop_bet_is_not_auto_settled() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else { return };

    let game = common::seed_game(&pool, "Boston Celtics", "Miami Heat").await;
    let rec =
        common::seed_recommendation(&pool, game.id, "Tatum over 29.5 points", "prop", -115).await;

    let recorder = PredictionRecorder::new(pool.clone());
    let snapshot = FeatureSnapshot::new(FeatureMap::new());
    let outcome = recorder
        .record(&rec, "heuristic", &snapshot)
        .await
        .expect("Recording should succeed");

    game_repo::set_final_score(&pool, game.id, 110, 102)
        .await
        .expect("Game should go final");

    let resolver = OutcomeResolver::new(pool.clone());
    let summary = resolver
        .resolve_all_pending()
        .await
        .expect("Resolution should succeed");
    assert_eq!(summary.resolved, 0);
    assert_eq!(summary.unsupported, 1);

    let row = outcome_repo::get_outcome(&pool, outcome.id)
        .await
        .expect("DB query should succeed")
        .expect("Outcome should exist");
    assert_eq!(row.actual_result, "pending");
}

#[tokio::test]
async fn test_moneyline_underdog_win_pays_positive_odds() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else { return };

    let game = common::seed_game(&pool, "Boston Celtics", "Miami Heat").await;
    let rec = common::seed_recommendation(&pool, game.id, "Heat ML", "moneyline", 150).await;

    let recorder = PredictionRecorder::new(pool.clone());
    let snapshot = FeatureSnapshot::new(FeatureMap::new());
    let outcome = recorder
        .record(&rec, "heuristic", &snapshot)
        .await
        .expect("Recording should succeed");

    // The away underdog wins outright.
    game_repo::set_final_score(&pool, game.id, 99, 101)
        .await
        .expect("Game should go final");

    let resolver = OutcomeResolver::new(pool.clone());
    let summary = resolver
        .resolve_all_pending()
        .await
        .expect("Resolution should succeed");
    assert_eq!(summary.resolved, 1);

    let settled = outcome_repo::get_outcome(&pool, outcome.id)
        .await
        .expect("DB query should succeed")
        .expect("Outcome should exist");
    assert_eq!(settled.actual_result, "win");
    assert_eq!(settled.profit_loss, dec!(150));
}

#[tokio::test]
async fn test_spread_landing_on_the_number_pushes() {
    let _guard = common::db_lock().await;
    let Some(pool) = common::setup_test_db().await else { return };

    let game = common::seed_game(&pool, "Boston Celtics", "Miami Heat").await;
    let rec = common::seed_recommendation(&pool, game.id, "Celtics -6", "spread", -110).await;

    let recorder = PredictionRecorder::new(pool.clone());
    let snapshot = FeatureSnapshot::new(FeatureMap::new());
    let outcome = recorder
        .record(&rec, "heuristic", &snapshot)
        .await
        .expect("Recording should succeed");

    // Margin exactly equals the whole-number line.
    game_repo::set_final_score(&pool, game.id, 108, 102)
        .await
        .expect("Game should go final");

    let resolver = OutcomeResolver::new(pool.clone());
    let summary = resolver
        .resolve_all_pending()
        .await
        .expect("Resolution should succeed");
    assert_eq!(summary.resolved, 1);

    let settled = outcome_repo::get_outcome(&pool, outcome.id)
        .await
        .expect("DB query should succeed")
        .expect("Outcome should exist");
    assert_eq!(settled.actual_result, "push");
    assert_eq!(settled.profit_loss, Decimal::ZERO, "a push returns the stake");
    assert!(settled.resolved_at.is_some());
}
