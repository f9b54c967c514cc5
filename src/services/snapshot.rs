use std::sync::Arc;

use crate::models::{FeatureMap, FeatureSnapshot, Game};
use crate::providers::{OddsProvider, StatsProvider};

/// Builds the point-in-time feature snapshot a prediction is recorded with:
/// rolling averages for both teams, hustle/defense metrics, and the latest
/// betting line, merged into one flat map.
///
/// Capture never fails. A provider error zeroes that provider's metrics and
/// lands in the snapshot's `error` field, so recording proceeds with reduced
/// fidelity rather than blocking the pipeline.
pub struct SnapshotCapturer {
    stats: Arc<dyn StatsProvider>,
    odds: Arc<dyn OddsProvider>,
    window_games: u32,
    season: String,
}

impl SnapshotCapturer {
    pub fn new(
        stats: Arc<dyn StatsProvider>,
        odds: Arc<dyn OddsProvider>,
        window_games: u32,
        season: impl Into<String>,
    ) -> Self {
        Self {
            stats,
            odds,
            window_games,
            season: season.into(),
        }
    }

    pub async fn capture(&self, game: &Game) -> FeatureSnapshot {
        let mut features = FeatureMap::new();
        let mut errors: Vec<String> = Vec::new();

        self.capture_rolling(game, "home", &game.home_team, &mut features, &mut errors)
            .await;
        self.capture_rolling(game, "away", &game.away_team, &mut features, &mut errors)
            .await;
        self.capture_hustle("home", &game.home_team, &mut features, &mut errors)
            .await;
        self.capture_hustle("away", &game.away_team, &mut features, &mut errors)
            .await;
        self.capture_line(game, &mut features, &mut errors).await;

        let mut snapshot = FeatureSnapshot::new(features);
        if !errors.is_empty() {
            tracing::warn!(
                game_id = %game.id,
                errors = %errors.join("; "),
                "Snapshot captured degraded"
            );
            snapshot.error = Some(errors.join("; "));
        }
        snapshot
    }

    async fn capture_rolling(
        &self,
        game: &Game,
        prefix: &str,
        team: &str,
        features: &mut FeatureMap,
        errors: &mut Vec<String>,
    ) {
        match self
            .stats
            .rolling_team_stats(team, game.game_date, self.window_games)
            .await
        {
            Ok(stats) => {
                features.insert(format!("{prefix}_ppg"), stats.ppg);
                features.insert(format!("{prefix}_rpg"), stats.rpg);
                features.insert(format!("{prefix}_apg"), stats.apg);
            }
            Err(e) => {
                // Keep the keys present and zeroed so consumers see a
                // consistent shape.
                features.insert(format!("{prefix}_ppg"), 0.0);
                features.insert(format!("{prefix}_rpg"), 0.0);
                features.insert(format!("{prefix}_apg"), 0.0);
                errors.push(format!("stats({team}): {e}"));
            }
        }
    }

    async fn capture_hustle(
        &self,
        prefix: &str,
        team: &str,
        features: &mut FeatureMap,
        errors: &mut Vec<String>,
    ) {
        match self.stats.hustle_defense_stats(team, &self.season).await {
            Ok(stats) => {
                for (name, value) in stats {
                    features.insert(format!("{prefix}_hustle_{name}"), value);
                }
            }
            Err(e) => errors.push(format!("hustle({team}): {e}")),
        }
    }

    async fn capture_line(&self, game: &Game, features: &mut FeatureMap, errors: &mut Vec<String>) {
        match self.odds.latest_line(game).await {
            Ok(Some(line)) => {
                if let Some(spread) = line.spread_line {
                    features.insert("spread_line".into(), spread);
                }
                if let Some(total) = line.total_line {
                    features.insert("total_line".into(), total);
                }
                if let Some(ml) = line.home_moneyline {
                    features.insert("home_moneyline".into(), f64::from(ml));
                }
                if let Some(ml) = line.away_moneyline {
                    features.insert("away_moneyline".into(), f64::from(ml));
                }
            }
            // No line posted yet is normal for early captures, not an error.
            Ok(None) => {}
            Err(e) => errors.push(format!("odds: {e}")),
        }
    }
}
