//! Level gate: decides whether a finished level advances, wins or ends the game.

use crate::algorithms::optimal_value;

use super::config::GameConfig;
use super::entities::Collectible;
use super::error::GameOverReason;
use super::state::GameStats;

/// Result of evaluating the level gate
#[derive(Debug, Clone, PartialEq)]
pub enum LevelOutcome {
    /// Move on to the next level, paying out `bonus`
    Advance { bonus: u32, efficiency: f64 },
    /// The final level was cleared
    Win { bonus: u32, efficiency: f64 },
    /// The gate was missed
    Fail(GameOverReason),
}

/// Score relative to the best value the outstanding collectibles could have
/// yielded under the level's threshold. An optimum of zero counts as 1.0.
pub fn efficiency(score: u32, outstanding: &[Collectible], threshold: u32) -> f64 {
    let optimum = optimal_value(outstanding, threshold);
    if optimum == 0 {
        return 1.0;
    }
    f64::from(score) / f64::from(optimum)
}

/// Evaluate the gate for the level described by `stats`.
///
/// The knapsack runs over the collectibles still on the board, bounded by the
/// threshold of the level being finished.
pub fn evaluate_level(config: &GameConfig, stats: &GameStats, outstanding: &[Collectible]) -> LevelOutcome {
    let threshold = config.capacity_threshold(stats.level);
    let efficiency = efficiency(stats.score, outstanding, threshold);

    if efficiency < config.efficiency_threshold {
        return LevelOutcome::Fail(GameOverReason::EfficiencyBelowThreshold {
            percent: efficiency * 100.0,
            required: config.efficiency_threshold * 100.0,
        });
    }

    let bonus = stats.total_value * config.level_bonus_pct / 100;
    if stats.level >= config.win_level {
        LevelOutcome::Win { bonus, efficiency }
    } else {
        LevelOutcome::Advance { bonus, efficiency }
    }
}
