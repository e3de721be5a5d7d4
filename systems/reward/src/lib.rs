#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that shapes a scalar reward from two consecutive snapshots.
//!
//! The reward is the unconditional sum of five independent terms: enemies
//! removed, wave completion, tower placement coverage, spending friction and
//! the game-over penalty. Population terms only fire on positive deltas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_gym_core::{GameInfo, GameState, RewardBreakdown, TowerState};
use tower_gym_system_coverage::PathCoverage;

/// Shaping constants applied by [`RewardShaper`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTuning {
    /// Credit per enemy that disappeared between snapshots.
    pub enemy_removed: f32,
    /// Multiplier applied to the new wave number when a wave advances.
    pub wave_multiplier: f32,
    /// Credit per path cell covered by a newly built tower.
    pub coverage_multiplier: f32,
    /// Added for each new tower that covers no path cell.
    pub uncovered_penalty: f32,
    /// Added once whenever money decreased.
    pub spending_penalty: f32,
    /// Added whenever the new snapshot reports game over.
    pub game_over_penalty: f32,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            enemy_removed: 1.0,
            wave_multiplier: 2.0,
            coverage_multiplier: 2.0,
            uncovered_penalty: -30.0,
            spending_penalty: -4.0,
            game_over_penalty: -100.0,
        }
    }
}

/// Failures that prevent shaping a transition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RewardError {
    /// A newly built tower has a type missing from the tower catalogue.
    #[error("tower type `{0}` is not in the tower catalogue")]
    UnknownTowerType(String),
}

/// Reward function bound to the static path and tower ranges.
#[derive(Clone, Debug)]
pub struct RewardShaper {
    coverage: PathCoverage,
    ranges: BTreeMap<String, f64>,
    tuning: RewardTuning,
}

impl RewardShaper {
    /// Creates a shaper for the provided static configuration.
    #[must_use]
    pub fn new(info: &GameInfo, tuning: RewardTuning) -> Self {
        Self {
            coverage: PathCoverage::new(&info.map.path_cells),
            ranges: info
                .towers
                .iter()
                .map(|tower| (tower.kind.clone(), tower.range))
                .collect(),
            tuning,
        }
    }

    /// Shaping constants in use.
    #[must_use]
    pub const fn tuning(&self) -> &RewardTuning {
        &self.tuning
    }

    /// Computes every reward term of the `previous -> next` transition.
    pub fn shape(
        &self,
        previous: &GameState,
        next: &GameState,
    ) -> Result<RewardBreakdown, RewardError> {
        let removed = previous.enemies.len().saturating_sub(next.enemies.len());

        let wave_completion = if next.wave_number > previous.wave_number {
            self.tuning.wave_multiplier * next.wave_number as f32
        } else {
            0.0
        };

        let built = next.towers.get(previous.towers.len()..).unwrap_or_default();
        let mut tower_placement = 0.0;
        for tower in built {
            tower_placement += self.placement_term(tower)?;
        }

        let spending = if next.money < previous.money {
            self.tuning.spending_penalty
        } else {
            0.0
        };

        let terminal = if next.game_over {
            self.tuning.game_over_penalty
        } else {
            0.0
        };

        Ok(RewardBreakdown {
            enemies_removed: self.tuning.enemy_removed * removed as f32,
            wave_completion,
            tower_placement,
            spending,
            terminal,
        })
    }

    /// Scalar reward of the `previous -> next` transition.
    pub fn reward(&self, previous: &GameState, next: &GameState) -> Result<f32, RewardError> {
        self.shape(previous, next).map(|terms| terms.total())
    }

    fn placement_term(&self, tower: &TowerState) -> Result<f32, RewardError> {
        let range = self
            .ranges
            .get(&tower.kind)
            .copied()
            .ok_or_else(|| RewardError::UnknownTowerType(tower.kind.clone()))?;

        let covered = self.coverage.cells_in_range(tower.position, range);
        Ok(if covered == 0 {
            self.tuning.uncovered_penalty
        } else {
            self.tuning.coverage_multiplier * covered as f32
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RewardTuning;

    #[test]
    fn default_tuning_matches_documented_constants() {
        let tuning = RewardTuning::default();
        assert_eq!(tuning.enemy_removed, 1.0);
        assert_eq!(tuning.wave_multiplier, 2.0);
        assert_eq!(tuning.coverage_multiplier, 2.0);
        assert_eq!(tuning.uncovered_penalty, -30.0);
        assert_eq!(tuning.spending_penalty, -4.0);
        assert_eq!(tuning.game_over_penalty, -100.0);
    }

    #[test]
    fn partial_tuning_fills_defaults() {
        let tuning: RewardTuning =
            serde_json::from_str(r#"{ "game_over_penalty": -10.0 }"#).expect("parses");
        assert_eq!(tuning.game_over_penalty, -10.0);
        assert_eq!(tuning.spending_penalty, -4.0);
    }
}
