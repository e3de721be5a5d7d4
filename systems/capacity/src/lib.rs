#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that derives fixed entity capacity bounds from static game configuration.
//!
//! The bounds size the observation slots once per adapter lifetime. They are
//! analytic worst cases rather than simulations: the server's actual live
//! counts must never exceed them, otherwise encoding fails loudly.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_gym_core::{CapacityBounds, GameInfo, MapInfo, WaveInfo};

/// Formula used to bound the number of concurrently alive enemies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityModel {
    /// Overlapping-waves estimate `floor(slow_time * per_wave / T)`.
    #[default]
    Overlap,
    /// Window bound `per_wave * (floor((slow_time + (per_wave - 1) * spawn_delay) / T) + 1)`,
    /// which also counts the partially spawned waves at both window edges.
    Conservative,
}

/// Reasons the static configuration cannot be turned into capacity bounds.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CapacityError {
    /// Cell size must be strictly positive to count grid cells.
    #[error("map cell size must be positive, got {0}")]
    NonPositiveCellSize(f64),
    /// The slowest enemy must move for an enemy lifetime to be finite.
    #[error("slowest enemy speed must be positive, got {0}")]
    NonPositiveEnemySpeed(f64),
    /// Waves with no delay and no spawn spacing overlap without bound.
    #[error("wave delay plus spawn spacing must be positive, got {0}")]
    DegenerateWaveCadence(f64),
}

/// Computes both capacity bounds for the provided configuration.
pub fn estimate(info: &GameInfo, model: CapacityModel) -> Result<CapacityBounds, CapacityError> {
    let towers = max_towers(info)?;
    let enemies = max_enemies(&info.map, &info.waves, model)?;
    Ok(CapacityBounds::new(towers, enemies))
}

/// Number of grid cells left once the path's cells are removed.
pub fn max_towers(info: &GameInfo) -> Result<usize, CapacityError> {
    let cell_size = info.map.cell_size;
    if !(cell_size > 0.0) {
        return Err(CapacityError::NonPositiveCellSize(cell_size));
    }

    let grid_cells = (info.grid_columns() * info.grid_rows()) as f64;
    let path_cells = info.map.path_length / cell_size;
    Ok(saturating_floor(grid_cells - path_cells))
}

/// Worst-case number of enemies alive at the same time.
pub fn max_enemies(
    map: &MapInfo,
    waves: &WaveInfo,
    model: CapacityModel,
) -> Result<usize, CapacityError> {
    let per_wave = waves.max_enemies as usize;
    if per_wave == 0 {
        return Ok(0);
    }

    let speed = waves.slowest_enemy.current_speed;
    if !(speed > 0.0) {
        return Err(CapacityError::NonPositiveEnemySpeed(speed));
    }

    let slow_time = map.path_length / speed;
    let wave_delay = waves.wave_delay;
    if slow_time < wave_delay {
        return Ok(per_wave);
    }

    let spawn_delay = waves.spawn_delay;
    let cadence = wave_delay + per_wave as f64 * spawn_delay;
    if !(cadence > 0.0) {
        return Err(CapacityError::DegenerateWaveCadence(cadence));
    }

    let bound = match model {
        CapacityModel::Overlap => saturating_floor(slow_time * per_wave as f64 / cadence),
        CapacityModel::Conservative => {
            let spread = (per_wave - 1) as f64 * spawn_delay;
            let waves_touched = saturating_floor((slow_time + spread) / cadence) + 1;
            waves_touched.saturating_mul(per_wave)
        }
    };
    Ok(bound)
}

fn saturating_floor(value: f64) -> usize {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.floor() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::{saturating_floor, CapacityError, CapacityModel};
    use tower_gym_core::{EnemySample, MapInfo, WaveInfo};

    fn map(path_length: f64) -> MapInfo {
        MapInfo {
            cell_size: 50.0,
            width: 900.0,
            height: 600.0,
            path_cells: Vec::new(),
            path_length,
        }
    }

    fn waves(wave_delay: f64, max_enemies: u32, spawn_delay: f64, speed: f64) -> WaveInfo {
        WaveInfo {
            wave_delay,
            max_enemies,
            spawn_delay,
            slowest_enemy: EnemySample {
                current_speed: speed,
            },
            enemy_types: vec!["grunt".to_owned()],
        }
    }

    #[test]
    fn short_paths_are_bounded_by_one_wave() {
        let bound = super::max_enemies(
            &map(100.0),
            &waves(10_000.0, 12, 500.0, 0.125),
            CapacityModel::Overlap,
        );
        assert_eq!(bound, Ok(12));
    }

    #[test]
    fn long_paths_multiply_overlapping_waves() {
        // slow_time = 12_000, T = 4_000 + 10 * 400 = 8_000
        let bound = super::max_enemies(
            &map(1_500.0),
            &waves(4_000.0, 10, 400.0, 0.125),
            CapacityModel::Overlap,
        );
        assert_eq!(bound, Ok(15));
    }

    #[test]
    fn conservative_model_counts_edge_waves() {
        // (12_000 + 9 * 400) / 8_000 = 1.95 -> one full period, plus the edge wave.
        let bound = super::max_enemies(
            &map(1_500.0),
            &waves(4_000.0, 10, 400.0, 0.125),
            CapacityModel::Conservative,
        );
        assert_eq!(bound, Ok(20));
    }

    #[test]
    fn stationary_enemies_are_rejected() {
        let bound = super::max_enemies(
            &map(1_500.0),
            &waves(10_000.0, 10, 1_000.0, 0.0),
            CapacityModel::Overlap,
        );
        assert_eq!(bound, Err(CapacityError::NonPositiveEnemySpeed(0.0)));
    }

    #[test]
    fn zero_cadence_is_rejected() {
        let bound = super::max_enemies(
            &map(1_500.0),
            &waves(0.0, 10, 0.0, 0.125),
            CapacityModel::Overlap,
        );
        assert_eq!(bound, Err(CapacityError::DegenerateWaveCadence(0.0)));
    }

    #[test]
    fn empty_waves_need_no_slots() {
        let bound = super::max_enemies(
            &map(1_500.0),
            &waves(0.0, 0, 0.0, 0.0),
            CapacityModel::Conservative,
        );
        assert_eq!(bound, Ok(0));
    }

    #[test]
    fn negative_values_floor_to_zero() {
        assert_eq!(saturating_floor(-3.5), 0);
        assert_eq!(saturating_floor(f64::NAN), 0);
        assert_eq!(saturating_floor(7.9), 7);
    }
}
