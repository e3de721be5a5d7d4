#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that encodes game snapshots into fixed-length normalized vectors.
//!
//! The vector is partitioned into consecutive blocks:
//!
//! 1. four global scalars (time, wave, money, game over);
//! 2. an optional static block of path cell coordinates;
//! 3. `max_towers` tower slots of `4 + tower types` features
//!    (active, x, y, cooldown, one-hot type);
//! 4. `max_enemies` enemy slots of `5 + enemy types` features
//!    (active, x, y, health, path progress, one-hot type).
//!
//! Entities occupy slots by list position. Unused slots stay zeroed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_gym_core::{
    CapacityBounds, EnemyState, GameInfo, GameState, ObservationSpace, TowerState,
};

/// Number of global scalar features at the start of every observation.
pub const GLOBAL_FEATURES: usize = 4;
/// Per-tower features preceding the one-hot type block.
pub const TOWER_BASE_FEATURES: usize = 4;
/// Per-enemy features preceding the one-hot type block.
pub const ENEMY_BASE_FEATURES: usize = 5;

/// Options controlling which optional blocks are encoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Appends normalized path cell coordinates after the global scalars.
    pub include_path_cells: bool,
}

/// Failures that make a snapshot impossible to encode faithfully.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// More towers are alive than the capacity bound reserved slots for.
    #[error("{live} live towers exceed the capacity bound of {bound}")]
    TowerCapacityExceeded {
        /// Towers reported by the server.
        live: usize,
        /// Slots reserved for towers.
        bound: usize,
    },
    /// More enemies are alive than the capacity bound reserved slots for.
    #[error("{live} live enemies exceed the capacity bound of {bound}")]
    EnemyCapacityExceeded {
        /// Enemies reported by the server.
        live: usize,
        /// Slots reserved for enemies.
        bound: usize,
    },
    /// A tower type is missing from the tower catalogue.
    #[error("tower type `{0}` is not in the tower catalogue")]
    UnknownTowerType(String),
    /// An enemy type is missing from the enemy type catalogue.
    #[error("enemy type `{0}` is not in the enemy type catalogue")]
    UnknownEnemyType(String),
}

/// Offsets and sizes of every block in the observation vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObservationLayout {
    path_features: usize,
    tower_slot_width: usize,
    tower_slots: usize,
    enemy_slot_width: usize,
    enemy_slots: usize,
}

impl ObservationLayout {
    /// Derives the layout from the static configuration and capacity bounds.
    #[must_use]
    pub fn new(info: &GameInfo, bounds: CapacityBounds, config: EncoderConfig) -> Self {
        let path_features = if config.include_path_cells {
            info.map.path_cells.len() * 2
        } else {
            0
        };

        Self {
            path_features,
            tower_slot_width: TOWER_BASE_FEATURES + info.towers.len(),
            tower_slots: bounds.max_towers(),
            enemy_slot_width: ENEMY_BASE_FEATURES + info.waves.enemy_types.len(),
            enemy_slots: bounds.max_enemies(),
        }
    }

    /// Offset of the path cell block.
    #[must_use]
    pub const fn path_offset(&self) -> usize {
        GLOBAL_FEATURES
    }

    /// Number of features in the path cell block.
    #[must_use]
    pub const fn path_features(&self) -> usize {
        self.path_features
    }

    /// Offset of the first tower slot.
    #[must_use]
    pub const fn towers_offset(&self) -> usize {
        GLOBAL_FEATURES + self.path_features
    }

    /// Features per tower slot.
    #[must_use]
    pub const fn tower_slot_width(&self) -> usize {
        self.tower_slot_width
    }

    /// Number of tower slots.
    #[must_use]
    pub const fn tower_slots(&self) -> usize {
        self.tower_slots
    }

    /// Offset of the first enemy slot.
    #[must_use]
    pub const fn enemies_offset(&self) -> usize {
        self.towers_offset() + self.tower_slots * self.tower_slot_width
    }

    /// Features per enemy slot.
    #[must_use]
    pub const fn enemy_slot_width(&self) -> usize {
        self.enemy_slot_width
    }

    /// Number of enemy slots.
    #[must_use]
    pub const fn enemy_slots(&self) -> usize {
        self.enemy_slots
    }

    /// Total length of the observation vector.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.enemies_offset() + self.enemy_slots * self.enemy_slot_width
    }

    /// Reports whether the layout holds no features; never true in practice.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the tower slot at `slot`.
    #[must_use]
    pub const fn tower_slot(&self, slot: usize) -> usize {
        self.towers_offset() + slot * self.tower_slot_width
    }

    /// Offset of the enemy slot at `slot`.
    #[must_use]
    pub const fn enemy_slot(&self, slot: usize) -> usize {
        self.enemies_offset() + slot * self.enemy_slot_width
    }
}

/// Encoder holding everything derived from the immutable configuration.
#[derive(Clone, Debug)]
pub struct ObservationEncoder {
    layout: ObservationLayout,
    path_block: Vec<f32>,
    tower_types: BTreeMap<String, usize>,
    enemy_types: BTreeMap<String, usize>,
    width: f64,
    height: f64,
    max_time: f64,
    max_wave: f64,
    max_money: f64,
    reference_cooldown: f64,
}

impl ObservationEncoder {
    /// Creates an encoder, precomputing the static path block.
    #[must_use]
    pub fn new(info: &GameInfo, bounds: CapacityBounds, config: EncoderConfig) -> Self {
        let layout = ObservationLayout::new(info, bounds, config);
        let width = info.map.width;
        let height = info.map.height;

        let path_block = if config.include_path_cells {
            info.map
                .path_cells
                .iter()
                .flat_map(|cell| [normalize(cell.x, width), normalize(cell.y, height)])
                .collect()
        } else {
            Vec::new()
        };

        Self {
            layout,
            path_block,
            tower_types: catalogue_index(info.towers.iter().map(|tower| tower.kind.as_str())),
            enemy_types: catalogue_index(info.waves.enemy_types.iter().map(String::as_str)),
            width,
            height,
            max_time: info.limits.game_time,
            max_wave: f64::from(info.limits.wave_number),
            max_money: info.limits.money,
            reference_cooldown: info.reference_tower.attack_cooldown,
        }
    }

    /// Block layout of the produced vectors.
    #[must_use]
    pub const fn layout(&self) -> &ObservationLayout {
        &self.layout
    }

    /// Observation space matching the produced vectors.
    #[must_use]
    pub const fn space(&self) -> ObservationSpace {
        ObservationSpace::new(self.layout.len())
    }

    /// Encodes the snapshot into a freshly allocated vector.
    pub fn encode(&self, state: &GameState) -> Result<Vec<f32>, EncodeError> {
        let mut out = Vec::with_capacity(self.layout.len());
        self.encode_into(state, &mut out)?;
        Ok(out)
    }

    /// Encodes the snapshot into `out`, replacing its previous contents.
    ///
    /// Capacity violations are detected before anything is written, so `out`
    /// is left untouched on error.
    pub fn encode_into(&self, state: &GameState, out: &mut Vec<f32>) -> Result<(), EncodeError> {
        if state.towers.len() > self.layout.tower_slots() {
            return Err(EncodeError::TowerCapacityExceeded {
                live: state.towers.len(),
                bound: self.layout.tower_slots(),
            });
        }
        if state.enemies.len() > self.layout.enemy_slots() {
            return Err(EncodeError::EnemyCapacityExceeded {
                live: state.enemies.len(),
                bound: self.layout.enemy_slots(),
            });
        }

        out.clear();
        out.resize(self.layout.len(), 0.0);

        out[0] = normalize(state.game_time, self.max_time);
        out[1] = normalize(f64::from(state.wave_number), self.max_wave);
        out[2] = normalize(state.money, self.max_money);
        out[3] = if state.game_over { 1.0 } else { 0.0 };

        let path_offset = self.layout.path_offset();
        out[path_offset..path_offset + self.path_block.len()].copy_from_slice(&self.path_block);

        for (slot, tower) in state.towers.iter().enumerate() {
            let offset = self.layout.tower_slot(slot);
            let width = self.layout.tower_slot_width();
            self.write_tower(tower, &mut out[offset..offset + width])?;
        }

        for (slot, enemy) in state.enemies.iter().enumerate() {
            let offset = self.layout.enemy_slot(slot);
            let width = self.layout.enemy_slot_width();
            self.write_enemy(enemy, &mut out[offset..offset + width])?;
        }

        Ok(())
    }

    fn write_tower(&self, tower: &TowerState, slot: &mut [f32]) -> Result<(), EncodeError> {
        let type_index = *self
            .tower_types
            .get(&tower.kind)
            .ok_or_else(|| EncodeError::UnknownTowerType(tower.kind.clone()))?;

        slot[0] = 1.0;
        slot[1] = normalize(tower.position.x, self.width);
        slot[2] = normalize(tower.position.y, self.height);
        slot[3] = normalize(tower.attack_cooldown, self.reference_cooldown);
        slot[TOWER_BASE_FEATURES + type_index] = 1.0;
        Ok(())
    }

    fn write_enemy(&self, enemy: &EnemyState, slot: &mut [f32]) -> Result<(), EncodeError> {
        let type_index = *self
            .enemy_types
            .get(&enemy.kind)
            .ok_or_else(|| EncodeError::UnknownEnemyType(enemy.kind.clone()))?;

        slot[0] = 1.0;
        slot[1] = normalize(enemy.position.x, self.width);
        slot[2] = normalize(enemy.position.y, self.height);
        slot[3] = normalize(enemy.current_health, enemy.full_health);
        slot[4] = clamp_unit(enemy.path_progress);
        slot[ENEMY_BASE_FEATURES + type_index] = 1.0;
        Ok(())
    }
}

fn catalogue_index<'a>(names: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    names
        .enumerate()
        .map(|(index, name)| (name.to_owned(), index))
        .collect()
}

/// Scales `value` by `max` into `0.0..=1.0`; a non-positive `max` encodes zero.
///
/// The ratio is taken in `f64` and only narrowed once clamped.
fn normalize(value: f64, max: f64) -> f32 {
    if max > 0.0 {
        clamp_unit(value / max)
    } else {
        0.0
    }
}

fn clamp_unit(value: f64) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0) as f32
    }
}
