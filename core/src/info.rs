//! Static game configuration published once by the server's `info` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ActionKind, GameCommand, Position};

/// Immutable description of the game the adapter plays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    /// Ordered catalogue of actions the server accepts.
    pub actions: Vec<ActionDescriptor>,
    /// Ordered catalogue of constructible towers.
    pub towers: Vec<TowerDescriptor>,
    /// Map geometry and path layout.
    pub map: MapInfo,
    /// Wave cadence parameters and the enemy type catalogue.
    pub waves: WaveInfo,
    /// Maxima used as normalization denominators.
    #[serde(rename = "max_global_info")]
    pub limits: GlobalLimits,
    /// Tower with the slowest attack, used as the cooldown reference.
    #[serde(rename = "slower_tower_sample")]
    pub reference_tower: TowerSample,
}

impl GameInfo {
    /// Number of whole grid columns covered by the map.
    #[must_use]
    pub fn grid_columns(&self) -> usize {
        self.map.cells_along(self.map.width)
    }

    /// Number of whole grid rows covered by the map.
    #[must_use]
    pub fn grid_rows(&self) -> usize {
        self.map.cells_along(self.map.height)
    }

    /// Position of the tower type within the tower catalogue.
    #[must_use]
    pub fn tower_index(&self, kind: &str) -> Option<usize> {
        self.towers.iter().position(|tower| tower.kind == kind)
    }

    /// Position of the enemy type within the enemy type catalogue.
    #[must_use]
    pub fn enemy_type_index(&self, kind: &str) -> Option<usize> {
        self.waves.enemy_types.iter().position(|name| name == kind)
    }

    /// Cost of the cheapest tower in the catalogue, if the catalogue is not empty.
    #[must_use]
    pub fn cheapest_tower_cost(&self) -> Option<f64> {
        self.towers
            .iter()
            .map(|tower| tower.cost)
            .min_by(|left, right| left.total_cmp(right))
    }
}

/// Entry of the action catalogue: an action kind plus its payload template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Kind of action described by the entry.
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Template fields copied into every command built from this entry.
    #[serde(flatten)]
    pub template: Map<String, Value>,
}

impl ActionDescriptor {
    /// Builds a fresh command from the template.
    #[must_use]
    pub fn instantiate(&self) -> GameCommand {
        GameCommand {
            kind: self.kind.clone(),
            payload: self.template.clone(),
        }
    }
}

/// Entry of the tower catalogue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerDescriptor {
    /// Server-side type identifier.
    #[serde(rename = "type")]
    pub kind: String,
    /// Money required to build the tower.
    pub cost: f64,
    /// Attack radius in world units.
    pub range: f64,
    /// Time between attacks.
    #[serde(rename = "attackCooldown", default)]
    pub attack_cooldown: f64,
    /// First wave at which the tower may be built.
    #[serde(rename = "unlockWave", default)]
    pub unlock_wave: u32,
}

/// Map geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Side length of a square grid cell in world units.
    pub cell_size: f64,
    /// Map width in world units.
    pub width: f64,
    /// Map height in world units.
    pub height: f64,
    /// Ordered centres of the cells the enemy path crosses.
    #[serde(default)]
    pub path_cells: Vec<Position>,
    /// Total path length in world units.
    pub path_length: f64,
}

impl MapInfo {
    /// Pixel dimensions of a frame showing the whole map, one pixel per world unit.
    #[must_use]
    pub fn frame_dimensions(&self) -> (u32, u32) {
        (pixels(self.width), pixels(self.height))
    }

    fn cells_along(&self, extent: f64) -> usize {
        if self.cell_size <= 0.0 || extent <= 0.0 {
            return 0;
        }
        (extent / self.cell_size).floor() as usize
    }
}

fn pixels(extent: f64) -> u32 {
    if extent.is_finite() && extent > 0.0 {
        extent.round() as u32
    } else {
        0
    }
}

/// Wave cadence parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveInfo {
    /// Delay between consecutive waves.
    pub wave_delay: f64,
    /// Largest number of enemies a single wave may contain.
    pub max_enemies: u32,
    /// Delay between spawns inside a wave.
    pub spawn_delay: f64,
    /// Sample of the slowest enemy the server can spawn.
    #[serde(rename = "slower_enemy_sample")]
    pub slowest_enemy: EnemySample,
    /// Ordered enemy type catalogue.
    pub enemy_types: Vec<String>,
}

/// Movement sample describing an enemy archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySample {
    /// Sustained movement speed in world units per time unit.
    #[serde(rename = "currentSpeed")]
    pub current_speed: f64,
}

/// Attack sample describing a tower archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSample {
    /// Time between attacks.
    #[serde(rename = "attackCooldown")]
    pub attack_cooldown: f64,
}

/// Maxima used to normalize global scalars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalLimits {
    /// Longest expected elapsed game time.
    #[serde(rename = "gameTime")]
    pub game_time: f64,
    /// Highest expected wave number.
    #[serde(rename = "waveNumber")]
    pub wave_number: u32,
    /// Largest expected money balance.
    pub money: f64,
}

#[cfg(test)]
mod tests {
    use super::GameInfo;
    use crate::{ActionKind, Position};
    use serde_json::json;

    fn sample_info() -> GameInfo {
        serde_json::from_value(json!({
            "actions": [
                { "type": "BUILD_TOWER", "towerType": null, "position": { "x": 0, "y": 0 } },
                { "type": "NONE" }
            ],
            "towers": [
                { "type": "archer", "cost": 50, "range": 120, "attackCooldown": 500, "unlockWave": 0 },
                { "type": "cannon", "cost": 30, "range": 80, "attackCooldown": 1500, "unlockWave": 3 }
            ],
            "map": {
                "cell_size": 50,
                "width": 930,
                "height": 600,
                "path_length": 1500,
                "path_cells": [{ "x": 75, "y": 25 }, { "x": 75, "y": 75 }]
            },
            "waves": {
                "wave_delay": 10000,
                "max_enemies": 12,
                "spawn_delay": 800,
                "slower_enemy_sample": { "currentSpeed": 0.05 },
                "enemy_types": ["grunt", "runner"]
            },
            "max_global_info": { "gameTime": 600000, "waveNumber": 50, "money": 5000 },
            "slower_tower_sample": { "attackCooldown": 1500 }
        }))
        .expect("info parses")
    }

    #[test]
    fn parses_server_payload() {
        let info = sample_info();
        assert_eq!(info.actions.len(), 2);
        assert_eq!(info.actions[0].kind, ActionKind::BuildTower);
        assert_eq!(info.towers[1].unlock_wave, 3);
        assert_eq!(info.map.path_cells[1], Position::new(75.0, 75.0));
        assert_eq!(info.waves.enemy_types, vec!["grunt", "runner"]);
        assert_eq!(info.limits.wave_number, 50);
    }

    #[test]
    fn grid_dimensions_truncate_partial_cells() {
        let info = sample_info();
        assert_eq!(info.grid_columns(), 18);
        assert_eq!(info.grid_rows(), 12);
    }

    #[test]
    fn frame_dimensions_round_map_extent() {
        let mut info = sample_info();
        assert_eq!(info.map.frame_dimensions(), (930, 600));

        info.map.width = -1.0;
        info.map.height = f64::NAN;
        assert_eq!(info.map.frame_dimensions(), (0, 0));
    }

    #[test]
    fn catalogue_lookups_follow_declaration_order() {
        let info = sample_info();
        assert_eq!(info.tower_index("cannon"), Some(1));
        assert_eq!(info.tower_index("laser"), None);
        assert_eq!(info.enemy_type_index("runner"), Some(1));
        assert_eq!(info.cheapest_tower_cost(), Some(30.0));
    }

    #[test]
    fn descriptor_instantiates_template_copy() {
        let info = sample_info();
        let command = info.actions[1].instantiate();
        assert_eq!(command.kind, ActionKind::Other("NONE".to_owned()));
        assert!(command.payload.is_empty());
    }
}
