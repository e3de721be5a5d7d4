//! Per-step game state snapshots returned by `reset` and `step`.

use serde::{Deserialize, Serialize};

use crate::Position;

/// Full description of the dynamic game entities at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Elapsed game time.
    pub game_time: f64,
    /// Current wave number.
    pub wave_number: u32,
    /// Current money balance.
    pub money: f64,
    /// Whether the server declared the game lost.
    pub game_over: bool,
    /// Live towers in server order; newly built towers are appended.
    #[serde(default)]
    pub towers: Vec<TowerState>,
    /// Live enemies in server order.
    #[serde(default)]
    pub enemies: Vec<EnemyState>,
}

/// Snapshot of a live tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerState {
    /// World position of the tower centre.
    pub position: Position,
    /// Tower type identifier from the tower catalogue.
    #[serde(rename = "type")]
    pub kind: String,
    /// Time left before the tower can attack again.
    #[serde(default)]
    pub attack_cooldown: f64,
}

/// Snapshot of a live enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyState {
    /// World position of the enemy.
    pub position: Position,
    /// Enemy type identifier from the enemy type catalogue.
    #[serde(rename = "type")]
    pub kind: String,
    /// Remaining health.
    pub current_health: f64,
    /// Health at spawn.
    pub full_health: f64,
    /// Fraction of the path already travelled, in `0.0..=1.0`.
    pub path_progress: f64,
}
