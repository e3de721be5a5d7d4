//! Construction-time configuration of the environment façade.

use serde::{Deserialize, Serialize};
use tower_gym_core::Position;
use tower_gym_system_capacity::CapacityModel;
use tower_gym_system_observation::EncoderConfig;
use tower_gym_system_reward::RewardTuning;

/// Behaviour of [`crate::TowerDefenseEnv::render`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Fetch the current frame from the server as an RGB array.
    #[default]
    RgbArray,
    /// Never contact the server; always produce a blank frame.
    Disabled,
}

/// Waypoint path submitted to the server before a reset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapLayout {
    /// Optional label used in logs.
    #[serde(default)]
    pub name: Option<String>,
    /// Ordered path waypoints in world units.
    pub waypoints: Vec<Position>,
}

impl MapLayout {
    /// Creates an unnamed layout from `(x, y)` waypoint pairs.
    #[must_use]
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self {
            name: None,
            waypoints: points.iter().map(|&(x, y)| Position::new(x, y)).collect(),
        }
    }

    /// Label for logs, falling back to the waypoint count.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} waypoints", self.waypoints.len()))
    }
}

/// Everything the façade needs besides the server itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Optional observation blocks.
    pub encoder: EncoderConfig,
    /// Formula bounding concurrently alive enemies.
    pub capacity_model: CapacityModel,
    /// Rendering behaviour.
    pub render_mode: RenderMode,
    /// Reward shaping constants.
    pub reward: RewardTuning,
    /// Maps rotated across resets; empty keeps the server's current map.
    pub maps: Vec<MapLayout>,
    /// Seed of the map rotation.
    pub seed: u64,
}
