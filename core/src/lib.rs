#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tower-gym adapter.
//!
//! This crate defines the data that flows between the external game server,
//! the pure systems and the environment façade. The server publishes a
//! [`GameInfo`] once and a [`GameState`] snapshot after every command. Systems
//! read those values immutably and answer with fixed-shape artefacts: capacity
//! bounds, observation vectors, [`GameCommand`] values, rewards and
//! [`ActionMask`] values. The façade glues them together behind the
//! [`Environment`] contract consumed by a training loop.

mod environment;
mod frame;
mod info;
mod server;
mod snapshot;
mod spaces;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use environment::{Environment, RewardBreakdown, Step, StepInfo};
pub use frame::{Frame, FrameDecoder};
pub use info::{
    ActionDescriptor, EnemySample, GameInfo, GlobalLimits, MapInfo, TowerDescriptor, TowerSample,
    WaveInfo,
};
pub use server::{GameServer, ServerError};
pub use snapshot::{EnemyState, GameState, TowerState};
pub use spaces::{ActionSpace, ObservationSpace};

/// Wire name of the action kind that constructs a tower.
pub const BUILD_TOWER_KIND: &str = "BUILD_TOWER";

/// Point expressed in world units, matching the server's `{"x", "y"}` objects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate in world units.
    pub x: f64,
    /// Vertical coordinate in world units.
    pub y: f64,
}

impl Position {
    /// Creates a new position from world coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Fixed-shape discrete action selected by a policy.
///
/// The four components index, in order, the action catalogue, the tower
/// catalogue, the grid column and the grid row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridAction {
    /// Index into the action catalogue.
    pub action_type: usize,
    /// Index into the tower catalogue.
    pub tower_type: usize,
    /// Zero-based grid column of the target cell.
    pub column: usize,
    /// Zero-based grid row of the target cell.
    pub row: usize,
}

impl GridAction {
    /// Creates a new action tuple.
    #[must_use]
    pub const fn new(action_type: usize, tower_type: usize, column: usize, row: usize) -> Self {
        Self {
            action_type,
            tower_type,
            column,
            row,
        }
    }

    /// Returns the action as the raw vector a multi-discrete sampler produces.
    #[must_use]
    pub const fn to_array(self) -> [usize; 4] {
        [self.action_type, self.tower_type, self.column, self.row]
    }
}

impl From<[usize; 4]> for GridAction {
    fn from([action_type, tower_type, column, row]: [usize; 4]) -> Self {
        Self::new(action_type, tower_type, column, row)
    }
}

/// Kind of a server-side action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    /// Constructs a tower at a world position.
    BuildTower,
    /// Any other action the server advertises, such as a no-op.
    Other(String),
}

impl ActionKind {
    /// Wire representation of the action kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BuildTower => BUILD_TOWER_KIND,
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        if value == BUILD_TOWER_KIND {
            Self::BuildTower
        } else {
            Self::Other(value)
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::BuildTower => BUILD_TOWER_KIND.to_owned(),
            ActionKind::Other(name) => name,
        }
    }
}

/// Concrete command body submitted to the server's `step` endpoint.
///
/// The payload keeps every field of the originating template so that
/// server-specific extras survive translation untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameCommand {
    /// Kind of action requested.
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Remaining fields of the command object.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl GameCommand {
    const TOWER_TYPE_FIELD: &'static str = "towerType";
    const POSITION_FIELD: &'static str = "position";

    /// Creates a command of the provided kind with an empty payload.
    #[must_use]
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            payload: Map::new(),
        }
    }

    /// Tower type requested by a build command, if any.
    #[must_use]
    pub fn tower_type(&self) -> Option<&str> {
        self.payload
            .get(Self::TOWER_TYPE_FIELD)
            .and_then(Value::as_str)
    }

    /// Target position carried by the command, if any.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.payload
            .get(Self::POSITION_FIELD)
            .and_then(|value| Position::deserialize(value).ok())
    }

    /// Overwrites the requested tower type.
    pub fn set_tower_type(&mut self, tower_type: &str) {
        let _ = self.payload.insert(
            Self::TOWER_TYPE_FIELD.to_owned(),
            Value::String(tower_type.to_owned()),
        );
    }

    /// Overwrites the target position.
    pub fn set_position(&mut self, position: Position) {
        let mut object = Map::with_capacity(2);
        let _ = object.insert("x".to_owned(), Value::from(position.x));
        let _ = object.insert("y".to_owned(), Value::from(position.y));
        let _ = self
            .payload
            .insert(Self::POSITION_FIELD.to_owned(), Value::Object(object));
    }
}

/// Upper bounds on concurrently live entities used to size observation slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CapacityBounds {
    max_towers: usize,
    max_enemies: usize,
}

impl CapacityBounds {
    /// Creates a new pair of capacity bounds.
    #[must_use]
    pub const fn new(max_towers: usize, max_enemies: usize) -> Self {
        Self {
            max_towers,
            max_enemies,
        }
    }

    /// Maximum number of towers that can be alive at once.
    #[must_use]
    pub const fn max_towers(&self) -> usize {
        self.max_towers
    }

    /// Maximum number of enemies that can be alive at once.
    #[must_use]
    pub const fn max_enemies(&self) -> usize {
        self.max_enemies
    }
}

/// Legality mask for every dimension of the multi-discrete action space.
///
/// `true` marks a legal choice. Grid dimensions cannot express per-cell
/// occupancy and are therefore always fully permissive.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActionMask {
    /// One entry per action catalogue descriptor.
    pub action_types: Vec<bool>,
    /// One entry per tower catalogue descriptor.
    pub tower_types: Vec<bool>,
    /// One entry per grid column.
    pub columns: Vec<bool>,
    /// One entry per grid row.
    pub rows: Vec<bool>,
}

impl ActionMask {
    /// Concatenates the per-dimension masks in action-space order.
    #[must_use]
    pub fn flatten(&self) -> Vec<bool> {
        let mut flat = Vec::with_capacity(
            self.action_types.len() + self.tower_types.len() + self.columns.len() + self.rows.len(),
        );
        flat.extend_from_slice(&self.action_types);
        flat.extend_from_slice(&self.tower_types);
        flat.extend_from_slice(&self.columns);
        flat.extend_from_slice(&self.rows);
        flat
    }

    /// Reports whether every component of the action is individually legal.
    #[must_use]
    pub fn permits(&self, action: GridAction) -> bool {
        let allowed = |mask: &[bool], index: usize| mask.get(index).copied().unwrap_or(false);
        allowed(&self.action_types, action.action_type)
            && allowed(&self.tower_types, action.tower_type)
            && allowed(&self.columns, action.column)
            && allowed(&self.rows, action.row)
    }
}
