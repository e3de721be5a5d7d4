//! Declared action and observation spaces.

use crate::GridAction;

/// Multi-discrete action space: action type, tower type, grid column, grid row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionSpace {
    nvec: [usize; 4],
}

impl ActionSpace {
    /// Creates a new action space from the size of each dimension.
    #[must_use]
    pub const fn new(action_types: usize, tower_types: usize, columns: usize, rows: usize) -> Self {
        Self {
            nvec: [action_types, tower_types, columns, rows],
        }
    }

    /// Number of choices available in each dimension.
    #[must_use]
    pub const fn nvec(&self) -> [usize; 4] {
        self.nvec
    }

    /// Total number of entries across every per-dimension mask.
    #[must_use]
    pub fn mask_len(&self) -> usize {
        self.nvec.iter().sum()
    }

    /// Reports whether every component of the action lies inside its dimension.
    #[must_use]
    pub fn contains(&self, action: GridAction) -> bool {
        action
            .to_array()
            .iter()
            .zip(self.nvec.iter())
            .all(|(value, size)| value < size)
    }
}

/// Bounded real vector space holding normalized observations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObservationSpace {
    len: usize,
}

impl ObservationSpace {
    /// Lower bound of every component.
    pub const LOW: f32 = 0.0;
    /// Upper bound of every component.
    pub const HIGH: f32 = 1.0;

    /// Creates a new observation space of the provided length.
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { len }
    }

    /// Number of components in an observation.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the space holds no components.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reports whether the vector has the right length and every component is in bounds.
    #[must_use]
    pub fn contains(&self, observation: &[f32]) -> bool {
        observation.len() == self.len
            && observation
                .iter()
                .all(|value| (Self::LOW..=Self::HIGH).contains(value))
    }
}
