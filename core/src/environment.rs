//! Environment contract exposed to an external training loop.

use std::collections::BTreeMap;

use crate::{ActionMask, ActionSpace, GridAction, ObservationSpace};

/// Standard reset/step/render contract of a reinforcement-learning environment.
pub trait Environment {
    /// Image type produced by [`Environment::render`].
    type Frame;
    /// Error raised by operations that cannot recover locally.
    type Error;

    /// Declared multi-discrete action space.
    fn action_space(&self) -> ActionSpace;

    /// Declared bounded observation space.
    fn observation_space(&self) -> ObservationSpace;

    /// Starts a new episode, returning the initial observation and info.
    fn reset(&mut self) -> Result<(Vec<f32>, StepInfo), Self::Error>;

    /// Applies one action and reports the resulting transition.
    fn step(&mut self, action: GridAction) -> Result<Step, Self::Error>;

    /// Produces an image of the current frame; never fails.
    fn render(&mut self) -> Self::Frame;
}

/// Outcome of a single environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Encoded observation after the step.
    pub observation: Vec<f32>,
    /// Shaped scalar reward of the transition.
    pub reward: f32,
    /// Episode ended through the task's own success or failure condition.
    pub terminated: bool,
    /// Episode ended through an external cutoff.
    pub truncated: bool,
    /// Auxiliary data for logging and mask-aware sampling.
    pub info: StepInfo,
}

impl Step {
    /// Reports whether the episode ended for any reason.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Auxiliary data returned next to observations.
///
/// A rejected step carries the empty default value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepInfo {
    /// Legality mask for the next action.
    pub action_mask: Option<ActionMask>,
    /// Wave number of the current snapshot.
    pub wave_number: Option<u32>,
    /// Number of live towers per tower type.
    pub tower_counts: BTreeMap<String, usize>,
    /// Individual reward terms of the step, absent after a reset.
    pub reward_terms: Option<RewardBreakdown>,
}

impl StepInfo {
    /// Reports whether the info carries no data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.action_mask.is_none()
            && self.wave_number.is_none()
            && self.tower_counts.is_empty()
            && self.reward_terms.is_none()
    }
}

/// Independent terms whose sum forms the shaped reward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardBreakdown {
    /// Credit for enemies that disappeared.
    pub enemies_removed: f32,
    /// Bonus for reaching a new wave.
    pub wave_completion: f32,
    /// Coverage shaping for newly placed towers.
    pub tower_placement: f32,
    /// Friction applied when money decreased.
    pub spending: f32,
    /// Penalty applied when the game is lost.
    pub terminal: f32,
}

impl RewardBreakdown {
    /// Sum of every term.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.enemies_removed
            + self.wave_completion
            + self.tower_placement
            + self.spending
            + self.terminal
    }
}
