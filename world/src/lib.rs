#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Environment façade composing the pure systems behind a reset/step/render contract.
//!
//! The façade owns exactly one current snapshot. Its lifecycle is
//! `AwaitingReset -> Running -> Done`, and `reset` may be called from any
//! phase. Construction fetches the static configuration once and derives
//! every system from it; nothing is recomputed afterwards.

mod config;
mod rotation;

use thiserror::Error;
use tower_gym_core::{
    ActionMask, ActionSpace, CapacityBounds, Environment, Frame, FrameDecoder, GameInfo,
    GameServer, GameState, GridAction, ObservationSpace, RewardBreakdown, ServerError, Step,
    StepInfo,
};
use tower_gym_system_action::{ActionTranslator, TranslateError};
use tower_gym_system_capacity::CapacityError;
use tower_gym_system_masking::ActionMasker;
use tower_gym_system_observation::{EncodeError, ObservationEncoder};
use tower_gym_system_reward::{RewardError, RewardShaper};
use tracing::{debug, info, warn};

pub use config::{EnvConfig, MapLayout, RenderMode};

use rotation::MapRotation;

/// Failures surfaced by the façade.
///
/// Rejected steps are not errors; they end the episode as truncated.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The static configuration could not be fetched.
    #[error("failed to fetch game configuration: {0}")]
    Startup(#[source] ServerError),
    /// The static configuration does not admit finite capacity bounds.
    #[error("failed to estimate capacity bounds: {0}")]
    Capacity(#[from] CapacityError),
    /// The server failed to start a new game.
    #[error("failed to reset the game: {0}")]
    Reset(#[source] ServerError),
    /// A snapshot could not be encoded faithfully.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// A transition could not be rewarded.
    #[error(transparent)]
    Reward(#[from] RewardError),
    /// The action violates the declared action space.
    #[error(transparent)]
    Translate(#[from] TranslateError),
    /// An operation needing a snapshot was called before the first reset.
    #[error("environment must be reset before use")]
    NotReset,
    /// A step was requested after the episode ended.
    #[error("episode finished; call reset to start a new one")]
    EpisodeFinished,
}

/// Lifecycle phase of the façade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EpisodePhase {
    /// Constructed, no snapshot yet.
    AwaitingReset,
    /// A snapshot is current and steps are accepted.
    Running,
    /// The episode ended; only `reset` is accepted.
    Done,
}

#[derive(Debug)]
struct Episode {
    state: GameState,
    observation: Vec<f32>,
    steps: usize,
    total_reward: f32,
    done: bool,
}

/// Reinforcement-learning environment backed by a game server.
///
/// `D` turns the server's encoded render payloads into frames.
#[derive(Debug)]
pub struct TowerDefenseEnv<S, D> {
    server: S,
    decoder: D,
    info: GameInfo,
    bounds: CapacityBounds,
    encoder: ObservationEncoder,
    translator: ActionTranslator,
    masker: ActionMasker,
    shaper: RewardShaper,
    rotation: Option<MapRotation>,
    render_mode: RenderMode,
    episode: Option<Episode>,
}

impl<S: GameServer, D: FrameDecoder> TowerDefenseEnv<S, D> {
    /// Fetches the static configuration and derives every system from it.
    ///
    /// Any failure is fatal: no partially configured environment is returned.
    pub fn new(mut server: S, decoder: D, config: EnvConfig) -> Result<Self, EnvError> {
        let info = server.info().map_err(EnvError::Startup)?;
        let bounds = tower_gym_system_capacity::estimate(&info, config.capacity_model)?;

        let encoder = ObservationEncoder::new(&info, bounds, config.encoder);
        let translator = ActionTranslator::new(&info);
        let masker = ActionMasker::new(&info);
        let shaper = RewardShaper::new(&info, config.reward);

        info!(
            max_towers = bounds.max_towers(),
            max_enemies = bounds.max_enemies(),
            model = ?config.capacity_model,
            observation_len = encoder.space().len(),
            action_nvec = ?translator.space().nvec(),
            "environment configured"
        );

        Ok(Self {
            server,
            decoder,
            info,
            bounds,
            encoder,
            translator,
            masker,
            shaper,
            rotation: MapRotation::new(config.maps, config.seed),
            render_mode: config.render_mode,
            episode: None,
        })
    }

    /// Static configuration fetched at construction.
    #[must_use]
    pub const fn info(&self) -> &GameInfo {
        &self.info
    }

    /// Capacity bounds sizing the observation slots.
    #[must_use]
    pub const fn bounds(&self) -> CapacityBounds {
        self.bounds
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> EpisodePhase {
        match &self.episode {
            None => EpisodePhase::AwaitingReset,
            Some(episode) if episode.done => EpisodePhase::Done,
            Some(_) => EpisodePhase::Running,
        }
    }

    /// Snapshot of the last successfully applied transition.
    #[must_use]
    pub fn current_state(&self) -> Option<&GameState> {
        self.episode.as_ref().map(|episode| &episode.state)
    }

    /// Mutable access to the underlying server.
    pub fn server_mut(&mut self) -> &mut S {
        &mut self.server
    }

    /// Starts a new episode, reseeding the map rotation when `seed` is given.
    pub fn reset_with_seed(&mut self, seed: Option<u64>) -> Result<(Vec<f32>, StepInfo), EnvError> {
        if let Some(rotation) = self.rotation.as_mut() {
            if let Some(seed) = seed {
                rotation.reseed(seed);
            }
            let layout = rotation.next_map();
            match self.server.set_map(&layout.waypoints) {
                Ok(()) => debug!(map = %layout.label(), "map selected"),
                Err(error) => {
                    warn!(map = %layout.label(), %error, "failed to set map; keeping current map");
                }
            }
        }

        let state = self.server.reset().map_err(EnvError::Reset)?;
        let observation = self.encoder.encode(&state)?;
        let info = step_info(&self.masker, &self.info, &state, None);

        debug!(wave = state.wave_number, money = state.money, "episode started");
        self.episode = Some(Episode {
            state,
            observation: observation.clone(),
            steps: 0,
            total_reward: 0.0,
            done: false,
        });
        Ok((observation, info))
    }

    /// Applies `action` and reports the resulting transition.
    ///
    /// A command the server refuses, or cannot be delivered, leaves the
    /// snapshot untouched and ends the episode as truncated with zero reward
    /// and an empty info payload.
    pub fn step(&mut self, action: GridAction) -> Result<Step, EnvError> {
        let episode = self.episode.as_mut().ok_or(EnvError::NotReset)?;
        if episode.done {
            return Err(EnvError::EpisodeFinished);
        }

        let command = self.translator.translate(action)?;
        let next = match self.server.step(&command) {
            Ok(state) => state,
            Err(error) => {
                warn!(?action, %error, "step failed; truncating episode");
                episode.done = true;
                return Ok(Step {
                    observation: episode.observation.clone(),
                    reward: 0.0,
                    terminated: false,
                    truncated: true,
                    info: StepInfo::default(),
                });
            }
        };

        let terms = self.shaper.shape(&episode.state, &next)?;
        let observation = self.encoder.encode(&next)?;
        let reward = terms.total();

        let limits = &self.info.limits;
        let terminated = next.game_over
            || next.wave_number >= limits.wave_number
            || next.money >= limits.money;
        let truncated = next.game_time >= limits.game_time;

        let info = step_info(&self.masker, &self.info, &next, Some(terms));
        episode.steps += 1;
        episode.total_reward += reward;
        episode.done = terminated || truncated;
        if episode.done {
            info!(
                steps = episode.steps,
                total_reward = episode.total_reward,
                wave = next.wave_number,
                terminated,
                truncated,
                "episode finished"
            );
        }
        episode.observation.clone_from(&observation);
        episode.state = next;

        Ok(Step {
            observation,
            reward,
            terminated,
            truncated,
            info,
        })
    }

    /// Legality mask for the next action, for samplers that query it out of band.
    pub fn action_masks(&self) -> Result<ActionMask, EnvError> {
        self.current_state()
            .map(|state| self.masker.mask(state))
            .ok_or(EnvError::NotReset)
    }

    /// Best-effort frame of the current game; falls back to a blank map-sized frame.
    pub fn render(&mut self) -> Frame {
        let (width, height) = self.info.map.frame_dimensions();
        if self.render_mode == RenderMode::Disabled {
            return Frame::blank(width, height);
        }

        let decoded = self
            .server
            .render()
            .map_err(|error| error.to_string())
            .and_then(|bytes| self.decoder.decode(&bytes).map_err(|error| error.to_string()));
        match decoded {
            Ok(frame) => frame,
            Err(error) => {
                warn!(%error, "render failed; returning blank frame");
                Frame::blank(width, height)
            }
        }
    }
}

fn step_info(
    masker: &ActionMasker,
    info: &GameInfo,
    state: &GameState,
    terms: Option<RewardBreakdown>,
) -> StepInfo {
    StepInfo {
        action_mask: Some(masker.mask(state)),
        wave_number: Some(state.wave_number),
        tower_counts: query::tower_counts(info, state),
        reward_terms: terms,
    }
}

impl<S: GameServer, D: FrameDecoder> Environment for TowerDefenseEnv<S, D> {
    type Frame = Frame;
    type Error = EnvError;

    fn action_space(&self) -> ActionSpace {
        self.translator.space()
    }

    fn observation_space(&self) -> ObservationSpace {
        self.encoder.space()
    }

    fn reset(&mut self) -> Result<(Vec<f32>, StepInfo), EnvError> {
        self.reset_with_seed(None)
    }

    fn step(&mut self, action: GridAction) -> Result<Step, EnvError> {
        TowerDefenseEnv::step(self, action)
    }

    fn render(&mut self) -> Frame {
        TowerDefenseEnv::render(self)
    }
}

/// Read-only helpers over snapshots.
pub mod query {
    use std::collections::BTreeMap;

    use tower_gym_core::{GameInfo, GameState};

    /// Live towers per catalogue type; types without towers report zero.
    #[must_use]
    pub fn tower_counts(info: &GameInfo, state: &GameState) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = info
            .towers
            .iter()
            .map(|tower| (tower.kind.clone(), 0))
            .collect();
        for tower in &state.towers {
            *counts.entry(tower.kind.clone()).or_insert(0) += 1;
        }
        counts
    }
}
