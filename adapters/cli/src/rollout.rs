use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng};
use tower_gym_core::{ActionMask, FrameDecoder, GameServer, GridAction};
use tower_gym_world::{EnvError, TowerDefenseEnv};

/// Outcome of one rollout episode.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EpisodeSummary {
    pub(crate) steps: usize,
    pub(crate) total_reward: f32,
    pub(crate) final_wave: u32,
    pub(crate) terminated: bool,
    pub(crate) truncated: bool,
    pub(crate) tower_counts: BTreeMap<String, usize>,
}

/// Picks each component uniformly among its legal entries.
///
/// A dimension without legal entries falls back to a uniform choice over all
/// of them; the server rejects the resulting action.
pub(crate) fn sample_action<R: Rng + ?Sized>(mask: &ActionMask, rng: &mut R) -> GridAction {
    GridAction::new(
        choose(&mask.action_types, rng),
        choose(&mask.tower_types, rng),
        choose(&mask.columns, rng),
        choose(&mask.rows, rng),
    )
}

fn choose<R: Rng + ?Sized>(mask: &[bool], rng: &mut R) -> usize {
    let legal: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(index, allowed)| allowed.then_some(index))
        .collect();
    match legal.choose(rng) {
        Some(index) => *index,
        None if mask.is_empty() => 0,
        None => rng.gen_range(0..mask.len()),
    }
}

/// Plays one episode with the random mask-respecting policy.
pub(crate) fn run_episode<S, D, R>(
    env: &mut TowerDefenseEnv<S, D>,
    rng: &mut R,
    seed: Option<u64>,
    max_steps: usize,
) -> Result<EpisodeSummary, EnvError>
where
    S: GameServer,
    D: FrameDecoder,
    R: Rng + ?Sized,
{
    let (_, mut info) = env.reset_with_seed(seed)?;
    let mut summary = EpisodeSummary {
        steps: 0,
        total_reward: 0.0,
        final_wave: info.wave_number.unwrap_or_default(),
        terminated: false,
        truncated: false,
        tower_counts: info.tower_counts.clone(),
    };

    while summary.steps < max_steps {
        let mask = match info.action_mask.take() {
            Some(mask) => mask,
            None => env.action_masks()?,
        };
        let step = env.step(sample_action(&mask, rng))?;

        summary.steps += 1;
        summary.total_reward += step.reward;
        summary.terminated = step.terminated;
        summary.truncated = step.truncated;
        if let Some(wave) = step.info.wave_number {
            summary.final_wave = wave;
            summary.tower_counts.clone_from(&step.info.tower_counts);
        }
        if step.is_done() {
            break;
        }
        info = step.info;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::{choose, sample_action};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tower_gym_core::ActionMask;

    #[test]
    fn samples_only_legal_entries() {
        let mask = ActionMask {
            action_types: vec![false, true],
            tower_types: vec![true, false, true],
            columns: vec![true; 4],
            rows: vec![false, false, true],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..200 {
            let action = sample_action(&mask, &mut rng);
            assert!(mask.permits(action), "{action:?} violates mask");
        }
    }

    #[test]
    fn fully_masked_dimension_still_yields_an_index() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..50 {
            assert!(choose(&[false, false, false], &mut rng) < 3);
        }
        assert_eq!(choose(&[], &mut rng), 0);
    }
}
