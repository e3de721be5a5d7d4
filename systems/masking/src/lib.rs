#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that derives per-dimension legality masks from the current snapshot.
//!
//! Grid dimensions are always fully permissive: a per-dimension mask cannot
//! express "this cell is occupied" without disabling whole rows or columns, so
//! illegal placements are left for the server to reject.

use tower_gym_core::{ActionKind, ActionMask, GameInfo, GameState};

/// Affordability and unlock data for one tower type.
#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerGate {
    cost: f64,
    unlock_wave: u32,
}

impl TowerGate {
    fn admits(&self, money: f64, wave: u32) -> bool {
        money >= self.cost && wave >= self.unlock_wave
    }
}

/// Mask generator holding the catalogue data it needs.
#[derive(Clone, Debug)]
pub struct ActionMasker {
    build_entries: Vec<bool>,
    towers: Vec<TowerGate>,
    cheapest_cost: Option<f64>,
    columns: usize,
    rows: usize,
}

impl ActionMasker {
    /// Creates a generator for the provided static configuration.
    #[must_use]
    pub fn new(info: &GameInfo) -> Self {
        Self {
            build_entries: info
                .actions
                .iter()
                .map(|action| action.kind == ActionKind::BuildTower)
                .collect(),
            towers: info
                .towers
                .iter()
                .map(|tower| TowerGate {
                    cost: tower.cost,
                    unlock_wave: tower.unlock_wave,
                })
                .collect(),
            cheapest_cost: info.cheapest_tower_cost(),
            columns: info.grid_columns(),
            rows: info.grid_rows(),
        }
    }

    /// Computes the legality mask for the next action taken from `state`.
    #[must_use]
    pub fn mask(&self, state: &GameState) -> ActionMask {
        let can_build = self
            .cheapest_cost
            .map_or(false, |cheapest| state.money >= cheapest);

        ActionMask {
            action_types: self
                .build_entries
                .iter()
                .map(|is_build| !is_build || can_build)
                .collect(),
            tower_types: self
                .towers
                .iter()
                .map(|gate| gate.admits(state.money, state.wave_number))
                .collect(),
            columns: vec![true; self.columns],
            rows: vec![true; self.rows],
        }
    }
}
