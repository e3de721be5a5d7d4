use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::MapLayout;

/// Seeded uniform choice among configured maps.
///
/// The same seed always yields the same map sequence.
#[derive(Clone, Debug)]
pub(crate) struct MapRotation {
    maps: Vec<MapLayout>,
    rng: ChaCha8Rng,
}

impl MapRotation {
    /// Returns `None` when no maps are configured.
    pub(crate) fn new(maps: Vec<MapLayout>, seed: u64) -> Option<Self> {
        if maps.is_empty() {
            return None;
        }
        Some(Self {
            maps,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub(crate) fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub(crate) fn next_map(&mut self) -> &MapLayout {
        let index = self.rng.gen_range(0..self.maps.len());
        &self.maps[index]
    }
}
