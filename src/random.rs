//! Seedable randomness.
//!
//! Every operator in the crate takes `&mut R where R: Rng` so a whole run is
//! reproducible from one seed. [`create_rng`] is the only place a generator
//! is constructed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Creates a deterministic generator from `seed`.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator from `seed`, or from OS entropy when `None`.
pub fn rng_from_option(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

/// Fisher-Yates shuffle of `slice` in place.
pub fn shuffle<T, R: Rng>(slice: &mut [T], rng: &mut R) {
    slice.shuffle(rng);
}

/// Returns `true` with probability `percent / 100`.
///
/// Draws an integer in `1..=100` and compares it with `percent`.
pub fn percent_chance<R: Rng>(percent: u8, rng: &mut R) -> bool {
    rng.random_range(1..=100u8) <= percent
}
