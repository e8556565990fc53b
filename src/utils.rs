//! Utility functions for the Stackwise pipeline.
//!
//! Random helpers for the trainer. Generators are always passed in
//! explicitly so seeded runs stay reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Return the indices `0..len` in random order.
///
/// # Examples
///
/// ```
/// use stackwise::utils::shuffled_indices;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let mut idx = shuffled_indices(5, &mut rng);
/// idx.sort();
/// assert_eq!(idx, vec![0, 1, 2, 3, 4]);
/// ```
pub fn shuffled_indices<R: Rng>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(rng);
    indices
}

/// Build the pipeline generator: seeded when `seed` is given, from OS
/// entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
