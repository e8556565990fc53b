//! DenoisingSampler - Masked copies of a stage's dataset.
//!
//! For samples of length `L`, a binary mask holding `round(fraction * L)`
//! zeros and ones elsewhere is shuffled independently for every sample, and
//! the corrupted sample is the elementwise product of mask and sample.
//!
//! # Examples
//!
//! ```
//! use stackwise::DenoisingSampler;
//! use rand::SeedableRng;
//!
//! let sampler = DenoisingSampler::default();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//!
//! let data = vec![vec![1.0; 10], vec![2.0; 10]];
//! let noisy = sampler.corrupt(&data, &mut rng).unwrap();
//!
//! assert_eq!(noisy.len(), 2);
//! assert_eq!(noisy[0].iter().filter(|&&x| x == 0.0).count(), 2);
//! ```

use crate::{Result, Sample, StackError};
use rand::seq::SliceRandom;
use rand::Rng;

/// Produces masked copies of a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenoisingSampler {
    fraction: f64,
}

impl Default for DenoisingSampler {
    fn default() -> Self {
        Self { fraction: 0.2 }
    }
}

impl DenoisingSampler {
    /// Create a sampler zeroing `fraction` of each sample's features.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::InvalidParameter`] unless `0 <= fraction <= 1`.
    pub fn new(fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(StackError::InvalidParameter(format!(
                "corruption fraction must be in [0, 1] (got {})",
                fraction
            )));
        }
        Ok(Self { fraction })
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Number of zeroed features for samples of length `len`.
    ///
    /// Rounds half away from zero.
    pub fn num_zeros(&self, len: usize) -> usize {
        (self.fraction * len as f64).round() as usize
    }

    /// Unshuffled mask: zeros first, then ones.
    pub fn base_mask(&self, len: usize) -> Vec<f64> {
        let zeros = self.num_zeros(len);
        let mut mask = vec![0.0; zeros];
        mask.resize(len, 1.0);
        mask
    }

    /// Corrupt every sample with its own shuffle of the mask.
    ///
    /// The mask length is taken from the first sample.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::DimensionMismatch`] if a sample's length differs
    /// from the first sample's.
    pub fn corrupt<R: Rng>(&self, data: &[Sample], rng: &mut R) -> Result<Vec<Sample>> {
        let Some(first) = data.first() else {
            return Ok(Vec::new());
        };
        let len = first.len();
        let mut mask = self.base_mask(len);

        data.iter()
            .map(|sample| {
                if sample.len() != len {
                    return Err(StackError::mismatch(len, sample.len()));
                }
                mask.shuffle(rng);
                Ok(mask.iter().zip(sample).map(|(m, x)| m * x).collect())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_num_zeros_rounding() {
        let sampler = DenoisingSampler::default();
        assert_eq!(sampler.num_zeros(4), 1); // 0.8
        assert_eq!(sampler.num_zeros(2), 0); // 0.4
        assert_eq!(sampler.num_zeros(10), 2);
        assert_eq!(sampler.num_zeros(0), 0);
    }

    #[test]
    fn test_base_mask() {
        let sampler = DenoisingSampler::new(0.5).unwrap();
        assert_eq!(sampler.base_mask(4), vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_invalid_fraction() {
        assert!(DenoisingSampler::new(-0.1).is_err());
        assert!(DenoisingSampler::new(1.1).is_err());
    }

    #[test]
    fn test_empty_dataset() {
        let mut rng = StdRng::seed_from_u64(0);
        let out = DenoisingSampler::default().corrupt(&[], &mut rng).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_ragged_dataset() {
        let mut rng = StdRng::seed_from_u64(0);
        let data = vec![vec![1.0; 4], vec![1.0; 3]];
        let err = DenoisingSampler::default().corrupt(&data, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            StackError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }
}
