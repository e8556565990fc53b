//! SupervisedDataset - Ordered (input, target) pairs of fixed widths.

use crate::{Result, StackError};

/// A single sample vector.
pub type Sample = Vec<f64>;

/// Ordered collection of (input, target) pairs.
///
/// Every input has length `in_width` and every target `target_width`;
/// `add_sample` rejects anything else.
///
/// # Examples
///
/// ```
/// use stackwise::SupervisedDataset;
///
/// let mut ds = SupervisedDataset::new(2, 1);
/// ds.add_sample(vec![0.0, 1.0], vec![1.0]).unwrap();
/// assert_eq!(ds.len(), 1);
/// assert!(ds.add_sample(vec![0.0], vec![1.0]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisedDataset {
    in_width: usize,
    target_width: usize,
    inputs: Vec<Sample>,
    targets: Vec<Sample>,
}

impl SupervisedDataset {
    pub fn new(in_width: usize, target_width: usize) -> Self {
        Self {
            in_width,
            target_width,
            inputs: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Pair `inputs[i]` with `targets[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::DimensionMismatch`] if the counts differ or any
    /// vector has the wrong width.
    pub fn from_pairs(
        in_width: usize,
        target_width: usize,
        inputs: Vec<Sample>,
        targets: Vec<Sample>,
    ) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(StackError::mismatch(inputs.len(), targets.len()));
        }
        let mut ds = Self::new(in_width, target_width);
        for (input, target) in inputs.into_iter().zip(targets) {
            ds.add_sample(input, target)?;
        }
        Ok(ds)
    }

    pub fn add_sample(&mut self, input: Sample, target: Sample) -> Result<()> {
        if input.len() != self.in_width {
            return Err(StackError::mismatch(self.in_width, input.len()));
        }
        if target.len() != self.target_width {
            return Err(StackError::mismatch(self.target_width, target.len()));
        }
        self.inputs.push(input);
        self.targets.push(target);
        Ok(())
    }

    pub fn in_width(&self) -> usize {
        self.in_width
    }

    pub fn target_width(&self) -> usize {
        self.target_width
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn input(&self, idx: usize) -> &[f64] {
        &self.inputs[idx]
    }

    pub fn target(&self, idx: usize) -> &[f64] {
        &self.targets[idx]
    }

    /// Iterate pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> + '_ {
        self.inputs
            .iter()
            .zip(&self.targets)
            .map(|(i, t)| (i.as_slice(), t.as_slice()))
    }
}
