//! Connection - Dense weights between two nodes.
//!
//! Parameters are stored as one flat vector of length `in_width * out_width`
//! in row-major `[out][in]` order, so `params[o * in_width + i]` is the weight
//! from input unit `i` to output unit `o`.

use crate::{Node, NodeId, Result, StackError};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Dense connection from one node to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    from: NodeId,
    to: NodeId,
    in_width: usize,
    out_width: usize,
    params: Vec<f64>,
}

impl Connection {
    /// Create a connection with all weights zero.
    pub fn zeros(from: &Node, to: &Node) -> Self {
        Self {
            from: from.id,
            to: to.id,
            in_width: from.width,
            out_width: to.width,
            params: vec![0.0; from.width * to.width],
        }
    }

    /// Create a connection with weights drawn from a standard normal.
    pub fn random<R: Rng>(from: &Node, to: &Node, rng: &mut R) -> Self {
        let mut conn = Self::zeros(from, to);
        for p in &mut conn.params {
            *p = rng.sample(StandardNormal);
        }
        conn
    }

    /// Create a connection holding a copy of `params`.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::DimensionMismatch`] if `params.len()` differs from
    /// `from.width * to.width`.
    pub fn with_params(from: &Node, to: &Node, params: &[f64]) -> Result<Self> {
        let mut conn = Self::zeros(from, to);
        conn.set_params(params)?;
        Ok(conn)
    }

    #[inline]
    pub fn from(&self) -> NodeId {
        self.from
    }

    #[inline]
    pub fn to(&self) -> NodeId {
        self.to
    }

    #[inline]
    pub fn in_width(&self) -> usize {
        self.in_width
    }

    #[inline]
    pub fn out_width(&self) -> usize {
        self.out_width
    }

    #[inline]
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    #[inline]
    pub fn params_mut(&mut self) -> &mut [f64] {
        &mut self.params
    }

    /// Overwrite all weights with a copy of `params`.
    pub fn set_params(&mut self, params: &[f64]) -> Result<()> {
        if params.len() != self.params.len() {
            return Err(StackError::mismatch(self.params.len(), params.len()));
        }
        self.params.copy_from_slice(params);
        Ok(())
    }

    /// Accumulate `W · input` into `out`.
    pub fn forward(&self, input: &[f64], out: &mut [f64]) {
        debug_assert_eq!(input.len(), self.in_width);
        debug_assert_eq!(out.len(), self.out_width);
        for (o, row) in out.iter_mut().zip(self.params.chunks_exact(self.in_width)) {
            *o += row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>();
        }
    }

    /// Accumulate `Wᵀ · out_err` into `in_err` and the weight derivatives
    /// `out_err ⊗ input` into `derivs`.
    pub fn backward(&self, input: &[f64], out_err: &[f64], in_err: &mut [f64], derivs: &mut [f64]) {
        debug_assert_eq!(derivs.len(), self.params.len());
        for (o, &e) in out_err.iter().enumerate() {
            let row = o * self.in_width;
            for i in 0..self.in_width {
                in_err[i] += self.params[row + i] * e;
                derivs[row + i] += e * input[i];
            }
        }
    }
}
