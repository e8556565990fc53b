//! Activation - Closed set of node transfer functions.
//!
//! Activation names are resolved once, when a configuration is built. Unknown
//! names fail immediately with [`StackError::Configuration`].
//!
//! # Examples
//!
//! ```
//! use stackwise::Activation;
//!
//! let act: Activation = "TanhLayer".parse().unwrap();
//! assert_eq!(act, Activation::Tanh);
//! assert!("Relu".parse::<Activation>().is_err());
//! ```

use crate::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transfer function applied by an activation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Activation {
    Linear,
    Sigmoid,
    Tanh,
    Softmax,
}

impl Activation {
    /// All recognized activations.
    pub const ALL: [Activation; 4] = [
        Activation::Linear,
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::Softmax,
    ];

    /// Canonical name of the activation.
    pub fn name(self) -> &'static str {
        match self {
            Activation::Linear => "Linear",
            Activation::Sigmoid => "Sigmoid",
            Activation::Tanh => "Tanh",
            Activation::Softmax => "Softmax",
        }
    }

    /// Apply the activation to a net input vector, writing into `out`.
    ///
    /// Softmax is computed over the whole vector; the other activations are
    /// elementwise.
    pub fn forward(self, net: &[f64], out: &mut [f64]) {
        debug_assert_eq!(net.len(), out.len());
        match self {
            Activation::Linear => out.copy_from_slice(net),
            Activation::Sigmoid => {
                for (o, &x) in out.iter_mut().zip(net) {
                    *o = 1.0 / (1.0 + (-x).exp());
                }
            }
            Activation::Tanh => {
                for (o, &x) in out.iter_mut().zip(net) {
                    *o = x.tanh();
                }
            }
            Activation::Softmax => {
                let max = net.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mut sum = 0.0;
                for (o, &x) in out.iter_mut().zip(net) {
                    *o = (x - max).exp();
                    sum += *o;
                }
                if sum > 0.0 {
                    for o in out.iter_mut() {
                        *o /= sum;
                    }
                }
            }
        }
    }

    /// Map the error at a node's output back to its net input.
    ///
    /// `out` is the node's forward output. Softmax passes the error through
    /// unchanged, which pairs it with a cross-entropy style error signal.
    pub fn backward(self, out: &[f64], out_err: &[f64], in_err: &mut [f64]) {
        debug_assert_eq!(out.len(), out_err.len());
        match self {
            Activation::Linear | Activation::Softmax => in_err.copy_from_slice(out_err),
            Activation::Sigmoid => {
                for ((ie, &y), &e) in in_err.iter_mut().zip(out).zip(out_err) {
                    *ie = y * (1.0 - y) * e;
                }
            }
            Activation::Tanh => {
                for ((ie, &y), &e) in in_err.iter_mut().zip(out).zip(out_err) {
                    *ie = (1.0 - y * y) * e;
                }
            }
        }
    }

    /// Closed output range of the activation, if bounded.
    pub fn output_range(self) -> Option<(f64, f64)> {
        match self {
            Activation::Linear => None,
            Activation::Sigmoid | Activation::Softmax => Some((0.0, 1.0)),
            Activation::Tanh => Some((-1.0, 1.0)),
        }
    }
}

impl FromStr for Activation {
    type Err = StackError;

    /// Accepts `Linear`, `Sigmoid`, `Tanh` and `Softmax`, case-insensitive,
    /// optionally suffixed with `Layer`.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let base = lower.strip_suffix("layer").unwrap_or(lower.as_str());
        match base {
            "linear" => Ok(Activation::Linear),
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "softmax" => Ok(Activation::Softmax),
            _ => Err(StackError::Configuration(format!(
                "activation must be one of Linear, Sigmoid, Tanh or Softmax (got '{}')",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Activation {
    type Error = StackError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Activation> for String {
    fn from(act: Activation) -> Self {
        act.name().to_string()
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
