//! Error types for the Stackwise pipeline.
//!
//! This module provides a unified error type for configuration, network
//! construction, training and prediction, using the `thiserror` crate for
//! ergonomic error handling.

use crate::node::NodeId;
use thiserror::Error;

/// The main error type for Stackwise operations.
///
/// Dimension mismatches are raised by the network collaborator (connection
/// construction, forward and backward passes) and propagated unmodified
/// through the stage trainers and the orchestrator.
#[derive(Error, Debug)]
pub enum StackError {
    /// Unrecognized activation name or otherwise unusable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Prediction requested before a successful fit
    #[error("Pipeline not trained - call fit() before predict()")]
    NotTrained,

    /// Vector or parameter length does not match the declared width
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length received
        actual: usize,
    },

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Network evaluated before its topological ordering pass
    #[error("Network not sorted - call sort() before activate()")]
    NotSorted,

    /// Connection graph contains a cycle
    #[error("Cycle detected in network connection graph")]
    Cycle,

    /// A connection or role refers to a node the network does not hold
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Serialization error occurred
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StackError {
    /// Shorthand for a [`StackError::DimensionMismatch`].
    pub(crate) fn mismatch(expected: usize, actual: usize) -> Self {
        StackError::DimensionMismatch { expected, actual }
    }
}

/// A specialized `Result` type for Stackwise operations.
pub type Result<T> = std::result::Result<T, StackError>;
