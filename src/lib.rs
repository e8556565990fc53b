//! Stackwise - Greedy Layer-wise Pretraining of Denoising Autoencoders
//!
//! Stackwise trains a deep classifier by pretraining one denoising
//! autoencoder per layer, transplanting each layer's learned encoder weights
//! into a single assembled feed-forward network, and training a classifier
//! head on top of the final encoding.
//!
//! # Architecture
//!
//! The crate is built around a small set of components, leaves first:
//!
//! - **Config**: [`LayerSpec`], [`PipelineConfig`] and the closed
//!   [`Activation`] set, validated at construction
//! - **DenoisingSampler**: masked copies of a stage's dataset
//! - **Stage trainers**: [`StageTrainer`] builds, trains and strips one
//!   bottleneck or classifier stage into a [`StageArtifact`]
//! - **Assembler**: stitches artifacts into an [`AssembledNetwork`], with an
//!   [`OutputBoundary`] policy for where the output falls
//! - **Pipelines**: [`GreedyDenoisingAutoencoder`] and
//!   [`SimpleStackedEncoder`] behind the [`Pretrainer`] trait
//!
//! Underneath sits a minimal numerical layer: a [`NodeArena`] handing out
//! stable node identities, dense [`Connection`]s, the [`Network`] container
//! with its topological ordering pass, and the [`Trainer`] seam implemented
//! by [`BackpropTrainer`].
//!
//! # Examples
//!
//! ```
//! use stackwise::{GreedyDenoisingAutoencoder, PipelineConfig, Pretrainer, Result};
//!
//! # fn main() -> Result<()> {
//! let data = vec![
//!     vec![0.0, 0.0, 1.0, 1.0],
//!     vec![0.0, 0.0, 1.0, 0.9],
//!     vec![0.8, 1.0, 0.0, 0.0],
//!     vec![1.0, 0.9, 0.0, 0.2],
//! ];
//! let targets = vec![vec![0.0], vec![0.0], vec![1.0], vec![1.0]];
//!
//! let config = PipelineConfig::from_names(vec![4, 3, 2, 1], "Sigmoid", "Sigmoid", 20, true, true, false)?
//!     .with_seed(7);
//! let mut dae = GreedyDenoisingAutoencoder::new(data, targets, config)?;
//!
//! let net = dae.fit()?;
//! let y = net.activate(&[0.0, 0.0, 1.0, 1.0])?;
//! assert_eq!(y.len(), 1);
//! assert!(y[0] > 0.0 && y[0] < 1.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Randomness
//!
//! Mask shuffling, weight initialization and sample order all draw from one
//! `StdRng` per `fit()`, seeded from [`PipelineConfig::seed`] when set. Two
//! fits with the same seed, data and configuration are identical.

// Module declarations
pub mod activation;
pub mod connection;
pub mod dataset;
pub mod error;
pub mod network;
pub mod node;
pub mod trainer;
pub mod utils;

// Pipeline
pub mod assembler;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod sampler;
pub mod stage;

// Re-exports for convenient access
pub use activation::Activation;
pub use connection::Connection;
pub use dataset::{Sample, SupervisedDataset};
pub use error::{Result, StackError};
pub use network::{Network, NodeRole, SampleGradient};
pub use node::{Node, NodeArena, NodeId, NodeKind};
pub use trainer::{BackpropTrainer, Trainer, TrainerConfig};

pub use assembler::{AssembledNetwork, Assembler, OutputBoundary};
pub use config::{LayerSpec, PipelineConfig};
pub use pipeline::{GreedyDenoisingAutoencoder, Pretrainer, SimpleStackedEncoder};
pub use report::{FitReport, StageKind, StageReport};
pub use sampler::DenoisingSampler;
pub use stage::{
    BiasArtifact, BottleneckOutcome, ClassifierOutcome, CompressorView, Corruption, StageArtifact,
    StageTrainer,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Framework name
pub const NAME: &str = "Stackwise";

/// Get version string
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(ver.contains("Stackwise"));
        assert!(ver.contains("1.0.0"));
    }
}
