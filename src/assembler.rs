//! Assembler - Stitch stage artifacts into one deep network.
//!
//! The assembled network reuses the node identities captured during stage
//! training, so consecutive stages share endpoints: stage `i`'s hidden node
//! is the source of stage `i + 1`'s transplanted connection. Weights are
//! always copied into fresh connections, never shared with the artifacts.
//!
//! # Output boundary
//!
//! | `autoencoding_only` | layer spec length | output node                    |
//! |---------------------|-------------------|--------------------------------|
//! | true                | <= 3              | stage 0 hidden (pure encoder)  |
//! | true                | > 3               | classifier node                |
//! | false               | any               | classifier node                |

use crate::stage::StageArtifact;
use crate::{Connection, LayerSpec, Network, Node, Result, StackError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where the assembled network's single output node sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputBoundary {
    /// Stop after stage 0; its hidden node is the output
    Encoder,
    /// Continue through every stage and attach the classifier head
    Classifier,
}

impl OutputBoundary {
    /// Apply the boundary policy to a configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackwise::{LayerSpec, OutputBoundary};
    ///
    /// let short = LayerSpec::new(vec![4, 2, 1]).unwrap();
    /// let long = LayerSpec::new(vec![6, 4, 2, 1]).unwrap();
    /// assert_eq!(OutputBoundary::resolve(true, &short), OutputBoundary::Encoder);
    /// assert_eq!(OutputBoundary::resolve(true, &long), OutputBoundary::Classifier);
    /// assert_eq!(OutputBoundary::resolve(false, &short), OutputBoundary::Classifier);
    /// ```
    pub fn resolve(autoencoding_only: bool, layers: &LayerSpec) -> Self {
        if autoencoding_only && layers.is_single_compression() {
            OutputBoundary::Encoder
        } else {
            OutputBoundary::Classifier
        }
    }
}

/// The final deep network, with exactly one output node.
#[derive(Debug, Clone)]
pub struct AssembledNetwork {
    network: Network,
    boundary: OutputBoundary,
    /// Hidden node of the most recently wired stage
    frontier: Node,
    /// Number of stages transplanted so far
    stages: usize,
}

impl AssembledNetwork {
    /// Extend a pure encoder with the classifier head: the encoder output
    /// becomes interior, the head is wired from it with copied weights and
    /// bias, and its node becomes the sole output. Re-sorts the network.
    ///
    /// # Errors
    ///
    /// - [`StackError::InvalidParameter`] if a head is already attached
    /// - [`StackError::DimensionMismatch`] if the head's input width does not
    ///   match the current output width
    pub fn attach_classifier_head(&mut self, head: &StageArtifact) -> Result<()> {
        if self.boundary == OutputBoundary::Classifier {
            return Err(StackError::InvalidParameter(
                "classifier head already attached".into(),
            ));
        }
        self.network.add_node(self.frontier);
        self.attach_head_unchecked(head)?;
        self.boundary = OutputBoundary::Classifier;
        Ok(())
    }

    pub fn activate(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.network.activate(input)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub(crate) fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    pub fn boundary(&self) -> OutputBoundary {
        self.boundary
    }

    /// The single output node.
    pub fn output_node(&self) -> Node {
        self.frontier
    }

    /// Number of stages whose weights were transplanted.
    pub fn num_stages(&self) -> usize {
        self.stages
    }

    pub fn num_nodes(&self) -> usize {
        self.network.num_nodes()
    }

    pub fn num_connections(&self) -> usize {
        self.network.num_connections()
    }
}

/// Copy `artifact`'s weights onto `source -> artifact.hidden`, plus its bias
/// node and bias weights.
fn transplant(network: &mut Network, source: Node, artifact: &StageArtifact) -> Result<()> {
    if source.width != artifact.in_width() {
        return Err(StackError::mismatch(source.width, artifact.in_width()));
    }
    network.add_connection(Connection::with_params(
        &source,
        &artifact.hidden,
        artifact.weights.params(),
    )?);
    if let Some(bias) = &artifact.bias {
        network.add_node(bias.node);
        network.add_connection(Connection::with_params(
            &bias.node,
            &artifact.hidden,
            bias.connection.params(),
        )?);
    }
    Ok(())
}

/// Builds an [`AssembledNetwork`] from stage-ordered artifacts.
///
/// # Examples
///
/// ```
/// use stackwise::{Assembler, GreedyDenoisingAutoencoder, OutputBoundary, PipelineConfig, Pretrainer};
///
/// # fn main() -> stackwise::Result<()> {
/// let config = PipelineConfig::from_names(vec![3, 2, 1], "Sigmoid", "Sigmoid", 3, true, false, false)?
///     .with_seed(1);
/// let data = vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 1.0]];
/// let targets = vec![vec![0.0], vec![1.0]];
///
/// let mut dae = GreedyDenoisingAutoencoder::new(data, targets, config)?;
/// dae.fit()?;
///
/// // Re-assemble the same artifacts as a pure encoder
/// let encoder = Assembler::new(OutputBoundary::Encoder).assemble(dae.artifacts())?;
/// assert_eq!(encoder.output_node(), dae.artifacts()[0].hidden);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Assembler {
    boundary: OutputBoundary,
}

impl Assembler {
    pub fn new(boundary: OutputBoundary) -> Self {
        Self { boundary }
    }

    /// Assemble `artifacts`: compression stages in order, the classifier
    /// stage last.
    ///
    /// # Errors
    ///
    /// - [`StackError::InvalidParameter`] if there are too few artifacts for
    ///   the boundary (one for an encoder, two otherwise)
    /// - [`StackError::DimensionMismatch`] if consecutive stages do not chain
    pub fn assemble(&self, artifacts: &[StageArtifact]) -> Result<AssembledNetwork> {
        let needed = match self.boundary {
            OutputBoundary::Encoder => 1,
            OutputBoundary::Classifier => 2,
        };
        if artifacts.len() < needed {
            return Err(StackError::InvalidParameter(format!(
                "{:?} assembly needs at least {} stage artifacts (got {})",
                self.boundary,
                needed,
                artifacts.len()
            )));
        }

        let first = &artifacts[0];
        let mut network = Network::new();
        network.add_input_node(first.input);
        match self.boundary {
            OutputBoundary::Encoder => network.add_output_node(first.hidden),
            OutputBoundary::Classifier => network.add_node(first.hidden),
        }
        transplant(&mut network, first.input, first)?;

        let mut assembled = AssembledNetwork {
            network,
            boundary: self.boundary,
            frontier: first.hidden,
            stages: 1,
        };

        if self.boundary == OutputBoundary::Encoder {
            assembled.network.sort()?;
            debug!(nodes = assembled.num_nodes(), "assembled pure encoder");
            return Ok(assembled);
        }

        let (head, interior) = artifacts[1..]
            .split_last()
            .ok_or_else(|| StackError::InvalidParameter("missing classifier artifact".into()))?;
        for artifact in interior {
            assembled.network.add_node(artifact.hidden);
            transplant(&mut assembled.network, assembled.frontier, artifact)?;
            assembled.frontier = artifact.hidden;
            assembled.stages += 1;
        }

        // No output node until the head is attached, so the first sort
        // happens there
        assembled.attach_head_unchecked(head)?;
        debug!(
            nodes = assembled.num_nodes(),
            connections = assembled.num_connections(),
            "assembled network with classifier head"
        );
        Ok(assembled)
    }
}

impl AssembledNetwork {
    fn attach_head_unchecked(&mut self, head: &StageArtifact) -> Result<()> {
        self.network.add_output_node(head.hidden);
        transplant(&mut self.network, self.frontier, head)?;
        self.frontier = head.hidden;
        self.stages += 1;
        self.network.sort()
    }
}
