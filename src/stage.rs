//! Stage trainers - Build, train and strip one stage of the stack.
//!
//! A bottleneck stage trains a transient `prior -> current -> prior`
//! reconstruction network, keeps only its encoder half as a
//! [`StageArtifact`], and re-encodes the stage's dataset through a
//! [`CompressorView`]. The classifier stage trains the terminal supervised
//! head on the last encoding.
//!
//! # Examples
//!
//! ```
//! use stackwise::{Activation, BackpropTrainer, Corruption, NodeArena, StageTrainer};
//! use rand::SeedableRng;
//!
//! # fn main() -> stackwise::Result<()> {
//! let mut arena = NodeArena::new();
//! let mut trainer = BackpropTrainer::default();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let mut stages = StageTrainer::new(&mut arena, &mut trainer, &mut rng)
//!     .hidden_activation(Activation::Sigmoid)
//!     .epochs(5);
//!
//! let data = vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 1.0]];
//! let stage = stages.train_bottleneck(0, 3, 2, &data, &Corruption::Identity)?;
//!
//! assert_eq!(stage.artifact.weights.params().len(), 3 * 2);
//! assert_eq!(stage.encoded.len(), 2);
//! assert_eq!(stage.encoded[0].len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::report::{StageKind, StageReport};
use crate::{
    Activation, Connection, DenoisingSampler, Network, Node, NodeArena, NodeId, Result, Sample,
    StackError, SupervisedDataset, Trainer,
};
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Trained bias node and its bias -> hidden weights.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasArtifact {
    pub node: Node,
    pub connection: Connection,
}

/// Everything kept from a trained stage.
///
/// `input` and `hidden` are the very nodes the stage was trained with; the
/// assembler reuses their identities when it stitches stages together.
#[derive(Debug, Clone, PartialEq)]
pub struct StageArtifact {
    pub input: Node,
    pub hidden: Node,
    /// Trained input -> hidden weights, `input.width * hidden.width` long
    pub weights: Connection,
    pub bias: Option<BiasArtifact>,
}

impl StageArtifact {
    /// Copy the `input -> hidden` (and `bias -> hidden`) connections out of a
    /// trained network.
    fn extract(network: &Network, input: Node, hidden: Node, bias: Option<Node>) -> Result<Self> {
        let weights = find_connection(network, input.id, hidden.id)?;
        let expected = input.width * hidden.width;
        if weights.params().len() != expected {
            return Err(StackError::mismatch(expected, weights.params().len()));
        }
        let bias = match bias {
            Some(node) => Some(BiasArtifact {
                node,
                connection: find_connection(network, node.id, hidden.id)?,
            }),
            None => None,
        };
        Ok(Self {
            input,
            hidden,
            weights,
            bias,
        })
    }

    pub fn in_width(&self) -> usize {
        self.input.width
    }

    pub fn hidden_width(&self) -> usize {
        self.hidden.width
    }
}

fn find_connection(network: &Network, from: NodeId, to: NodeId) -> Result<Connection> {
    network
        .connections()
        .iter()
        .find(|c| c.from() == from && c.to() == to)
        .cloned()
        .ok_or(StackError::UnknownNode(to))
}

/// Minimal runnable encoder of one stage: input node, hidden node, and the
/// trained connection between them (plus the trained bias, when present).
#[derive(Debug, Clone)]
pub struct CompressorView {
    network: Network,
}

impl CompressorView {
    pub fn new(artifact: &StageArtifact) -> Result<Self> {
        let mut network = Network::new();
        network.add_input_node(artifact.input);
        network.add_output_node(artifact.hidden);
        network.add_connection(artifact.weights.clone());
        if let Some(bias) = &artifact.bias {
            network.add_node(bias.node);
            network.add_connection(bias.connection.clone());
        }
        network.sort()?;
        Ok(Self { network })
    }

    pub fn activate(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.network.activate(input)
    }

    /// Encode every sample, preserving order and count.
    pub fn compress(&self, data: &[Sample]) -> Result<Vec<Sample>> {
        data.iter().map(|d| self.network.activate(d)).collect()
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }
}

/// How a bottleneck stage derives its training inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Corruption {
    /// Train on `(sample, sample)`
    Identity,
    /// Train on `(masked sample, sample)`
    Masking(DenoisingSampler),
}

impl Corruption {
    pub fn apply(&self, data: &[Sample], rng: &mut StdRng) -> Result<Vec<Sample>> {
        match self {
            Corruption::Identity => Ok(data.to_vec()),
            Corruption::Masking(sampler) => sampler.corrupt(data, rng),
        }
    }
}

/// Result of one bottleneck stage.
#[derive(Debug, Clone)]
pub struct BottleneckOutcome {
    pub artifact: StageArtifact,
    pub compressor: CompressorView,
    /// The stage's dataset re-encoded into `current` dimensions
    pub encoded: Vec<Sample>,
    pub report: StageReport,
}

/// Result of the classifier stage.
#[derive(Debug, Clone)]
pub struct ClassifierOutcome {
    pub artifact: StageArtifact,
    /// The trained classifier network itself
    pub network: Network,
    pub report: StageReport,
}

/// Builds and trains stage networks from one arena, trainer and RNG.
pub struct StageTrainer<'a, T: Trainer> {
    arena: &'a mut NodeArena,
    trainer: &'a mut T,
    rng: &'a mut StdRng,
    hidden_activation: Activation,
    final_activation: Activation,
    epochs: usize,
    bias: bool,
}

impl<'a, T: Trainer> StageTrainer<'a, T> {
    /// Create a stage trainer with Sigmoid activations, 100 epochs and bias.
    pub fn new(arena: &'a mut NodeArena, trainer: &'a mut T, rng: &'a mut StdRng) -> Self {
        Self {
            arena,
            trainer,
            rng,
            hidden_activation: Activation::Sigmoid,
            final_activation: Activation::Sigmoid,
            epochs: 100,
            bias: true,
        }
    }

    pub fn hidden_activation(mut self, activation: Activation) -> Self {
        self.hidden_activation = activation;
        self
    }

    pub fn final_activation(mut self, activation: Activation) -> Self {
        self.final_activation = activation;
        self
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    /// Train the `prior -> current -> prior` bottleneck of stage `index` on
    /// `data` and re-encode `data` through its encoder half.
    pub fn train_bottleneck(
        &mut self,
        index: usize,
        prior: usize,
        current: usize,
        data: &[Sample],
        corruption: &Corruption,
    ) -> Result<BottleneckOutcome> {
        info!(stage = index, prior, current, samples = data.len(), "training bottleneck stage");

        let input = self.arena.activation(Activation::Linear, prior);
        let hidden = self.arena.activation(self.hidden_activation, current);
        let output = self.arena.activation(self.hidden_activation, prior);

        let mut network = Network::new();
        network.add_input_node(input);
        network.add_node(hidden);
        network.add_output_node(output);
        network.add_connection(Connection::random(&input, &hidden, self.rng));
        network.add_connection(Connection::random(&hidden, &output, self.rng));

        // Two independent bias nodes, one per layer
        let hidden_bias = if self.bias {
            let to_hidden = self.arena.bias();
            let to_output = self.arena.bias();
            network.add_node(to_hidden);
            network.add_node(to_output);
            network.add_connection(Connection::random(&to_hidden, &hidden, self.rng));
            network.add_connection(Connection::random(&to_output, &output, self.rng));
            Some(to_hidden)
        } else {
            None
        };
        network.sort()?;

        let inputs = corruption.apply(data, self.rng)?;
        let dataset = SupervisedDataset::from_pairs(prior, prior, inputs, data.to_vec())?;
        let epoch_errors = self
            .trainer
            .train_epochs(&mut network, &dataset, self.epochs, self.rng)?;

        // The hidden -> output half only existed to force a reconstructable code
        let artifact = StageArtifact::extract(&network, input, hidden, hidden_bias)?;
        let compressor = CompressorView::new(&artifact)?;
        let encoded = compressor.compress(data)?;
        debug!(stage = index, final_error = ?epoch_errors.last(), "bottleneck stage trained");

        Ok(BottleneckOutcome {
            artifact,
            compressor,
            encoded,
            report: StageReport {
                index,
                kind: StageKind::Bottleneck,
                in_width: prior,
                out_width: current,
                epoch_errors,
            },
        })
    }

    /// Train the `hidden -> output` classifier head of stage `index` on
    /// `(data[i], targets[i])` pairs.
    pub fn train_classifier(
        &mut self,
        index: usize,
        hidden: usize,
        output: usize,
        data: &[Sample],
        targets: &[Sample],
    ) -> Result<ClassifierOutcome> {
        info!(stage = index, hidden, output, samples = data.len(), "training classifier stage");

        let input = self.arena.activation(Activation::Linear, hidden);
        let out = self.arena.activation(self.final_activation, output);

        let mut network = Network::new();
        network.add_input_node(input);
        network.add_output_node(out);
        network.add_connection(Connection::random(&input, &out, self.rng));

        let bias = if self.bias {
            let node = self.arena.bias();
            network.add_node(node);
            network.add_connection(Connection::random(&node, &out, self.rng));
            Some(node)
        } else {
            None
        };
        network.sort()?;

        let dataset =
            SupervisedDataset::from_pairs(hidden, output, data.to_vec(), targets.to_vec())?;
        let epoch_errors = self
            .trainer
            .train_epochs(&mut network, &dataset, self.epochs, self.rng)?;

        let artifact = StageArtifact::extract(&network, input, out, bias)?;
        debug!(stage = index, final_error = ?epoch_errors.last(), "classifier stage trained");

        Ok(ClassifierOutcome {
            artifact,
            network,
            report: StageReport {
                index,
                kind: StageKind::Classifier,
                in_width: hidden,
                out_width: output,
                epoch_errors,
            },
        })
    }
}
