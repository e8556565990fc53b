//! Pipeline - Greedy layer-wise pretraining orchestrators.
//!
//! Both strategies drive the same stages in the same order:
//!
//! 1. one bottleneck stage per `(layers[i], layers[i + 1])` pair, each
//!    re-encoding the dataset for the next
//! 2. the classifier stage on the final encoding
//! 3. assembly of every extracted artifact into one network
//!
//! They differ in corruption policy, output boundary, and whether the
//! assembled network is fine-tuned afterwards:
//!
//! | strategy                     | corruption       | boundary        | fine-tune |
//! |------------------------------|------------------|-----------------|-----------|
//! | [`GreedyDenoisingAutoencoder`] | per `dropout`  | per policy      | no        |
//! | [`SimpleStackedEncoder`]     | never            | classifier head | yes       |
//!
//! # Example
//!
//! ```
//! use stackwise::{GreedyDenoisingAutoencoder, PipelineConfig, Pretrainer, Result};
//!
//! # fn main() -> Result<()> {
//! let data = vec![vec![0.0, 0.0, 1.0, 1.0], vec![1.0, 1.0, 0.0, 0.0]];
//! let targets = vec![vec![0.0], vec![1.0]];
//! let config = PipelineConfig::from_names(vec![4, 2, 1], "Tanh", "Tanh", 10, true, true, true)?
//!     .with_seed(42);
//!
//! let mut dae = GreedyDenoisingAutoencoder::new(data, targets, config)?;
//! assert!(dae.predict(&[0.0, 0.0, 1.0, 1.0]).is_err());
//!
//! let encoder = dae.fit()?;
//! assert_eq!(encoder.network().output_nodes().len(), 1);
//! assert_eq!(dae.predict(&[0.0, 0.0, 1.0, 1.0])?.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::report::{FitReport, StageKind, StageReport};
use crate::stage::{Corruption, StageArtifact, StageTrainer};
use crate::utils::make_rng;
use crate::{
    AssembledNetwork, Assembler, BackpropTrainer, DenoisingSampler, Network, NodeArena,
    OutputBoundary, PipelineConfig, Result, Sample, StackError, SupervisedDataset, Trainer,
};
use rand::rngs::StdRng;
use tracing::{info, warn};

/// Common surface of the pretraining strategies.
pub trait Pretrainer {
    /// Run the whole pipeline and return the assembled network.
    ///
    /// Any stage failure aborts the call and leaves the instance untrained.
    fn fit(&mut self) -> Result<AssembledNetwork>;

    /// Map one input vector to the model's output.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotTrained`] before a successful `fit()`.
    fn predict(&self, input: &[f64]) -> Result<Vec<f64>>;

    fn is_trained(&self) -> bool;

    /// Training curves of the last successful `fit()`.
    fn report(&self) -> Option<&FitReport>;

    fn config(&self) -> &PipelineConfig;
}

/// Products of running every stage once.
struct StackRun {
    artifacts: Vec<StageArtifact>,
    prediction_path: Vec<Network>,
    report: FitReport,
}

/// Train every bottleneck stage and then the classifier stage.
#[allow(clippy::too_many_arguments)]
fn run_stages<T: Trainer>(
    strategy: &str,
    config: &PipelineConfig,
    data: &[Sample],
    targets: &[Sample],
    corruption: &Corruption,
    arena: &mut NodeArena,
    trainer: &mut T,
    rng: &mut StdRng,
) -> Result<StackRun> {
    let mut stages = StageTrainer::new(arena, trainer, rng)
        .hidden_activation(config.hidden_activation)
        .final_activation(config.final_activation)
        .epochs(config.compression_epochs)
        .bias(config.bias);

    let mut run = StackRun {
        artifacts: Vec::with_capacity(config.layers.num_stages()),
        prediction_path: Vec::with_capacity(config.layers.num_stages()),
        report: FitReport::new(strategy),
    };

    // Only the current encoding is kept alive between stages
    let mut encoded = data.to_vec();
    for (index, (prior, current)) in config.layers.compression_pairs().into_iter().enumerate() {
        let stage = stages.train_bottleneck(index, prior, current, &encoded, corruption)?;
        debug_assert_eq!(stage.encoded.len(), encoded.len());
        encoded = stage.encoded;
        run.artifacts.push(stage.artifact);
        run.prediction_path.push(stage.compressor.into_network());
        run.report.push(stage.report);
    }

    let (hidden, output) = config.layers.classifier_pair();
    let index = run.artifacts.len();
    let head = stages.train_classifier(index, hidden, output, &encoded, targets)?;
    run.artifacts.push(head.artifact);
    run.prediction_path.push(head.network);
    run.report.push(head.report);

    Ok(run)
}

/// Greedy denoising autoencoder stack.
///
/// Bottlenecks train on masked inputs when `dropout` is set. The assembled
/// network stops at the first hidden node when `autoencoding_only` is set
/// and the layer spec has a single compression stage; otherwise it ends in
/// the classifier head. Prediction replays the per-stage path: each
/// compressor view, then the trained classifier.
pub struct GreedyDenoisingAutoencoder<T: Trainer = BackpropTrainer> {
    data: Vec<Sample>,
    targets: Vec<Sample>,
    config: PipelineConfig,
    trainer: T,
    arena: NodeArena,
    artifacts: Vec<StageArtifact>,
    prediction_path: Vec<Network>,
    report: Option<FitReport>,
}

impl GreedyDenoisingAutoencoder<BackpropTrainer> {
    /// Create an untrained pipeline using [`BackpropTrainer`] with the
    /// configured hyperparameters.
    pub fn new(data: Vec<Sample>, targets: Vec<Sample>, config: PipelineConfig) -> Result<Self> {
        let trainer = BackpropTrainer::new(config.trainer, config.verbose);
        Self::with_trainer(data, targets, config, trainer)
    }
}

impl<T: Trainer> GreedyDenoisingAutoencoder<T> {
    /// Create an untrained pipeline driven by a custom trainer.
    pub fn with_trainer(
        data: Vec<Sample>,
        targets: Vec<Sample>,
        config: PipelineConfig,
        trainer: T,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            data,
            targets,
            config,
            trainer,
            arena: NodeArena::new(),
            artifacts: Vec::new(),
            prediction_path: Vec::new(),
            report: None,
        })
    }

    /// Stage artifacts of the last successful fit, in stage order.
    pub fn artifacts(&self) -> &[StageArtifact] {
        &self.artifacts
    }

    /// Compressor views followed by the classifier network.
    pub fn prediction_path(&self) -> &[Network] {
        &self.prediction_path
    }

    /// Node arena of the last fit.
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn reset(&mut self) {
        self.arena.clear();
        self.artifacts.clear();
        self.prediction_path.clear();
        self.report = None;
    }
}

impl<T: Trainer> Pretrainer for GreedyDenoisingAutoencoder<T> {
    fn fit(&mut self) -> Result<AssembledNetwork> {
        self.reset();
        let mut rng = make_rng(self.config.seed);
        let corruption = if self.config.dropout {
            Corruption::Masking(DenoisingSampler::new(self.config.corruption_fraction)?)
        } else {
            Corruption::Identity
        };
        info!(layers = ?self.config.layers.widths(), dropout = self.config.dropout, "fitting greedy denoising autoencoder");

        let run = run_stages(
            "greedy_denoising_autoencoder",
            &self.config,
            &self.data,
            &self.targets,
            &corruption,
            &mut self.arena,
            &mut self.trainer,
            &mut rng,
        )?;

        let boundary = OutputBoundary::resolve(self.config.autoencoding_only, &self.config.layers);
        let assembled = Assembler::new(boundary).assemble(&run.artifacts)?;

        self.artifacts = run.artifacts;
        self.prediction_path = run.prediction_path;
        self.report = Some(run.report);
        info!(
            boundary = ?boundary,
            nodes = assembled.num_nodes(),
            connections = assembled.num_connections(),
            "fit complete"
        );
        Ok(assembled)
    }

    fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        if self.prediction_path.is_empty() {
            return Err(StackError::NotTrained);
        }
        let mut data = input.to_vec();
        for network in &self.prediction_path {
            data = network.activate(&data)?;
        }
        Ok(data)
    }

    fn is_trained(&self) -> bool {
        !self.prediction_path.is_empty()
    }

    fn report(&self) -> Option<&FitReport> {
        self.report.as_ref()
    }

    fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

/// Plain stacked encoder with whole-network fine-tuning.
///
/// Bottlenecks train on identity pairs regardless of `dropout`, assembly
/// always ends in the classifier head, and the assembled network is then
/// trained end to end on `(data, targets)` for `smoothing_epochs` epochs.
/// Prediction runs the fine-tuned assembled network.
pub struct SimpleStackedEncoder<T: Trainer = BackpropTrainer> {
    data: Vec<Sample>,
    targets: Vec<Sample>,
    config: PipelineConfig,
    trainer: T,
    arena: NodeArena,
    network: Option<AssembledNetwork>,
    report: Option<FitReport>,
}

impl SimpleStackedEncoder<BackpropTrainer> {
    pub fn new(data: Vec<Sample>, targets: Vec<Sample>, config: PipelineConfig) -> Result<Self> {
        let trainer = BackpropTrainer::new(config.trainer, config.verbose);
        Self::with_trainer(data, targets, config, trainer)
    }
}

impl<T: Trainer> SimpleStackedEncoder<T> {
    pub fn with_trainer(
        data: Vec<Sample>,
        targets: Vec<Sample>,
        config: PipelineConfig,
        trainer: T,
    ) -> Result<Self> {
        config.validate()?;
        if config.dropout {
            warn!("SimpleStackedEncoder ignores dropout; bottlenecks train on identity pairs");
        }
        Ok(Self {
            data,
            targets,
            config,
            trainer,
            arena: NodeArena::new(),
            network: None,
            report: None,
        })
    }

    /// The fine-tuned network of the last successful fit.
    pub fn network(&self) -> Option<&AssembledNetwork> {
        self.network.as_ref()
    }
}

impl<T: Trainer> Pretrainer for SimpleStackedEncoder<T> {
    fn fit(&mut self) -> Result<AssembledNetwork> {
        self.arena.clear();
        self.network = None;
        self.report = None;
        let mut rng = make_rng(self.config.seed);
        info!(layers = ?self.config.layers.widths(), "fitting simple stacked encoder");

        let mut run = run_stages(
            "simple_stacked_encoder",
            &self.config,
            &self.data,
            &self.targets,
            &Corruption::Identity,
            &mut self.arena,
            &mut self.trainer,
            &mut rng,
        )?;

        let mut assembled = Assembler::new(OutputBoundary::Classifier).assemble(&run.artifacts)?;

        let layers = &self.config.layers;
        let dataset = SupervisedDataset::from_pairs(
            layers.input_width(),
            layers.output_width(),
            self.data.clone(),
            self.targets.clone(),
        )?;
        info!(epochs = self.config.smoothing_epochs, "fine-tuning assembled network");
        let epoch_errors = self.trainer.train_epochs(
            assembled.network_mut(),
            &dataset,
            self.config.smoothing_epochs,
            &mut rng,
        )?;
        run.report.push(StageReport {
            index: run.artifacts.len(),
            kind: StageKind::FineTune,
            in_width: layers.input_width(),
            out_width: layers.output_width(),
            epoch_errors,
        });

        self.network = Some(assembled.clone());
        self.report = Some(run.report);
        Ok(assembled)
    }

    fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.network
            .as_ref()
            .ok_or(StackError::NotTrained)?
            .activate(input)
    }

    fn is_trained(&self) -> bool {
        self.network.is_some()
    }

    fn report(&self) -> Option<&FitReport> {
        self.report.as_ref()
    }

    fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
