//! Pipeline configuration.
//!
//! This module provides [`LayerSpec`], the validated layer-width sequence, and
//! [`PipelineConfig`], every knob of a pretraining run. Both serialize with
//! serde, so a run can be described in JSON:
//!
//! ```
//! use stackwise::{Activation, PipelineConfig};
//!
//! let json = r#"{
//!     "layers": [4, 2, 1],
//!     "hidden_activation": "TanhLayer",
//!     "final_activation": "Tanh",
//!     "compression_epochs": 50,
//!     "seed": 7
//! }"#;
//! let config = PipelineConfig::from_json(json).unwrap();
//! assert_eq!(config.hidden_activation, Activation::Tanh);
//! assert_eq!(config.layers.widths(), &[4, 2, 1]);
//! assert!(config.bias);
//! ```

use crate::{Activation, Result, StackError, TrainerConfig};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Layer widths `[w0, w1, ..., wk]`.
///
/// `w0..w(k-1)` are encoder widths and `wk` is the classifier output width.
/// At least three widths are required, all positive.
///
/// # Examples
///
/// ```
/// use stackwise::LayerSpec;
///
/// let spec = LayerSpec::new(vec![10, 8, 5, 1]).unwrap();
/// assert_eq!(spec.compression_pairs(), vec![(10, 8), (8, 5)]);
/// assert_eq!(spec.classifier_pair(), (5, 1));
/// assert_eq!(spec.num_stages(), 3);
///
/// assert!(LayerSpec::new(vec![4, 2]).is_err());
/// assert!(LayerSpec::new(vec![4, 0, 1]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct LayerSpec(Vec<usize>);

impl LayerSpec {
    pub fn new(widths: Vec<usize>) -> Result<Self> {
        if widths.len() < 3 {
            return Err(StackError::InvalidParameter(format!(
                "layer spec needs at least 3 widths (got {})",
                widths.len()
            )));
        }
        if let Some(pos) = widths.iter().position(|&w| w == 0) {
            return Err(StackError::InvalidParameter(format!(
                "layer width {} must be positive",
                pos
            )));
        }
        Ok(Self(widths))
    }

    pub fn widths(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a valid spec has at least three widths.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn input_width(&self) -> usize {
        self.0[0]
    }

    pub fn output_width(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    /// `(prior, current)` widths of every compression stage, in order.
    pub fn compression_pairs(&self) -> Vec<(usize, usize)> {
        self.0[..self.0.len() - 1]
            .iter()
            .copied()
            .tuple_windows()
            .collect()
    }

    /// `(last hidden, output)` widths of the classifier stage.
    pub fn classifier_pair(&self) -> (usize, usize) {
        let n = self.0.len();
        (self.0[n - 2], self.0[n - 1])
    }

    /// Compression stages plus the classifier stage.
    pub fn num_stages(&self) -> usize {
        self.0.len() - 1
    }

    /// True when the layer spec describes exactly one compression stage.
    pub fn is_single_compression(&self) -> bool {
        self.0.len() <= 3
    }
}

impl TryFrom<Vec<usize>> for LayerSpec {
    type Error = StackError;

    fn try_from(widths: Vec<usize>) -> Result<Self> {
        Self::new(widths)
    }
}

impl From<LayerSpec> for Vec<usize> {
    fn from(spec: LayerSpec) -> Self {
        spec.0
    }
}

fn default_compression_epochs() -> usize {
    100
}

fn default_smoothing_epochs() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_corruption_fraction() -> f64 {
    0.2
}

/// Complete configuration of a pretraining run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Layer widths, input first, classifier output last
    pub layers: LayerSpec,

    /// Activation of every bottleneck hidden and reconstruction node
    pub hidden_activation: Activation,

    /// Activation of the classifier output node
    pub final_activation: Activation,

    /// Training epochs per stage
    #[serde(default = "default_compression_epochs")]
    pub compression_epochs: usize,

    /// Whole-network fine-tuning epochs (fine-tuning strategy only)
    #[serde(default = "default_smoothing_epochs")]
    pub smoothing_epochs: usize,

    /// Attach bias nodes to hidden and output nodes
    #[serde(default = "default_true")]
    pub bias: bool,

    /// Train bottlenecks on masked inputs
    #[serde(default = "default_true")]
    pub dropout: bool,

    /// Stop assembly at the first hidden node for single-compression specs
    #[serde(default = "default_true")]
    pub autoencoding_only: bool,

    /// Fraction of features zeroed by the denoising mask
    #[serde(default = "default_corruption_fraction")]
    pub corruption_fraction: f64,

    /// Log epoch errors at debug instead of trace level
    #[serde(default)]
    pub verbose: bool,

    /// RNG seed; `None` draws from OS entropy on every fit
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub trainer: TrainerConfig,
}

impl PipelineConfig {
    /// Create a configuration with default epochs, bias, dropout and
    /// autoencoding-only enabled, and no seed.
    pub fn new(layers: LayerSpec, hidden_activation: Activation, final_activation: Activation) -> Self {
        Self {
            layers,
            hidden_activation,
            final_activation,
            compression_epochs: default_compression_epochs(),
            smoothing_epochs: default_smoothing_epochs(),
            bias: true,
            dropout: true,
            autoencoding_only: true,
            corruption_fraction: default_corruption_fraction(),
            verbose: false,
            seed: None,
            trainer: TrainerConfig::default(),
        }
    }

    /// Build from raw widths and activation names.
    ///
    /// # Errors
    ///
    /// - [`StackError::Configuration`] for an unknown activation name
    /// - [`StackError::InvalidParameter`] for an invalid layer spec
    ///
    /// # Examples
    ///
    /// ```
    /// use stackwise::{PipelineConfig, StackError};
    ///
    /// let config = PipelineConfig::from_names(vec![4, 2, 1], "TanhLayer", "TanhLayer", 50, true, true, true);
    /// assert!(config.is_ok());
    ///
    /// let err = PipelineConfig::from_names(vec![4, 2, 1], "ReluLayer", "TanhLayer", 50, true, true, true);
    /// assert!(matches!(err, Err(StackError::Configuration(_))));
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn from_names(
        layers: Vec<usize>,
        hidden_activation: &str,
        final_activation: &str,
        compression_epochs: usize,
        bias: bool,
        dropout: bool,
        autoencoding_only: bool,
    ) -> Result<Self> {
        let hidden = hidden_activation.parse()?;
        let fin = final_activation.parse()?;
        let config = Self::new(LayerSpec::new(layers)?, hidden, fin)
            .with_compression_epochs(compression_epochs)
            .with_bias(bias)
            .with_dropout(dropout)
            .with_autoencoding_only(autoencoding_only);
        config.validate()?;
        Ok(config)
    }

    pub fn with_compression_epochs(mut self, epochs: usize) -> Self {
        self.compression_epochs = epochs;
        self
    }

    pub fn with_smoothing_epochs(mut self, epochs: usize) -> Self {
        self.smoothing_epochs = epochs;
        self
    }

    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_dropout(mut self, dropout: bool) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn with_autoencoding_only(mut self, autoencoding_only: bool) -> Self {
        self.autoencoding_only = autoencoding_only;
        self
    }

    pub fn with_corruption_fraction(mut self, fraction: f64) -> Self {
        self.corruption_fraction = fraction;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_trainer(mut self, trainer: TrainerConfig) -> Self {
        self.trainer = trainer;
        self
    }

    /// Check the values serde and the setters cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.corruption_fraction) {
            return Err(StackError::InvalidParameter(format!(
                "corruption_fraction must be in [0, 1] (got {})",
                self.corruption_fraction
            )));
        }
        self.trainer.validate()
    }

    /// Parse and validate a JSON configuration.
    ///
    /// Activation names and layer widths are resolved before the rest of the
    /// document, so they fail with the same errors as [`Self::from_names`]
    /// rather than as [`StackError::Serialization`].
    pub fn from_json(json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        for key in ["hidden_activation", "final_activation"] {
            if let Some(name) = value.get(key).and_then(serde_json::Value::as_str) {
                let activation: Activation = name.parse()?;
                value[key] = serde_json::Value::from(activation.name());
            }
        }
        if let Some(layers) = value.get("layers") {
            let widths: Vec<usize> = serde_json::from_value(layers.clone())?;
            LayerSpec::new(widths)?;
        }

        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
