//! Trainer - Gradient descent over a network's connection weights.
//!
//! [`Trainer`] is the seam between the pipeline and the numerical training
//! loop. [`BackpropTrainer`] implements it with online (per-sample) gradient
//! descent on the squared error, with momentum and weight decay:
//!
//! ```text
//! step     = learning_rate * (derivs - weight_decay * params)
//! velocity = momentum * velocity + step
//! params  += velocity
//! ```
//!
//! Samples are visited in a fresh random order every epoch.

use crate::utils::shuffled_indices;
use crate::{Network, Result, StackError, SupervisedDataset};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Hyperparameters of the gradient descent loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub learning_rate: f64,
    pub momentum: f64,
    pub weight_decay: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            momentum: 0.1,
            weight_decay: 0.01,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0) {
            return Err(StackError::InvalidParameter(format!(
                "learning_rate must be positive (got {})",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(StackError::InvalidParameter(format!(
                "momentum must be in [0, 1) (got {})",
                self.momentum
            )));
        }
        if !(self.weight_decay >= 0.0) {
            return Err(StackError::InvalidParameter(format!(
                "weight_decay must be non-negative (got {})",
                self.weight_decay
            )));
        }
        Ok(())
    }
}

/// Capability to train a network in place.
pub trait Trainer {
    /// Run `epochs` passes over `dataset`, updating `network`'s connection
    /// parameters in place. Returns the mean per-sample error of each epoch.
    fn train_epochs(
        &mut self,
        network: &mut Network,
        dataset: &SupervisedDataset,
        epochs: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<f64>>;
}

/// Online back-propagation trainer with momentum and weight decay.
#[derive(Debug, Clone)]
pub struct BackpropTrainer {
    config: TrainerConfig,
    verbose: bool,
}

impl BackpropTrainer {
    pub fn new(config: TrainerConfig, verbose: bool) -> Self {
        Self { config, verbose }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }
}

impl Default for BackpropTrainer {
    fn default() -> Self {
        Self::new(TrainerConfig::default(), false)
    }
}

impl Trainer for BackpropTrainer {
    fn train_epochs(
        &mut self,
        network: &mut Network,
        dataset: &SupervisedDataset,
        epochs: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<f64>> {
        if dataset.is_empty() {
            return Err(StackError::InvalidParameter(
                "cannot train on an empty dataset".into(),
            ));
        }

        let TrainerConfig {
            learning_rate,
            momentum,
            weight_decay,
        } = self.config;

        // Velocity persists across epochs for the lifetime of one training call
        let mut velocity: Vec<Vec<f64>> = network
            .connections()
            .iter()
            .map(|c| vec![0.0; c.params().len()])
            .collect();

        let mut errors = Vec::with_capacity(epochs);
        for epoch in 0..epochs {
            let mut total = 0.0;
            for idx in shuffled_indices(dataset.len(), rng) {
                let grad = network.gradient(dataset.input(idx), dataset.target(idx))?;
                total += grad.error;

                for ((conn, derivs), vel) in network
                    .connections_mut()
                    .iter_mut()
                    .zip(&grad.derivs)
                    .zip(&mut velocity)
                {
                    for ((p, &d), v) in conn.params_mut().iter_mut().zip(derivs).zip(vel.iter_mut()) {
                        *v = momentum * *v + learning_rate * (d - weight_decay * *p);
                        *p += *v;
                    }
                }
            }

            let mean = total / dataset.len() as f64;
            if self.verbose {
                debug!(epoch, error = mean, "epoch complete");
            } else {
                trace!(epoch, error = mean, "epoch complete");
            }
            errors.push(mean);
        }

        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Activation, Connection, NodeArena};
    use rand::SeedableRng;

    #[test]
    fn test_config_validation() {
        assert!(TrainerConfig::default().validate().is_ok());
        let bad = TrainerConfig {
            momentum: 1.5,
            ..TrainerConfig::default()
        };
        assert!(matches!(bad.validate(), Err(StackError::InvalidParameter(_))));
        let bad = TrainerConfig {
            learning_rate: 0.0,
            ..TrainerConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_error_decreases_on_linear_fit() {
        let mut arena = NodeArena::new();
        let input = arena.activation(Activation::Linear, 1);
        let output = arena.activation(Activation::Linear, 1);
        let bias = arena.bias();

        let mut net = Network::new();
        net.add_input_node(input);
        net.add_node(bias);
        net.add_output_node(output);
        net.add_connection(Connection::zeros(&input, &output));
        net.add_connection(Connection::zeros(&bias, &output));
        net.sort().unwrap();

        let mut ds = SupervisedDataset::new(1, 1);
        for x in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            ds.add_sample(vec![x], vec![0.5 * x + 0.2]).unwrap();
        }

        let mut rng = StdRng::seed_from_u64(7);
        let mut trainer = BackpropTrainer::new(
            TrainerConfig {
                learning_rate: 0.1,
                ..TrainerConfig::default()
            },
            false,
        );
        let errors = trainer.train_epochs(&mut net, &ds, 200, &mut rng).unwrap();

        assert_eq!(errors.len(), 200);
        assert!(errors[199] < errors[0]);
        assert!(errors[199] < 1e-2);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let mut net = Network::new();
        let ds = SupervisedDataset::new(1, 1);
        let mut rng = StdRng::seed_from_u64(0);
        let result = BackpropTrainer::default().train_epochs(&mut net, &ds, 1, &mut rng);
        assert!(matches!(result, Err(StackError::InvalidParameter(_))));
    }
}
