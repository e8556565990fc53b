//! Tests for the bottleneck and classifier stage trainers.

use rand::rngs::StdRng;
use rand::SeedableRng;
use stackwise::{
    Activation, BackpropTrainer, Corruption, DenoisingSampler, NodeArena, NodeKind, Result,
    StageKind, StageTrainer, TrainerConfig,
};

fn clusters() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 0.0, 1.0, 1.0, 0.9, 1.0],
        vec![0.1, 0.0, 0.9, 1.0, 1.0, 0.8],
        vec![0.0, 0.2, 1.0, 0.9, 1.0, 1.0],
        vec![1.0, 0.9, 0.0, 0.1, 0.0, 0.2],
        vec![0.9, 1.0, 0.1, 0.0, 0.0, 0.0],
    ]
}

#[test]
fn test_stage_chain_preserves_sample_count() -> Result<()> {
    let mut arena = NodeArena::new();
    let mut trainer = BackpropTrainer::default();
    let mut rng = StdRng::seed_from_u64(4);
    let mut stages = StageTrainer::new(&mut arena, &mut trainer, &mut rng)
        .hidden_activation(Activation::Tanh)
        .epochs(10);
    let masking = Corruption::Masking(DenoisingSampler::default());

    let data = clusters();
    let first = stages.train_bottleneck(0, 6, 4, &data, &masking)?;
    assert_eq!(first.encoded.len(), data.len());
    assert!(first.encoded.iter().all(|s| s.len() == 4));

    let second = stages.train_bottleneck(1, 4, 2, &first.encoded, &masking)?;
    assert_eq!(second.encoded.len(), data.len());
    assert!(second.encoded.iter().all(|s| s.len() == 2));

    // Tanh hidden nodes keep every encoding in range
    for sample in &second.encoded {
        for &x in sample {
            assert!((-1.0..=1.0).contains(&x));
        }
    }
    Ok(())
}

#[test]
fn test_artifact_weight_lengths() -> Result<()> {
    let mut arena = NodeArena::new();
    let mut trainer = BackpropTrainer::default();
    let mut rng = StdRng::seed_from_u64(5);
    let mut stages = StageTrainer::new(&mut arena, &mut trainer, &mut rng).epochs(3);

    let stage = stages.train_bottleneck(0, 6, 3, &clusters(), &Corruption::Identity)?;
    let artifact = &stage.artifact;
    assert_eq!(artifact.weights.params().len(), 6 * 3);
    assert_eq!(artifact.in_width(), 6);
    assert_eq!(artifact.hidden_width(), 3);
    assert_eq!(artifact.input.kind, NodeKind::Activation(Activation::Linear));
    assert_eq!(artifact.bias.as_ref().unwrap().connection.params().len(), 3);
    assert_eq!(stage.report.kind, StageKind::Bottleneck);
    assert_eq!(stage.report.epoch_errors.len(), 3);
    Ok(())
}

#[test]
fn test_compressor_matches_artifact_forward() -> Result<()> {
    let mut arena = NodeArena::new();
    let mut trainer = BackpropTrainer::default();
    let mut rng = StdRng::seed_from_u64(6);
    let mut stages = StageTrainer::new(&mut arena, &mut trainer, &mut rng)
        .hidden_activation(Activation::Linear)
        .epochs(2);

    let data = clusters();
    let stage = stages.train_bottleneck(0, 6, 2, &data, &Corruption::Identity)?;

    // Linear hidden: encoding is W·x + b
    let w = stage.artifact.weights.params();
    let b = stage.artifact.bias.as_ref().unwrap().connection.params();
    for (sample, code) in data.iter().zip(&stage.encoded) {
        for o in 0..2 {
            let expected: f64 =
                (0..6).map(|i| w[o * 6 + i] * sample[i]).sum::<f64>() + b[o];
            assert!((code[o] - expected).abs() < 1e-12);
        }
    }
    Ok(())
}

#[test]
fn test_classifier_stage_uses_final_activation() -> Result<()> {
    let mut arena = NodeArena::new();
    let mut trainer = BackpropTrainer::default();
    let mut rng = StdRng::seed_from_u64(7);
    let mut stages = StageTrainer::new(&mut arena, &mut trainer, &mut rng)
        .final_activation(Activation::Softmax)
        .bias(false)
        .epochs(4);

    let codes = vec![vec![0.1, 0.9], vec![0.8, 0.2], vec![0.2, 0.7]];
    let targets = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];
    let head = stages.train_classifier(1, 2, 2, &codes, &targets)?;

    assert_eq!(head.artifact.hidden.kind, NodeKind::Activation(Activation::Softmax));
    assert!(head.artifact.bias.is_none());
    assert_eq!(head.network.num_connections(), 1);
    assert_eq!(head.report.kind, StageKind::Classifier);

    let y = head.network.activate(&codes[0])?;
    assert!((y.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_bottleneck_reconstruction_error_drops() -> Result<()> {
    let mut arena = NodeArena::new();
    let mut trainer = BackpropTrainer::new(
        TrainerConfig {
            learning_rate: 0.05,
            ..Default::default()
        },
        false,
    );
    let mut rng = StdRng::seed_from_u64(8);
    let mut stages = StageTrainer::new(&mut arena, &mut trainer, &mut rng)
        .hidden_activation(Activation::Sigmoid)
        .epochs(300);

    let stage = stages.train_bottleneck(0, 6, 2, &clusters(), &Corruption::Identity)?;
    let errors = &stage.report.epoch_errors;
    assert!(errors[errors.len() - 1] < errors[0]);
    Ok(())
}
