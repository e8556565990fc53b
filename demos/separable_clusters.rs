//! Two linearly separable clusters through both pretraining strategies.
//!
//! Run with: cargo run --example separable_clusters

use anyhow::{Context, Result};
use stackwise::{
    GreedyDenoisingAutoencoder, PipelineConfig, Pretrainer, SimpleStackedEncoder, StageKind,
};

fn main() -> Result<()> {
    let data = vec![
        vec![0.0, 0.0, 1.0, 1.0],
        vec![0.0, 0.0, 1.0, 0.9],
        vec![0.0, 0.0, 0.9, 0.9],
        vec![0.8, 1.0, 0.0, 0.0],
        vec![1.0, 1.0, 0.1, 0.0],
        vec![1.0, 0.9, 0.0, 0.2],
    ];
    let targets = vec![vec![0.0], vec![0.0], vec![0.0], vec![1.0], vec![1.0], vec![1.0]];

    println!("{}", stackwise::version());
    println!("==========================================\n");

    // Pure encoder: [4, 2, 1] with autoencoding_only stops at stage 0
    let config = PipelineConfig::from_names(vec![4, 2, 1], "TanhLayer", "TanhLayer", 50, true, true, true)?
        .with_seed(7);
    let mut dae = GreedyDenoisingAutoencoder::new(data.clone(), targets.clone(), config)?;
    let encoder = dae.fit().context("fitting the denoising encoder")?;

    println!(
        "Encoder: {} nodes, {} connections, boundary {:?}",
        encoder.num_nodes(),
        encoder.num_connections(),
        encoder.boundary()
    );
    for sample in &data {
        let code = encoder.activate(sample)?;
        let label = dae.predict(sample)?;
        println!("  {:?} -> code {:.3?}  predict {:.3?}", sample, code, label);
    }

    // Deeper classifier, fine-tuned end to end
    let config = PipelineConfig::from_names(vec![4, 3, 2, 1], "Sigmoid", "Sigmoid", 200, true, false, false)?
        .with_smoothing_epochs(100)
        .with_seed(7);
    let mut sse = SimpleStackedEncoder::new(data.clone(), targets.clone(), config)?;
    let classifier = sse.fit().context("fitting the stacked encoder")?;

    println!(
        "\nClassifier: {} nodes, {} connections, boundary {:?}",
        classifier.num_nodes(),
        classifier.num_connections(),
        classifier.boundary()
    );
    for (sample, target) in data.iter().zip(&targets) {
        let y = sse.predict(sample)?;
        println!("  {:?} -> {:.3} (target {})", sample, y[0], target[0]);
    }

    if let Some(report) = sse.report() {
        println!("\nStage errors:");
        for stage in &report.stages {
            let tag = match stage.kind {
                StageKind::Bottleneck => "bottleneck",
                StageKind::Classifier => "classifier",
                StageKind::FineTune => "fine-tune",
            };
            println!(
                "  stage {} {:<10} {} -> {}  final error {:.5}",
                stage.index,
                tag,
                stage.in_width,
                stage.out_width,
                stage.final_error().unwrap_or(f64::NAN)
            );
        }
    }

    Ok(())
}
