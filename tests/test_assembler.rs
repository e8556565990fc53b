//! Integration tests for the Assembler.
//!
//! Artifacts are built by hand so the transplanted weights are known.

use approx::assert_relative_eq;
use stackwise::{
    Activation, Assembler, BiasArtifact, Connection, NodeArena, NodeRole, OutputBoundary, Result,
    StackError, StageArtifact,
};

fn artifact(
    arena: &mut NodeArena,
    in_width: usize,
    hidden_width: usize,
    activation: Activation,
    weight: f64,
    bias: Option<f64>,
) -> Result<StageArtifact> {
    let input = arena.activation(Activation::Linear, in_width);
    let hidden = arena.activation(activation, hidden_width);
    let weights =
        Connection::with_params(&input, &hidden, &vec![weight; in_width * hidden_width])?;
    let bias = match bias {
        Some(b) => {
            let node = arena.bias();
            Some(BiasArtifact {
                node,
                connection: Connection::with_params(&node, &hidden, &vec![b; hidden_width])?,
            })
        }
        None => None,
    };
    Ok(StageArtifact {
        input,
        hidden,
        weights,
        bias,
    })
}

#[test]
fn test_encoder_reuses_stage_zero_identities() -> Result<()> {
    let mut arena = NodeArena::new();
    let stage = artifact(&mut arena, 4, 2, Activation::Linear, 0.5, Some(1.0))?;
    let head = artifact(&mut arena, 2, 1, Activation::Linear, 1.0, Some(0.0))?;

    let encoder = Assembler::new(OutputBoundary::Encoder).assemble(&[stage.clone(), head])?;
    let net = encoder.network();
    assert_eq!(net.input_nodes(), vec![stage.input]);
    assert_eq!(net.output_nodes(), vec![stage.hidden]);
    assert_eq!(encoder.num_stages(), 1);
    // input, hidden, bias
    assert_eq!(encoder.num_nodes(), 3);
    assert_eq!(encoder.num_connections(), 2);

    // 0.5 * (1 + 2 + 3 + 4) + 1
    let y = encoder.activate(&[1.0, 2.0, 3.0, 4.0])?;
    assert_eq!(y.len(), 2);
    assert_relative_eq!(y[0], 6.0);
    assert_relative_eq!(y[1], 6.0);
    Ok(())
}

#[test]
fn test_classifier_chains_hidden_nodes() -> Result<()> {
    let mut arena = NodeArena::new();
    let s0 = artifact(&mut arena, 3, 2, Activation::Linear, 1.0, None)?;
    let s1 = artifact(&mut arena, 2, 2, Activation::Linear, 0.5, None)?;
    let head = artifact(&mut arena, 2, 1, Activation::Linear, 2.0, None)?;

    let assembled = Assembler::new(OutputBoundary::Classifier).assemble(&[
        s0.clone(),
        s1.clone(),
        head.clone(),
    ])?;
    let net = assembled.network();

    assert_eq!(assembled.num_stages(), 3);
    assert_eq!(assembled.num_connections(), 3);
    assert_eq!(assembled.output_node(), head.hidden);
    assert_eq!(net.role(s0.input.id), Some(NodeRole::Input));
    assert_eq!(net.role(s0.hidden.id), Some(NodeRole::Interior));
    assert_eq!(net.role(s1.hidden.id), Some(NodeRole::Interior));
    assert_eq!(net.role(head.hidden.id), Some(NodeRole::Output));
    // Stage inputs after the first are not part of the assembled network
    assert!(!net.contains(s1.input.id));
    assert!(!net.contains(head.input.id));

    // Transplanted edges start at the previous stage's hidden node
    assert!(net
        .connections()
        .iter()
        .any(|c| c.from() == s0.hidden.id && c.to() == s1.hidden.id));

    // [1,1,1] -> [3,3] -> [3,3] -> [12]
    let y = assembled.activate(&[1.0, 1.0, 1.0])?;
    assert_relative_eq!(y[0], 12.0);
    Ok(())
}

#[test]
fn test_weights_are_copied() -> Result<()> {
    let mut arena = NodeArena::new();
    let mut s0 = artifact(&mut arena, 2, 2, Activation::Linear, 1.0, Some(0.0))?;
    let head = artifact(&mut arena, 2, 1, Activation::Linear, 1.0, None)?;

    let assembled =
        Assembler::new(OutputBoundary::Classifier).assemble(&[s0.clone(), head.clone()])?;
    let before = assembled.activate(&[1.0, 1.0])?;

    // Mutating the artifact afterwards must not leak into the network
    s0.weights.params_mut().iter_mut().for_each(|w| *w = 100.0);
    let after = assembled.activate(&[1.0, 1.0])?;
    assert_eq!(before, after);
    assert_relative_eq!(after[0], 4.0);
    Ok(())
}

#[test]
fn test_connection_count_per_stage_and_bias() -> Result<()> {
    let mut arena = NodeArena::new();
    let with_bias = vec![
        artifact(&mut arena, 4, 3, Activation::Sigmoid, 0.1, Some(0.1))?,
        artifact(&mut arena, 3, 2, Activation::Sigmoid, 0.1, Some(0.1))?,
        artifact(&mut arena, 2, 1, Activation::Sigmoid, 0.1, Some(0.1))?,
    ];
    let assembled = Assembler::new(OutputBoundary::Classifier).assemble(&with_bias)?;
    assert_eq!(assembled.num_connections(), 3 * 2);

    let without_bias = vec![
        artifact(&mut arena, 4, 3, Activation::Sigmoid, 0.1, None)?,
        artifact(&mut arena, 3, 2, Activation::Sigmoid, 0.1, None)?,
        artifact(&mut arena, 2, 1, Activation::Sigmoid, 0.1, None)?,
    ];
    let assembled = Assembler::new(OutputBoundary::Classifier).assemble(&without_bias)?;
    assert_eq!(assembled.num_connections(), 3);
    Ok(())
}

#[test]
fn test_chaining_mismatch_is_rejected() -> Result<()> {
    let mut arena = NodeArena::new();
    let s0 = artifact(&mut arena, 4, 3, Activation::Linear, 1.0, None)?;
    // Expects 2 inputs, but stage 0 produces 3
    let head = artifact(&mut arena, 2, 1, Activation::Linear, 1.0, None)?;

    let result = Assembler::new(OutputBoundary::Classifier).assemble(&[s0, head]);
    assert!(matches!(
        result,
        Err(StackError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
    Ok(())
}

#[test]
fn test_too_few_artifacts() -> Result<()> {
    let mut arena = NodeArena::new();
    let s0 = artifact(&mut arena, 4, 3, Activation::Linear, 1.0, None)?;

    assert!(matches!(
        Assembler::new(OutputBoundary::Encoder).assemble(&[]),
        Err(StackError::InvalidParameter(_))
    ));
    assert!(matches!(
        Assembler::new(OutputBoundary::Classifier).assemble(&[s0]),
        Err(StackError::InvalidParameter(_))
    ));
    Ok(())
}

#[test]
fn test_attach_head_to_encoder() -> Result<()> {
    let mut arena = NodeArena::new();
    let s0 = artifact(&mut arena, 2, 2, Activation::Linear, 1.0, Some(1.0))?;
    let head = artifact(&mut arena, 2, 1, Activation::Linear, 0.5, Some(0.5))?;

    let mut assembled = Assembler::new(OutputBoundary::Encoder).assemble(&[s0.clone()])?;
    assert_eq!(assembled.activate(&[1.0, 2.0])?, vec![4.0, 4.0]);

    assembled.attach_classifier_head(&head)?;
    assert_eq!(assembled.boundary(), OutputBoundary::Classifier);
    assert_eq!(assembled.output_node(), head.hidden);
    assert_eq!(assembled.network().role(s0.hidden.id), Some(NodeRole::Interior));
    assert_eq!(assembled.network().output_nodes(), vec![head.hidden]);

    // 0.5 * (4 + 4) + 0.5
    let y = assembled.activate(&[1.0, 2.0])?;
    assert_relative_eq!(y[0], 4.5);

    // A second head is refused
    assert!(matches!(
        assembled.attach_classifier_head(&head),
        Err(StackError::InvalidParameter(_))
    ));
    Ok(())
}
