//! Node arena - Stable identities for network nodes.
//!
//! Every node used anywhere in a pipeline run (bottleneck networks,
//! compressor views, the assembled network) is allocated from one
//! [`NodeArena`]. A [`Node`] is a small `Copy` handle; two networks that
//! register the same `Node` share that node's identity through its
//! [`NodeId`], never through aliased mutable state.
//!
//! # Examples
//!
//! ```
//! use stackwise::{Activation, NodeArena, NodeKind};
//!
//! let mut arena = NodeArena::new();
//! let input = arena.add(NodeKind::Activation(Activation::Linear), 4);
//! let bias = arena.bias();
//!
//! assert_ne!(input.id, bias.id);
//! assert_eq!(bias.width, 1);
//! assert_eq!(arena.get(input.id), Some(input));
//! ```

use crate::Activation;
use serde::{Deserialize, Serialize};

/// Unique identifier for a node within a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a NodeId from a raw u32 value (for testing).
    #[doc(hidden)]
    pub fn from_raw(id: u32) -> Self {
        NodeId(id)
    }

    /// Get the raw value as an index.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// What a node computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Applies an activation to the sum of its incoming connections
    Activation(Activation),
    /// Always emits a constant unit signal
    Bias,
}

/// Handle to a node allocated in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub width: usize,
}

impl Node {
    #[inline]
    pub fn is_bias(&self) -> bool {
        matches!(self.kind, NodeKind::Bias)
    }
}

/// Owner of node identities for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocate a node with the next free id.
    ///
    /// Zero widths are accepted here and rejected by `Network::sort`.
    pub fn add(&mut self, kind: NodeKind, width: usize) -> Node {
        let node = Node {
            id: NodeId(self.nodes.len() as u32),
            kind,
            width: if matches!(kind, NodeKind::Bias) { 1 } else { width },
        };
        self.nodes.push(node);
        node
    }

    /// Allocate an activation node.
    pub fn activation(&mut self, activation: Activation, width: usize) -> Node {
        self.add(NodeKind::Activation(activation), width)
    }

    /// Allocate a bias node.
    pub fn bias(&mut self) -> Node {
        self.add(NodeKind::Bias, 1)
    }

    pub fn get(&self, id: NodeId) -> Option<Node> {
        self.nodes.get(id.as_usize()).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Forget every node. Ids restart from zero.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
