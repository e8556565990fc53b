//! Network - Feed-forward graph of nodes and dense connections.
//!
//! This module provides the `Network` container used for every graph in a
//! pipeline run: transient bottleneck networks, compressor views, classifier
//! heads and the final assembled network.
//!
//! # Features
//!
//! - Input, interior and output node roles
//! - Execution order via topological sort (Kahn's algorithm)
//! - Cycle and dangling-endpoint detection
//! - Forward pass and per-sample error back-propagation
//!
//! # Example
//!
//! ```
//! use stackwise::{Activation, Connection, Network, NodeArena, Result};
//!
//! # fn main() -> Result<()> {
//! let mut arena = NodeArena::new();
//! let input = arena.activation(Activation::Linear, 2);
//! let output = arena.activation(Activation::Linear, 1);
//!
//! let mut net = Network::new();
//! net.add_input_node(input);
//! net.add_output_node(output);
//! net.add_connection(Connection::with_params(&input, &output, &[1.0, -1.0])?);
//!
//! // Sort before evaluation
//! net.sort()?;
//! assert_eq!(net.activate(&[3.0, 1.0])?, vec![2.0]);
//! # Ok(())
//! # }
//! ```

use crate::{Connection, Node, NodeId, NodeKind, Result, StackError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Role of a node inside one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Receives the external input vector
    Input,
    /// Hidden or bias node
    Interior,
    /// Contributes to the returned output vector
    Output,
}

/// Error gradient of one sample with respect to every connection.
///
/// `derivs[c]` holds the derivatives for `connections()[c]`, using the
/// convention `derivs = (target - output)`-driven, i.e. the negative gradient
/// of the squared error.
#[derive(Debug, Clone)]
pub struct SampleGradient {
    pub error: f64,
    pub derivs: Vec<Vec<f64>>,
}

/// Feed-forward network over nodes from a [`crate::NodeArena`].
///
/// # Lifecycle
///
/// 1. Create network: `Network::new()`
/// 2. Register nodes: `add_input_node`, `add_node`, `add_output_node`
/// 3. Register connections: `add_connection`
/// 4. Sort: `sort()?`
/// 5. Evaluate: `activate(&input)?`
///
/// Any registration after `sort()` invalidates the ordering.
#[derive(Debug, Clone, Default)]
pub struct Network {
    /// Registered nodes in insertion order, with their role
    nodes: Vec<(Node, NodeRole)>,

    /// NodeId -> index into `nodes`
    index: HashMap<NodeId, usize>,

    /// Dense connections, in insertion order
    connections: Vec<Connection>,

    /// Incoming connection indices per node index (valid after sort)
    incoming: Vec<Vec<usize>>,

    /// Node indices in topological order (valid after sort)
    order: Vec<usize>,

    /// Whether sort() has been called since the last change
    is_sorted: bool,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, or change the role of an already registered node.
    pub fn register(&mut self, node: Node, role: NodeRole) {
        match self.index.get(&node.id) {
            Some(&idx) => self.nodes[idx].1 = role,
            None => {
                self.index.insert(node.id, self.nodes.len());
                self.nodes.push((node, role));
            }
        }
        self.is_sorted = false;
    }

    pub fn add_input_node(&mut self, node: Node) {
        self.register(node, NodeRole::Input);
    }

    pub fn add_output_node(&mut self, node: Node) {
        self.register(node, NodeRole::Output);
    }

    pub fn add_node(&mut self, node: Node) {
        self.register(node, NodeRole::Interior);
    }

    /// Register a connection. Endpoints are checked by `sort()`, so nodes may
    /// be registered before or after their connections.
    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
        self.is_sorted = false;
    }

    /// Compute the execution order.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - a node has zero width
    /// - a connection refers to an unregistered node
    /// - a connection's widths disagree with its endpoints
    /// - the network has no input node or no output node
    /// - the connection graph has a cycle
    pub fn sort(&mut self) -> Result<()> {
        if !self.nodes.iter().any(|(_, r)| *r == NodeRole::Input) {
            return Err(StackError::InvalidParameter("network has no input node".into()));
        }
        if !self.nodes.iter().any(|(_, r)| *r == NodeRole::Output) {
            return Err(StackError::InvalidParameter("network has no output node".into()));
        }

        if let Some((node, _)) = self.nodes.iter().find(|(n, _)| n.width == 0) {
            return Err(StackError::InvalidParameter(format!(
                "node {:?} has zero width",
                node.id
            )));
        }

        let mut incoming = vec![Vec::new(); self.nodes.len()];
        let mut outgoing = vec![Vec::new(); self.nodes.len()];

        for (c, conn) in self.connections.iter().enumerate() {
            let src = self.node_index(conn.from())?;
            let dst = self.node_index(conn.to())?;
            let (src_node, dst_node) = (self.nodes[src].0, self.nodes[dst].0);
            if conn.in_width() != src_node.width {
                return Err(StackError::mismatch(src_node.width, conn.in_width()));
            }
            if conn.out_width() != dst_node.width {
                return Err(StackError::mismatch(dst_node.width, conn.out_width()));
            }
            incoming[dst].push(c);
            outgoing[src].push(dst);
        }

        // Kahn's algorithm, seeded in insertion order for a stable result
        let mut in_degree: Vec<usize> = incoming.iter().map(Vec::len).collect();
        let mut queue: VecDeque<usize> = (0..self.nodes.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &next in &outgoing[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(StackError::Cycle);
        }

        self.incoming = incoming;
        self.order = order;
        self.is_sorted = true;
        Ok(())
    }

    /// Run one forward pass and return the concatenated output node values.
    ///
    /// # Errors
    ///
    /// - [`StackError::NotSorted`] if `sort()` has not been called
    /// - [`StackError::DimensionMismatch`] if `input` has the wrong length
    pub fn activate(&self, input: &[f64]) -> Result<Vec<f64>> {
        let values = self.forward(input)?;
        Ok(self.collect_outputs(&values))
    }

    /// Forward pass followed by back-propagation of `target - output`.
    pub fn gradient(&self, input: &[f64], target: &[f64]) -> Result<SampleGradient> {
        let values = self.forward(input)?;
        if target.len() != self.out_width() {
            return Err(StackError::mismatch(self.out_width(), target.len()));
        }

        let mut out_err: Vec<Vec<f64>> = self
            .nodes
            .iter()
            .map(|(n, _)| vec![0.0; n.width])
            .collect();

        let mut error = 0.0;
        let mut offset = 0;
        for (idx, (node, role)) in self.nodes.iter().enumerate() {
            if *role != NodeRole::Output {
                continue;
            }
            let t = &target[offset..offset + node.width];
            for ((e, &y), &t) in out_err[idx].iter_mut().zip(&values[idx]).zip(t) {
                *e = t - y;
                error += 0.5 * *e * *e;
            }
            offset += node.width;
        }

        let mut derivs: Vec<Vec<f64>> = self
            .connections
            .iter()
            .map(|c| vec![0.0; c.params().len()])
            .collect();

        for &idx in self.order.iter().rev() {
            let node = self.nodes[idx].0;
            let activation = match node.kind {
                NodeKind::Bias => continue,
                NodeKind::Activation(a) => a,
            };
            let mut in_err = vec![0.0; node.width];
            activation.backward(&values[idx], &out_err[idx], &mut in_err);

            for &c in &self.incoming[idx] {
                let conn = &self.connections[c];
                let src = self.index[&conn.from()];
                conn.backward(&values[src], &in_err, &mut out_err[src], &mut derivs[c]);
            }
        }

        Ok(SampleGradient { error, derivs })
    }

    /// Output values of every node, indexed like `nodes()`.
    fn forward(&self, input: &[f64]) -> Result<Vec<Vec<f64>>> {
        if !self.is_sorted {
            return Err(StackError::NotSorted);
        }
        if input.len() != self.in_width() {
            return Err(StackError::mismatch(self.in_width(), input.len()));
        }

        // Input nodes consume the input vector in registration order
        let mut input_offsets = vec![0; self.nodes.len()];
        let mut offset = 0;
        for (idx, (node, role)) in self.nodes.iter().enumerate() {
            if *role == NodeRole::Input {
                input_offsets[idx] = offset;
                offset += node.width;
            }
        }

        let mut values: Vec<Vec<f64>> = vec![Vec::new(); self.nodes.len()];
        for &idx in &self.order {
            let (node, role) = self.nodes[idx];
            let activation = match node.kind {
                NodeKind::Bias => {
                    values[idx] = vec![1.0];
                    continue;
                }
                NodeKind::Activation(a) => a,
            };

            let mut net = vec![0.0; node.width];
            if role == NodeRole::Input {
                let start = input_offsets[idx];
                net.copy_from_slice(&input[start..start + node.width]);
            }
            for &c in &self.incoming[idx] {
                let conn = &self.connections[c];
                conn.forward(&values[self.index[&conn.from()]], &mut net);
            }

            let mut out = vec![0.0; node.width];
            activation.forward(&net, &mut out);
            values[idx] = out;
        }
        Ok(values)
    }

    fn collect_outputs(&self, values: &[Vec<f64>]) -> Vec<f64> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, (_, role))| *role == NodeRole::Output)
            .flat_map(|(idx, _)| values[idx].iter().copied())
            .collect()
    }

    fn node_index(&self, id: NodeId) -> Result<usize> {
        self.index.get(&id).copied().ok_or(StackError::UnknownNode(id))
    }

    /// Total width of the input nodes.
    pub fn in_width(&self) -> usize {
        self.nodes_with_role(NodeRole::Input).map(|n| n.width).sum()
    }

    /// Total width of the output nodes.
    pub fn out_width(&self) -> usize {
        self.nodes_with_role(NodeRole::Output).map(|n| n.width).sum()
    }

    /// Nodes holding `role`, in registration order.
    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = Node> + '_ {
        self.nodes
            .iter()
            .filter(move |(_, r)| *r == role)
            .map(|(n, _)| *n)
    }

    pub fn output_nodes(&self) -> Vec<Node> {
        self.nodes_with_role(NodeRole::Output).collect()
    }

    pub fn input_nodes(&self) -> Vec<Node> {
        self.nodes_with_role(NodeRole::Input).collect()
    }

    /// Role of a node, if registered.
    pub fn role(&self, id: NodeId) -> Option<NodeRole> {
        self.index.get(&id).map(|&idx| self.nodes[idx].1)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Registered nodes with their roles, in insertion order.
    pub fn nodes(&self) -> &[(Node, NodeRole)] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Mutable access to the connection weights. Structure stays untouched,
    /// so the ordering remains valid.
    pub fn connections_mut(&mut self) -> &mut [Connection] {
        &mut self.connections
    }

    /// Node ids in execution order. Empty until `sort()`.
    pub fn execution_order(&self) -> Vec<NodeId> {
        self.order.iter().map(|&i| self.nodes[i].0.id).collect()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    pub fn num_params(&self) -> usize {
        self.connections.iter().map(|c| c.params().len()).sum()
    }

    pub fn is_sorted(&self) -> bool {
        self.is_sorted
    }

    /// Remove all nodes and connections.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.connections.clear();
        self.incoming.clear();
        self.order.clear();
        self.is_sorted = false;
    }
}
