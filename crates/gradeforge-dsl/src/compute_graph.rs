// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `ComputeGraph`: a validated set of steps and edges, ready for
//! compilation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::{Edge, GraphIndex};
use crate::socket::{Literal, SocketDir, SocketKind};
use crate::step::Step;

/// A steps+edges graph with its derived indices. Construction always
/// validates I1–I5; there is no way to hold an invalid `ComputeGraph`.
#[derive(Debug, Clone)]
pub struct ComputeGraph {
    steps: Vec<Step>,
    edges: Vec<Edge>,
    index: GraphIndex,
}

/// Wire shape: a plain steps+edges pair, deserialized before validation
/// runs (mirrors the source's pydantic-level parse-then-validate split).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeGraphSpec {
    pub steps: Vec<Step>,
    pub edges: Vec<Edge>,
}

impl ComputeGraph {
    pub fn new(spec: ComputeGraphSpec) -> Result<Self, GraphError> {
        let mut steps = spec.steps;
        for step in &mut steps {
            step.finalize_socket_dirs();
        }

        let node_ids: Vec<i64> = steps.iter().map(Step::id).collect();
        let index = GraphIndex::build(node_ids, &spec.edges)?;

        let graph = ComputeGraph {
            steps,
            edges: spec.edges,
            index,
        };
        graph.validate()?;
        Ok(graph)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn index(&self) -> &GraphIndex {
        &self.index
    }

    pub fn step(&self, id: i64) -> Option<&Step> {
        self.steps.iter().find(|s| s.id() == id)
    }

    fn validate(&self) -> Result<(), GraphError> {
        // I4 and I5: per-step arity and module/error-socket invariants.
        for step in &self.steps {
            step.validate()?;
        }

        // I1: exactly one Output step.
        let output_count = self
            .steps
            .iter()
            .filter(|s| matches!(s, Step::Output(_)))
            .count();
        if output_count != 1 {
            return Err(GraphError::WrongOutputStepCount(output_count));
        }

        // I3: every edge references an existing node/socket pair, in
        // opposite directions (out -> in).
        for edge in &self.edges {
            let from_step = self.step(edge.from_node).ok_or_else(|| GraphError::UnknownSocket {
                edge_id: edge.id,
                node_id: edge.from_node,
                socket_id: edge.from_socket.clone(),
            })?;
            let from_socket = from_step.get_socket(&edge.from_socket).ok_or_else(|| {
                GraphError::UnknownSocket {
                    edge_id: edge.id,
                    node_id: edge.from_node,
                    socket_id: edge.from_socket.clone(),
                }
            })?;

            let to_step = self.step(edge.to_node).ok_or_else(|| GraphError::UnknownSocket {
                edge_id: edge.id,
                node_id: edge.to_node,
                socket_id: edge.to_socket.clone(),
            })?;
            let to_socket = to_step.get_socket(&edge.to_socket).ok_or_else(|| {
                GraphError::UnknownSocket {
                    edge_id: edge.id,
                    node_id: edge.to_node,
                    socket_id: edge.to_socket.clone(),
                }
            })?;

            if from_socket.dir != SocketDir::Out || to_socket.dir != SocketDir::In {
                return Err(GraphError::InvalidEdgeDirection(edge.id));
            }
        }

        // Input-step socket literal invariant (spec.md §3 Socket invariant,
        // resolved per SPEC_FULL.md Open Question 1): every output socket of
        // a non-user Input step that has no incoming candidate value must
        // carry a literal.
        for step in &self.steps {
            if let Step::Input(input) = step {
                if input.is_user {
                    continue;
                }
                for socket in &input.outputs {
                    if socket.literal.is_none() {
                        return Err(GraphError::MissingInputLiteral {
                            node_id: input.id,
                            socket_id: socket.id.clone(),
                        });
                    }
                }
            }
        }

        // I2: no cycles among non-subgraph edges. Subgraph-owned nodes
        // (under Loop/IfElse) are excluded from the main topological check
        // because their order is the owning step's responsibility.
        let subgraph_nodes = self.all_subgraph_node_ids();
        self.index.topological_sort(&subgraph_nodes)?;

        Ok(())
    }

    /// Union, over every `Loop`/`IfElse` step, of the node ids reachable
    /// from each of its subgraph sockets via control-edge BFS (spec.md
    /// §4.2).
    pub fn all_subgraph_node_ids(&self) -> HashSet<i64> {
        let mut all = HashSet::new();
        for step in &self.steps {
            for socket_id in step.subgraph_socket_ids() {
                all.extend(self.subgraph_node_ids(step.id(), socket_id));
            }
        }
        all
    }

    /// BFS over control edges from the node connected to `socket_id` on
    /// `owner_id`, stopping at `owner_id`. Returns an empty set if the
    /// socket has no connected edge (an empty subgraph, which individual
    /// steps may or may not permit).
    pub fn subgraph_node_ids(&self, owner_id: i64, socket_id: &str) -> HashSet<i64> {
        let start = self
            .index
            .out_edges(owner_id)
            .find(|e| e.from_socket == socket_id)
            .map(|e| e.to_node)
            .or_else(|| {
                self.index
                    .in_edges(owner_id)
                    .find(|e| e.to_socket == socket_id)
                    .map(|e| e.from_node)
            });

        let Some(start_node) = start else {
            return HashSet::new();
        };

        self.index.control_subgraph(start_node, owner_id, |node_id, sock_id| {
            self.step(node_id).and_then(|s| s.get_socket(sock_id)).map(|s| s.kind)
        })
    }

    /// Topological order over everything except nodes owned by some
    /// `Loop`/`IfElse` subgraph, optionally further restricted to
    /// `only_node_ids` (used to compile just one subgraph's own body).
    pub fn topological_order(
        &self,
        only_node_ids: Option<&HashSet<i64>>,
    ) -> Result<Vec<i64>, GraphError> {
        let subgraph_nodes = self.all_subgraph_node_ids();
        let mut exclude: HashSet<i64> = self
            .steps
            .iter()
            .map(Step::id)
            .filter(|id| subgraph_nodes.contains(id))
            .collect();

        if let Some(only) = only_node_ids {
            exclude.extend(self.steps.iter().map(Step::id).filter(|id| !only.contains(id)));
        }

        self.index.topological_sort(&exclude)
    }

    /// Whether an edge is a control edge: true if either endpoint socket is
    /// control (spec.md §3 Edge derived attribute).
    pub fn edge_kind(&self, edge: &Edge) -> Option<SocketKind> {
        let from = self.step(edge.from_node)?.get_socket(&edge.from_socket)?;
        let to = self.step(edge.to_node)?.get_socket(&edge.to_socket)?;
        if from.kind == SocketKind::Control || to.kind == SocketKind::Control {
            Some(SocketKind::Control)
        } else {
            Some(SocketKind::Data)
        }
    }

    /// Literal embedded in the output socket that feeds `to_node`'s
    /// `to_socket`, if the edge source is an `Input` step's literal rather
    /// than a computed value.
    pub fn literal_source(&self, edge: &Edge) -> Option<&Literal> {
        self.step(edge.from_node)?
            .get_socket(&edge.from_socket)?
            .literal
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::Socket;
    use crate::step::{InputStep, OutputStep};

    fn simple_spec() -> ComputeGraphSpec {
        ComputeGraphSpec {
            steps: vec![
                Step::Input(InputStep {
                    id: 1,
                    outputs: vec![Socket::data("a", SocketDir::Out).with_literal(Literal::Int(1))],
                    is_user: false,
                }),
                Step::Output(OutputStep {
                    id: 2,
                    inputs: vec![Socket::data("r", SocketDir::In)],
                    output_meta: vec![],
                }),
            ],
            edges: vec![Edge {
                id: 1,
                from_node: 1,
                from_socket: "a".into(),
                to_node: 2,
                to_socket: "r".into(),
            }],
        }
    }

    #[test]
    fn valid_graph_constructs() {
        assert!(ComputeGraph::new(simple_spec()).is_ok());
    }

    #[test]
    fn missing_output_step_rejected() {
        let mut spec = simple_spec();
        spec.steps.remove(1);
        spec.edges.clear();
        assert!(matches!(
            ComputeGraph::new(spec),
            Err(GraphError::WrongOutputStepCount(0))
        ));
    }

    #[test]
    fn edge_to_unknown_socket_rejected() {
        let mut spec = simple_spec();
        spec.edges[0].to_socket = "missing".into();
        assert!(matches!(
            ComputeGraph::new(spec),
            Err(GraphError::UnknownSocket { .. })
        ));
    }

    #[test]
    fn non_user_input_without_literal_rejected() {
        let mut spec = simple_spec();
        if let Step::Input(input) = &mut spec.steps[0] {
            input.outputs[0].literal = None;
        }
        assert!(matches!(
            ComputeGraph::new(spec),
            Err(GraphError::MissingInputLiteral { .. })
        ));
    }

    #[test]
    fn cycle_detected() {
        let mut spec = simple_spec();
        spec.edges.push(Edge {
            id: 2,
            from_node: 2,
            from_socket: "r".into(),
            to_node: 1,
            to_socket: "a".into(),
        });
        assert!(ComputeGraph::new(spec).is_err());
    }
}
