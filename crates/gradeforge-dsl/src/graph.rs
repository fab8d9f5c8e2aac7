// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Graph primitives: edges, adjacency indices, and Kahn's-algorithm
//! topological sort.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::socket::SocketKind;

/// A connection between two sockets on (possibly the same) steps.
///
/// `kind` is derived, not stored: an edge is a control edge if either
/// endpoint socket is control, otherwise it is a data edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: i64,
    pub from_node: i64,
    pub from_socket: String,
    pub to_node: i64,
    pub to_socket: String,
}

/// Dense id-keyed indices over a node/edge set, plus Kahn's-algorithm
/// topological sort. Generic over nothing in particular — it only needs
/// node ids and the edge list, so `ComputeGraph` builds one from its own
/// step ids.
#[derive(Debug, Clone)]
pub struct GraphIndex {
    node_ids: Vec<i64>,
    edge_by_id: HashMap<i64, Edge>,
    in_edges: HashMap<i64, Vec<i64>>,
    out_edges: HashMap<i64, Vec<i64>>,
}

impl GraphIndex {
    /// Build indices from a node id list and an edge list. Does not
    /// validate that edge endpoints reference existing nodes; callers
    /// that need I3 should check that separately (see
    /// `ComputeGraph::validate`).
    pub fn build(node_ids: Vec<i64>, edges: &[Edge]) -> Result<Self, GraphError> {
        let mut seen = HashSet::new();
        for &id in &node_ids {
            if !seen.insert(id) {
                return Err(GraphError::DuplicateNodeId(id));
            }
        }

        let mut edge_by_id = HashMap::new();
        let mut in_edges: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut out_edges: HashMap<i64, Vec<i64>> = HashMap::new();
        for edge in edges {
            if edge_by_id.insert(edge.id, edge.clone()).is_some() {
                return Err(GraphError::DuplicateEdgeId(edge.id));
            }
            out_edges.entry(edge.from_node).or_default().push(edge.id);
            in_edges.entry(edge.to_node).or_default().push(edge.id);
        }

        Ok(GraphIndex {
            node_ids,
            edge_by_id,
            in_edges,
            out_edges,
        })
    }

    pub fn edge(&self, id: i64) -> Option<&Edge> {
        self.edge_by_id.get(&id)
    }

    pub fn in_edge_ids(&self, node_id: i64) -> &[i64] {
        self.in_edges.get(&node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn out_edge_ids(&self, node_id: i64) -> &[i64] {
        self.out_edges.get(&node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn in_edges(&self, node_id: i64) -> impl Iterator<Item = &Edge> {
        self.in_edge_ids(node_id).iter().filter_map(|id| self.edge_by_id.get(id))
    }

    pub fn out_edges(&self, node_id: i64) -> impl Iterator<Item = &Edge> {
        self.out_edge_ids(node_id).iter().filter_map(|id| self.edge_by_id.get(id))
    }

    /// Kahn's algorithm over the nodes not in `exclude`. Fails with
    /// `CycleDetected` when fewer nodes are visited than present minus
    /// excluded (spec.md §4.1).
    ///
    /// Tie-break among ready nodes is insertion order in `node_ids`, so
    /// the result is deterministic across repeated calls on the same
    /// graph (spec.md §8 property 2).
    pub fn topological_sort(&self, exclude: &HashSet<i64>) -> Result<Vec<i64>, GraphError> {
        let included: Vec<i64> = self
            .node_ids
            .iter()
            .copied()
            .filter(|id| !exclude.contains(id))
            .collect();
        let included_set: HashSet<i64> = included.iter().copied().collect();

        let mut in_degree: HashMap<i64, usize> = HashMap::new();
        for &id in &included {
            let degree = self
                .in_edge_ids(id)
                .iter()
                .filter_map(|eid| self.edge_by_id.get(eid))
                .filter(|e| included_set.contains(&e.from_node))
                .count();
            in_degree.insert(id, degree);
        }

        let mut queue: VecDeque<i64> = VecDeque::new();
        for &id in &included {
            if in_degree[&id] == 0 {
                queue.push_back(id);
            }
        }

        let mut order = Vec::with_capacity(included.len());
        while let Some(node_id) = queue.pop_front() {
            order.push(node_id);
            for edge in self.out_edges(node_id) {
                if !included_set.contains(&edge.to_node) {
                    continue;
                }
                let degree = in_degree.get_mut(&edge.to_node).expect("indexed above");
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(edge.to_node);
                }
            }
        }

        if order.len() != included.len() {
            return Err(GraphError::CycleDetected);
        }
        Ok(order)
    }

    /// BFS over control edges only, starting from `start_node`, stopping at
    /// (and excluding) `owner_node`. Used to discover the node set owned by
    /// a `Loop`/`IfElse` named control subgraph socket (spec.md §4.2).
    pub fn control_subgraph(
        &self,
        start_node: i64,
        owner_node: i64,
        socket_kind_of: impl Fn(i64, &str) -> Option<SocketKind>,
    ) -> HashSet<i64> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start_node]);

        while let Some(node_id) = queue.pop_front() {
            if node_id == owner_node || visited.contains(&node_id) {
                continue;
            }
            visited.insert(node_id);

            for edge in self.out_edges(node_id) {
                if socket_kind_of(edge.from_node, &edge.from_socket) == Some(SocketKind::Control) {
                    queue.push_back(edge.to_node);
                }
            }
            for edge in self.in_edges(node_id) {
                if socket_kind_of(edge.to_node, &edge.to_socket) == Some(SocketKind::Control) {
                    queue.push_back(edge.from_node);
                }
            }
        }

        visited
    }
}
