// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Validation errors for the graph/step data model.

use thiserror::Error;

/// Errors raised while validating a [`crate::ComputeGraph`] or the steps it
/// owns. Always surfaced to the caller before any job is dispatched (see
/// spec.md §7).
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("node {0} requires {1} {2} sockets, found {3}")]
    ArityMismatch(i64, String, &'static str, usize),

    #[error("edge {edge_id} references unknown node/socket pair {node_id}:{socket_id}")]
    UnknownSocket {
        edge_id: i64,
        node_id: i64,
        socket_id: String,
    },

    #[error("edge {0} does not connect an output socket to an input socket")]
    InvalidEdgeDirection(i64),

    #[error("graph has a cycle")]
    CycleDetected,

    #[error("expected exactly one Output step, found {0}")]
    WrongOutputStepCount(usize),

    #[error("function-call step {0} has {1} module-source input sockets, expected exactly 1")]
    WrongModuleSocketCount(i64, usize),

    #[error("function-call step {0} allow_error={1} but has {2} error-output sockets")]
    WrongErrorSocketCount(i64, bool, usize),

    #[error("input step {node_id} output socket {socket_id} has no literal and is not user-supplied")]
    MissingInputLiteral { node_id: i64, socket_id: String },

    #[error("duplicate node id {0}")]
    DuplicateNodeId(i64),

    #[error("duplicate edge id {0}")]
    DuplicateEdgeId(i64),
}

pub type Result<T> = std::result::Result<T, GraphError>;
