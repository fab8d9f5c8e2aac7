// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Errors raised while compiling a validated graph to program text.

use gradeforge_dsl::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmissionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("step {node_id} socket {socket_id} has no incoming value")]
    MissingValue { node_id: i64, socket_id: String },

    #[error("function-call step {0} is missing its module input file")]
    MissingModuleFile(i64),

    #[error("socket {node_id}:{socket_id} carries a file literal where a primitive was expected")]
    UnexpectedFileLiteral { node_id: i64, socket_id: String },
}

pub type Result<T> = std::result::Result<T, EmissionError>;
