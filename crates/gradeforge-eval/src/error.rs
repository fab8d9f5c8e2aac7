// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Errors raised while assembling a submission into a dispatchable job.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("required input {0:?} was not supplied")]
    MissingRequiredInput(String),

    #[error("input {0:?} was supplied but is not a required input")]
    UnexpectedInput(String),

    #[error(transparent)]
    Graph(#[from] gradeforge_dsl::GraphError),

    #[error(transparent)]
    Emission(#[from] gradeforge_compiler::EmissionError),

    #[error(transparent)]
    Dispatch(#[from] gradeforge_dispatch::DispatchError),
}

pub type Result<T> = std::result::Result<T, EvalError>;
