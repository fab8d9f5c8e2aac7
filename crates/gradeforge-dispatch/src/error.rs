// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Errors raised while building or dispatching jobs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("program {0} entrypoint {1:?} not found among its own files")]
    EntrypointMissing(i64, String),

    #[error("time limit must be > 0, got {0}")]
    InvalidTimeLimit(i64),

    #[error("memory limit must be > 0, got {0}")]
    InvalidMemoryLimit(i64),

    #[error("job has no programs")]
    EmptyJob,

    #[error(transparent)]
    Amqp(#[from] lapin::Error),

    #[error("malformed result message: {0}")]
    MalformedResult(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
