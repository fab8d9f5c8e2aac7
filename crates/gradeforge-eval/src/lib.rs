// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Assembles a `ProblemDefinition` and a candidate's submitted input values
//! into a `gradeforge_dispatch::Job`.
//!
//! This is the orchestration layer between the pure `gradeforge-dsl`/
//! `gradeforge-compiler` crates and `gradeforge-dispatch`'s broker: it
//! knows how to synthesize the candidate-input step each test case graph
//! references, drive compilation per test case, and collect the resulting
//! files into `Program`s.

pub mod error;
pub mod problem;

pub use error::EvalError;
pub use problem::{
    assemble_job, create_input_step, evaluate_submission, ProblemDefinition, RequiredInput,
    TestCase, USER_INPUT_STEP_ID,
};
