// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Graph and step data model for gradeforge test-case graphs.
//!
//! A [`ComputeGraph`] is a set of [`Step`]s connected by [`Edge`]s. Steps are
//! a closed catalog (no subclass registry): `Input`, `Output`,
//! `FunctionCall`, `ObjectAccess`, `StringMatch`, `Loop`, `IfElse`. Building a
//! `ComputeGraph` always validates its structural invariants — there's no way
//! to hold one that violates them.
//!
//! This crate is pure data plus validation: no I/O, no code generation. See
//! `gradeforge-compiler` for turning a validated graph into program text.

pub mod compute_graph;
pub mod error;
pub mod graph;
pub mod socket;
pub mod step;

pub use compute_graph::{ComputeGraph, ComputeGraphSpec};
pub use error::GraphError;
pub use graph::{Edge, GraphIndex};
pub use socket::{FileLiteral, Literal, Socket, SocketDir, SocketKind};
pub use step::{
    ArgPosition, Arity, Comparison, FunctionCallMeta, FunctionCallStep, IfElseStep, InputStep,
    LoopStep, ObjectAccessStep, Operator, OutputMeta, OutputStep, Step, StringMatchStep,
};
