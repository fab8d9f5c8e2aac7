// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! One emitter per step variant. Each `emit` function takes the owning
//! graph (for subgraph compilation and socket lookups), the step itself,
//! and the bindings gathered from its incoming edges, and returns the
//! statements that compute its outputs.

mod function_call;
mod if_else;
mod input;
mod loop_step;
mod object_access;
mod output;
mod string_match;

use gradeforge_dsl::{ComputeGraph, Step};

use crate::compile::{EmitContext, InBindings};
use crate::error::Result;
use crate::pyast::Stmt;

pub fn emit(
    step: &Step,
    graph: &ComputeGraph,
    bindings: &InBindings,
    ctx: &mut EmitContext,
) -> Result<Vec<Stmt>> {
    match step {
        Step::Input(_) => input::emit(step, ctx),
        Step::Output(_) => output::emit(step, bindings),
        Step::FunctionCall(_) => function_call::emit(step, bindings, ctx),
        Step::ObjectAccess(_) => object_access::emit(step, bindings, ctx),
        Step::StringMatch(_) => string_match::emit(step, bindings, ctx),
        Step::Loop(_) => loop_step::emit(step, graph, bindings, ctx),
        Step::IfElse(_) => if_else::emit(step, graph, bindings, ctx),
    }
}
