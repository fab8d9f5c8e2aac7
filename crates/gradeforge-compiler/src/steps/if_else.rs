// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `IfElse`: predicate subgraph, then a native `if`/`else` whose branch
//! bodies are the `if`/`else` subgraphs.

use gradeforge_dsl::{ComputeGraph, Step};

use crate::compile::{compile_subgraph, EmitContext, InBindings};
use crate::error::{EmissionError, Result};
use crate::pyast::Stmt;

pub fn emit(
    step: &Step,
    graph: &ComputeGraph,
    bindings: &InBindings,
    ctx: &mut EmitContext,
) -> Result<Vec<Stmt>> {
    let Step::IfElse(e) = step else { unreachable!("dispatched only for IfElse") };

    let mut stmts = compile_subgraph(graph, e.id, &e.predicate_socket, ctx)?;

    let test = bindings
        .vars
        .get(&e.predicate_socket)
        .cloned()
        .ok_or_else(|| EmissionError::MissingValue {
            node_id: e.id,
            socket_id: e.predicate_socket.clone(),
        })?;

    let if_body = compile_subgraph(graph, e.id, &e.if_socket, ctx)?;
    let else_body = compile_subgraph(graph, e.id, &e.else_socket, ctx)?;

    stmts.push(Stmt::If {
        test,
        body: if_body,
        orelse: else_body,
    });

    Ok(stmts)
}
