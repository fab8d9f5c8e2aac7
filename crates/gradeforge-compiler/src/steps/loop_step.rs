// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `Loop`: predicate runs before the body on every iteration (spec.md
//! §4.2/§9(2)) — `while True: <predicate>; if <cond>: break; <body>`.

use gradeforge_dsl::{ComputeGraph, Step};

use crate::compile::{compile_subgraph, EmitContext, InBindings};
use crate::error::Result;
use crate::pyast::{Expr, Stmt};

pub fn emit(
    step: &Step,
    graph: &ComputeGraph,
    bindings: &InBindings,
    ctx: &mut EmitContext,
) -> Result<Vec<Stmt>> {
    let Step::Loop(l) = step else { unreachable!("dispatched only for Loop") };

    let mut body = Vec::new();

    if let Some(pred_socket_id) = &l.predicate_socket {
        body.extend(compile_subgraph(graph, l.id, pred_socket_id, ctx)?);
        if let Some(pred_var) = bindings.vars.get(pred_socket_id) {
            body.push(Stmt::If {
                test: pred_var.clone(),
                body: vec![Stmt::Break],
                orelse: vec![],
            });
        }
    }

    body.extend(compile_subgraph(graph, l.id, &l.body_socket, ctx)?);

    Ok(vec![Stmt::While {
        test: Expr::Bool(true),
        body,
    }])
}
