// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `Output`: the graph's single sink. Prints a JSON object keyed by socket
//! id, one entry per data-input value, for the executor to parse back out
//! as the program's verdict payload.

use gradeforge_dsl::Step;

use crate::compile::InBindings;
use crate::error::{EmissionError, Result};
use crate::pyast::{Expr, Stmt};

pub fn emit(step: &Step, bindings: &InBindings) -> Result<Vec<Stmt>> {
    let mut entries = Vec::new();
    for socket in step.inputs() {
        let value = bindings.vars.get(&socket.id).cloned().ok_or_else(|| EmissionError::MissingValue {
            node_id: step.id(),
            socket_id: socket.id.clone(),
        })?;
        entries.push((Expr::str(socket.id.clone()), value));
    }

    Ok(vec![
        Stmt::Import("json".into()),
        Stmt::Expr(Expr::call(
            Expr::name("print"),
            vec![Expr::call(
                Expr::attr(Expr::name("json"), "dumps"),
                vec![Expr::Dict(entries)],
            )],
        )),
    ])
}
