// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `ObjectAccess`: `out = in[key]`.

use gradeforge_dsl::Step;

use crate::compile::{EmitContext, InBindings};
use crate::error::{EmissionError, Result};
use crate::pyast::{Expr, Stmt};

pub fn emit(step: &Step, bindings: &InBindings, ctx: &mut EmitContext) -> Result<Vec<Stmt>> {
    let Step::ObjectAccess(obj) = step else { unreachable!("dispatched only for ObjectAccess") };

    let in_socket = &obj.inputs[0];
    let out_socket = &obj.outputs[0];

    let value = bindings.vars.get(&in_socket.id).cloned().ok_or_else(|| EmissionError::MissingValue {
        node_id: step.id(),
        socket_id: in_socket.id.clone(),
    })?;

    let target = ctx.link_var(step, out_socket);
    Ok(vec![Stmt::Assign {
        target,
        value: Expr::subscript(value, Expr::str(obj.key.clone())),
    }])
}
