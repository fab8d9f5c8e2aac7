// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `Input`: assigns each output socket's embedded literal to its variable.

use gradeforge_dsl::Step;

use crate::compile::{literal_expr, EmitContext};
use crate::error::Result;
use crate::pyast::Stmt;

pub fn emit(step: &Step, ctx: &mut EmitContext) -> Result<Vec<Stmt>> {
    let mut stmts = Vec::new();
    for socket in step.outputs() {
        let Some(literal) = &socket.literal else { continue };
        let target = ctx.link_var(step, socket);
        stmts.push(Stmt::Assign {
            target,
            value: literal_expr(literal),
        });
    }
    Ok(stmts)
}
