// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `StringMatch`: `out = str(a) == str(b)`, both operands coerced through
//! `str()` so comparisons between e.g. an int and a string literal still
//! work (mirrors the source's string-match semantics exactly).

use gradeforge_dsl::{Literal, Step};

use crate::compile::{literal_expr, EmitContext, InBindings};
use crate::error::{EmissionError, Result};
use crate::pyast::{render_block, CompareOp, Expr, Stmt};

pub fn emit(step: &Step, bindings: &InBindings, ctx: &mut EmitContext) -> Result<Vec<Stmt>> {
    let Step::StringMatch(sm) = step else { unreachable!("dispatched only for StringMatch") };

    let operand = |socket_id: &str| -> Result<Expr> {
        if bindings.files.contains_key(socket_id) {
            return Err(EmissionError::UnexpectedFileLiteral {
                node_id: sm.id,
                socket_id: socket_id.to_string(),
            });
        }
        if let Some(var) = bindings.vars.get(socket_id) {
            return Ok(var.clone());
        }
        let socket = step
            .get_socket(socket_id)
            .expect("socket id comes from this step's own inputs");
        match &socket.literal {
            Some(Literal::File(_)) => Err(EmissionError::UnexpectedFileLiteral {
                node_id: sm.id,
                socket_id: socket_id.to_string(),
            }),
            Some(literal) => Ok(literal_expr(literal)),
            None => Err(EmissionError::MissingValue {
                node_id: sm.id,
                socket_id: socket_id.to_string(),
            }),
        }
    };

    let left = str_cast(operand(&sm.inputs[0].id)?);
    let right = str_cast(operand(&sm.inputs[1].id)?);

    let target = ctx.link_var(step, &sm.outputs[0]);
    Ok(vec![Stmt::Assign {
        target,
        value: Expr::Compare {
            left: Box::new(left),
            op: CompareOp::Eq,
            right: Box::new(right),
        },
    }])
}

fn str_cast(expr: Expr) -> Expr {
    Expr::call(Expr::name("str"), vec![expr])
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradeforge_dsl::{FileLiteral, Socket, SocketDir, StringMatchStep};

    #[test]
    fn emits_str_coerced_equality() {
        let step = Step::StringMatch(StringMatchStep {
            id: 1,
            inputs: vec![
                Socket::data("a", SocketDir::In).with_literal(Literal::Str("hello".into())),
                Socket::data("b", SocketDir::In).with_literal(Literal::Str("hello".into())),
            ],
            outputs: vec![Socket::data("eq", SocketDir::Out)],
        });
        let mut ctx = EmitContext::new();
        let stmts = emit(&step, &InBindings::default(), &mut ctx).unwrap();
        assert_eq!(stmts.len(), 1);
        let rendered = render_block(&stmts, 0);
        assert!(rendered.contains("str(\"hello\") == str(\"hello\")"));
    }

    #[test]
    fn missing_literal_and_no_binding_is_an_emission_error() {
        let step = Step::StringMatch(StringMatchStep {
            id: 1,
            inputs: vec![Socket::data("a", SocketDir::In), Socket::data("b", SocketDir::In)],
            outputs: vec![Socket::data("eq", SocketDir::Out)],
        });
        let mut ctx = EmitContext::new();
        let result = emit(&step, &InBindings::default(), &mut ctx);
        assert!(matches!(result, Err(EmissionError::MissingValue { node_id: 1, .. })));
    }

    #[test]
    fn file_literal_on_an_operand_socket_is_an_emission_error() {
        let step = Step::StringMatch(StringMatchStep {
            id: 1,
            inputs: vec![
                Socket::data("a", SocketDir::In).with_literal(Literal::File(FileLiteral {
                    path: "sol.py".into(),
                    content: String::new(),
                    trusted: true,
                })),
                Socket::data("b", SocketDir::In).with_literal(Literal::Str("hello".into())),
            ],
            outputs: vec![Socket::data("eq", SocketDir::Out)],
        });
        let mut ctx = EmitContext::new();
        let result = emit(&step, &InBindings::default(), &mut ctx);
        assert!(matches!(result, Err(EmissionError::UnexpectedFileLiteral { node_id: 1, .. })));
    }
}
