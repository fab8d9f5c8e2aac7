// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `FunctionCall`: invokes a candidate-supplied Python function. Trusted
//! module files are imported and called directly; untrusted ones are routed
//! through the sandbox's `call_function_safe` (see `crate::sandbox`) so a
//! candidate's code never runs in the executor's own process.

use gradeforge_dsl::Step;

use crate::compile::{EmitContext, InBindings};
use crate::error::{EmissionError, Result};
use crate::pyast::{Expr, Stmt};

const UNUSED_VAR: &str = "_";

pub fn emit(step: &Step, bindings: &InBindings, ctx: &mut EmitContext) -> Result<Vec<Stmt>> {
    let Step::FunctionCall(f) = step else { unreachable!("dispatched only for FunctionCall") };

    let module_socket = f.module_socket().ok_or_else(|| EmissionError::MissingModuleFile(f.id))?;
    let module_file = bindings
        .files
        .get(&module_socket.id)
        .ok_or_else(|| EmissionError::MissingModuleFile(f.id))?;

    let module_name = module_file
        .path
        .trim_end_matches(".py")
        .replace('/', ".");

    let mut args = Vec::new();
    for socket in f.args() {
        if let Some(value) = bindings.vars.get(&socket.id) {
            args.push(value.clone());
        }
    }
    let mut kwargs = Vec::new();
    for (socket, name) in f.kwargs() {
        if let Some(value) = bindings.vars.get(&socket.id) {
            kwargs.push((name, value.clone()));
        }
    }

    let error_socket = f.error_socket();
    let out_socket = f
        .outputs
        .iter()
        .find(|s| Some(s.id.as_str()) != error_socket.map(|e| e.id.as_str()))
        .expect("FunctionCall requires at least one non-error data output");

    let out_var = ctx.link_var(step, out_socket);
    let error_var = match error_socket {
        Some(s) => ctx.link_var(step, s),
        None => Expr::name(UNUSED_VAR),
    };

    if module_file.trusted {
        let func_name = f.function_identifier.clone();
        Ok(vec![
            Stmt::ImportFrom { module: module_name, name: func_name.clone() },
            Stmt::Assign {
                target: out_var,
                value: Expr::call_kw(Expr::name(func_name), args, kwargs),
            },
        ])
    } else {
        let mut call_args = vec![
            Expr::str(module_name),
            Expr::str(f.function_identifier.clone()),
            Expr::Bool(f.allow_error),
        ];
        call_args.extend(args);

        Ok(vec![Stmt::TupleAssign {
            targets: vec![out_var, error_var],
            value: Expr::call_kw(Expr::name("call_function_safe"), call_args, kwargs),
        }])
    }
}

#[cfg(test)]
mod tests {
    use gradeforge_dsl::{ArgPosition, FileLiteral, FunctionCallMeta, FunctionCallStep, Socket, SocketDir};

    use super::*;
    use crate::pyast::render_block;

    fn module_socket() -> Socket {
        Socket::data("mod", SocketDir::In)
    }

    fn bindings_for(path: &str, trusted: bool, vars: &[(&str, Expr)]) -> InBindings {
        let mut bindings = InBindings::default();
        bindings.files.insert("mod".to_string(), FileLiteral { path: path.into(), content: String::new(), trusted });
        for (id, expr) in vars {
            bindings.vars.insert(id.to_string(), expr.clone());
        }
        bindings
    }

    #[test]
    fn trusted_module_is_imported_and_called_directly() {
        let step = Step::FunctionCall(FunctionCallStep {
            id: 1,
            inputs: vec![module_socket(), Socket::data("a", SocketDir::In), Socket::data("b", SocketDir::In)],
            outputs: vec![Socket::data("sum", SocketDir::Out)],
            function_identifier: "add".into(),
            allow_error: false,
            socket_meta: vec![
                ("mod".into(), FunctionCallMeta { import_as_module: true, ..Default::default() }),
                ("a".into(), FunctionCallMeta { arg_position: Some(ArgPosition { position: 0 }), ..Default::default() }),
                ("b".into(), FunctionCallMeta { arg_position: Some(ArgPosition { position: 1 }), ..Default::default() }),
            ],
        });
        let bindings = bindings_for("sol.py", true, &[("a", Expr::Int(2)), ("b", Expr::Int(3))]);
        let mut ctx = EmitContext::new();
        let stmts = emit(&step, &bindings, &mut ctx).unwrap();
        let rendered = render_block(&stmts, 0);
        assert!(rendered.contains("from sol import add"));
        assert!(rendered.contains("add(2, 3)"));
    }

    #[test]
    fn untrusted_module_routes_through_sandbox_with_allow_error() {
        let step = Step::FunctionCall(FunctionCallStep {
            id: 1,
            inputs: vec![module_socket()],
            outputs: vec![Socket::data("value", SocketDir::Out), Socket::data("error", SocketDir::Out)],
            function_identifier: "boom".into(),
            allow_error: true,
            socket_meta: vec![
                ("mod".into(), FunctionCallMeta { import_as_module: true, ..Default::default() }),
                ("error".into(), FunctionCallMeta { handles_error: true, ..Default::default() }),
            ],
        });
        let bindings = bindings_for("sol.py", false, &[]);
        let mut ctx = EmitContext::new();
        let stmts = emit(&step, &bindings, &mut ctx).unwrap();
        let rendered = render_block(&stmts, 0);
        assert!(rendered.contains("call_function_safe(\"sol\", \"boom\", True)"));
    }

    #[test]
    fn missing_module_file_is_an_emission_error() {
        let step = Step::FunctionCall(FunctionCallStep {
            id: 1,
            inputs: vec![],
            outputs: vec![Socket::data("value", SocketDir::Out)],
            function_identifier: "boom".into(),
            allow_error: false,
            socket_meta: vec![],
        });
        let mut ctx = EmitContext::new();
        let result = emit(&step, &InBindings::default(), &mut ctx);
        assert!(matches!(result, Err(EmissionError::MissingModuleFile(1))));
    }
}
