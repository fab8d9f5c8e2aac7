// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! A small internal Python statement/expression AST and printer.
//!
//! The compiler's emission target is Python source text, not Rust tokens, so
//! there is no `quote!`/`proc-macro2` to reach for here — this module plays
//! the equivalent role for the target language the graph actually compiles
//! to.

/// A Python expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
}

impl Expr {
    pub fn name(s: impl Into<String>) -> Self {
        Expr::Name(s.into())
    }

    pub fn str(s: impl Into<String>) -> Self {
        Expr::Str(s.into())
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: Box::new(func),
            args,
            kwargs: vec![],
        }
    }

    pub fn call_kw(func: Expr, args: Vec<Expr>, kwargs: Vec<(String, Expr)>) -> Self {
        Expr::Call {
            func: Box::new(func),
            args,
            kwargs,
        }
    }

    pub fn attr(value: Expr, attr: impl Into<String>) -> Self {
        Expr::Attribute {
            value: Box::new(value),
            attr: attr.into(),
        }
    }

    pub fn subscript(value: Expr, index: Expr) -> Self {
        Expr::Subscript {
            value: Box::new(value),
            index: Box::new(index),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Expr::Name(n) => n.clone(),
            Expr::Str(s) => format!("{:?}", s),
            Expr::Int(i) => i.to_string(),
            Expr::Float(f) => {
                if f.fract() == 0.0 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Expr::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Expr::Tuple(items) => {
                let rendered: Vec<String> = items.iter().map(Expr::render).collect();
                if rendered.len() == 1 {
                    format!("({},)", rendered[0])
                } else {
                    format!("({})", rendered.join(", "))
                }
            }
            Expr::Dict(entries) => {
                let rendered: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.render(), v.render()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Expr::Call { func, args, kwargs } => {
                let mut parts: Vec<String> = args.iter().map(Expr::render).collect();
                parts.extend(kwargs.iter().map(|(name, v)| format!("{name}={}", v.render())));
                format!("{}({})", func.render(), parts.join(", "))
            }
            Expr::Attribute { value, attr } => format!("{}.{}", value.render(), attr),
            Expr::Subscript { value, index } => format!("{}[{}]", value.render(), index.render()),
            Expr::Compare { left, op, right } => {
                let op_str = match op {
                    CompareOp::Eq => "==",
                    CompareOp::Lt => "<",
                    CompareOp::Gt => ">",
                };
                format!("{} {} {}", left.render(), op_str, right.render())
            }
        }
    }
}

/// A Python statement. Only the subset the compiler needs to emit.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { target: Expr, value: Expr },
    TupleAssign { targets: Vec<Expr>, value: Expr },
    Expr(Expr),
    Import(String),
    ImportFrom { module: String, name: String },
    If { test: Expr, body: Vec<Stmt>, orelse: Vec<Stmt> },
    While { test: Expr, body: Vec<Stmt> },
    Break,
    /// Pre-rendered statement text, indented and emitted as-is. Used for
    /// fixed boilerplate (the sandbox worker harness) that doesn't carry
    /// any per-graph data and so isn't worth modeling as a tree.
    Raw(String),
}

/// Render a block of statements at the given indent depth (4 spaces per
/// level), with a trailing newline per statement.
pub fn render_block(stmts: &[Stmt], indent: usize) -> String {
    let pad = "    ".repeat(indent);
    let mut out = String::new();
    if stmts.is_empty() {
        out.push_str(&pad);
        out.push_str("pass\n");
        return out;
    }
    for stmt in stmts {
        out.push_str(&render_stmt(stmt, indent, &pad));
    }
    out
}

fn render_stmt(stmt: &Stmt, indent: usize, pad: &str) -> String {
    match stmt {
        Stmt::Assign { target, value } => {
            format!("{pad}{} = {}\n", target.render(), value.render())
        }
        Stmt::TupleAssign { targets, value } => {
            let targets_str: Vec<String> = targets.iter().map(Expr::render).collect();
            format!("{pad}{} = {}\n", targets_str.join(", "), value.render())
        }
        Stmt::Expr(e) => format!("{pad}{}\n", e.render()),
        Stmt::Import(module) => format!("{pad}import {module}\n"),
        Stmt::ImportFrom { module, name } => format!("{pad}from {module} import {name}\n"),
        Stmt::If { test, body, orelse } => {
            let mut s = format!("{pad}if {}:\n{}", test.render(), render_block(body, indent + 1));
            if !orelse.is_empty() {
                s.push_str(&format!("{pad}else:\n{}", render_block(orelse, indent + 1)));
            }
            s
        }
        Stmt::While { test, body } => {
            format!("{pad}while {}:\n{}", test.render(), render_block(body, indent + 1))
        }
        Stmt::Break => format!("{pad}break\n"),
        Stmt::Raw(text) => text
            .lines()
            .map(|line| if line.is_empty() { "\n".to_string() } else { format!("{pad}{line}\n") })
            .collect(),
    }
}

/// A blank-line-separated sequence of top-level statement groups, one per
/// compiled step, assembled into a single program body.
pub fn assemble(fragments: &[Vec<Stmt>]) -> Vec<Stmt> {
    fragments.iter().flatten().cloned().collect()
}

pub fn render_program(stmts: &[Stmt]) -> String {
    render_block(stmts, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_assign_and_call() {
        let stmt = Stmt::Assign {
            target: Expr::name("var_1_in_0_a"),
            value: Expr::Int(42),
        };
        assert_eq!(render_block(&[stmt], 0), "var_1_in_0_a = 42\n");
    }

    #[test]
    fn renders_nested_if_else() {
        let stmt = Stmt::If {
            test: Expr::Bool(true),
            body: vec![Stmt::Break],
            orelse: vec![Stmt::Expr(Expr::call(Expr::name("print"), vec![Expr::str("no")]))],
        };
        let rendered = render_block(&[stmt], 0);
        assert!(rendered.contains("if True:\n    break\n"));
        assert!(rendered.contains("else:\n    print('no')\n") || rendered.contains("print(\"no\")"));
    }

    #[test]
    fn empty_block_renders_pass() {
        assert_eq!(render_block(&[], 1), "    pass\n");
    }
}
