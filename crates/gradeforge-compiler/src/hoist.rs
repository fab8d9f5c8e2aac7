// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Import hoisting: gather every `import`/`from ... import ...` statement
//! out of a statement list, dedupe, and prepend them at the top.

use std::collections::BTreeSet;

use crate::pyast::Stmt;

/// Two passes over `stmts`: gather import statements (wherever they occur,
/// including inside nested bodies), then rebuild the list with all imports
/// removed and a deduped, sorted block of imports prepended. Mirrors the
/// source's `GatherImportsVisitor` + `RemoveImportsVisitors` +
/// `AddImportsVisitor` pipeline without needing a full CST visitor — our AST
/// is small enough to walk by hand.
pub fn hoist_imports(stmts: Vec<Stmt>) -> Vec<Stmt> {
    let mut modules: BTreeSet<String> = BTreeSet::new();
    let mut from_imports: BTreeSet<(String, String)> = BTreeSet::new();
    gather(&stmts, &mut modules, &mut from_imports);

    let remaining = remove_imports(stmts);

    let mut hoisted: Vec<Stmt> = modules.into_iter().map(Stmt::Import).collect();
    hoisted.extend(
        from_imports
            .into_iter()
            .map(|(module, name)| Stmt::ImportFrom { module, name }),
    );
    hoisted.extend(remaining);
    hoisted
}

fn gather(stmts: &[Stmt], modules: &mut BTreeSet<String>, from_imports: &mut BTreeSet<(String, String)>) {
    for stmt in stmts {
        match stmt {
            Stmt::Import(module) => {
                modules.insert(module.clone());
            }
            Stmt::ImportFrom { module, name } => {
                from_imports.insert((module.clone(), name.clone()));
            }
            Stmt::If { body, orelse, .. } => {
                gather(body, modules, from_imports);
                gather(orelse, modules, from_imports);
            }
            Stmt::While { body, .. } => gather(body, modules, from_imports),
            _ => {}
        }
    }
}

fn remove_imports(stmts: Vec<Stmt>) -> Vec<Stmt> {
    stmts
        .into_iter()
        .filter_map(|stmt| match stmt {
            Stmt::Import(_) | Stmt::ImportFrom { .. } => None,
            Stmt::If { test, body, orelse } => Some(Stmt::If {
                test,
                body: remove_imports(body),
                orelse: remove_imports(orelse),
            }),
            Stmt::While { test, body } => Some(Stmt::While {
                test,
                body: remove_imports(body),
            }),
            other => Some(other),
        })
        .collect()
}
