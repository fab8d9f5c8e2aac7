// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! C4: wraps a compiled program in a worker-process harness so untrusted
//! candidate functions run isolated from the parent's stdout and lifecycle.
//! `call_function_safe` always returns a `(value, error)` pair: on a clean
//! call `error` is `None`; on an exception, `allow_error=True` captures it as
//! a string instead of propagating, and `allow_error=False` re-raises in the
//! parent (`SandboxPropagation`, spec.md §7).

use crate::pyast::{Expr, Stmt};

const WORKER_TEMPLATE: &str = r#"def call_function_from_file(file_name, function_name, *args, **kwargs):
    with open(os.devnull, "w") as f:
        with redirect_stdout(f):
            module_name = file_name.replace(".py", "")
            module = importlib.import_module(module_name)
            func = getattr(module, function_name)
            return func(*args, **kwargs)


def worker(task_queue, result_queue):
    while True:
        task = task_queue.get()
        if task == "STOP":
            break

        file_name, function_name, args, kwargs = task
        try:
            result = call_function_from_file(file_name, function_name, *args, **kwargs)
            result_queue.put(result)
        except Exception as e:
            result_queue.put(e)"#;

const ENTRYPOINT_TEMPLATE: &str = r#"multiprocessing.freeze_support()
multiprocessing.set_start_method("spawn")
task_queue = multiprocessing.Queue()
result_queue = multiprocessing.Queue()

process = multiprocessing.Process(target=worker, args=(task_queue, result_queue))
process.start()

def call_function_safe(file_name, function_name, allow_error, *args, **kwargs):
    task_queue.put((file_name, function_name, args, kwargs))
    result = result_queue.get()
    if isinstance(result, Exception):
        if allow_error:
            return None, f"{type(result).__name__}: {result}"
        raise result
    return result, None"#;

const CLEANUP_TEMPLATE: &str = r#"task_queue.put("STOP")
process.join()"#;

/// Wrap a compiled program body in the worker-process sandbox: the program
/// itself runs under `if __name__ == "__main__":`, calling untrusted
/// functions only through `call_function_safe`, which hands off to a
/// separate process whose stdout is redirected to `/dev/null` so a
/// candidate's prints can't corrupt the executor's own output stream.
pub fn wrap_in_worker(program: Vec<Stmt>) -> Vec<Stmt> {
    let mut body = vec![
        Stmt::Import("importlib".into()),
        Stmt::Import("multiprocessing".into()),
        Stmt::Import("os".into()),
        Stmt::ImportFrom {
            module: "contextlib".into(),
            name: "redirect_stdout".into(),
        },
        Stmt::Raw(WORKER_TEMPLATE.to_string()),
    ];

    let mut main_body = vec![Stmt::Raw(ENTRYPOINT_TEMPLATE.to_string())];
    main_body.extend(program);
    main_body.push(Stmt::Raw(CLEANUP_TEMPLATE.to_string()));

    body.push(Stmt::If {
        test: Expr::Compare {
            left: Box::new(Expr::name("__name__")),
            op: crate::pyast::CompareOp::Eq,
            right: Box::new(Expr::str("__main__")),
        },
        body: main_body,
        orelse: vec![],
    });

    body
}
