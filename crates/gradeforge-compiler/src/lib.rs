// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Compiles a validated [`gradeforge_dsl::ComputeGraph`] into a Python
//! program.
//!
//! # Pipeline
//!
//! 1. **Emit**: walk the graph in topological order, turning each step into
//!    a fragment of the internal [`pyast`] (`compile`, `steps`).
//! 2. **Hoist**: pull every `import`/`from ... import` to the top of the
//!    program, deduped (`hoist`).
//! 3. **Sandbox**: wrap the program in the worker-process harness so
//!    candidate functions run isolated from the executor (`sandbox`).
//! 4. **Render**: print the final AST to Python source text.
//!
//! This crate is pure: no I/O, no subprocess spawning. It produces program
//! text; running it is the executor's job.

pub mod compile;
pub mod error;
pub mod hoist;
pub mod pyast;
pub mod sandbox;
pub mod steps;

use gradeforge_dsl::ComputeGraph;
use tracing::debug;

pub use compile::{compile_graph, EmitContext, InBindings};
pub use error::EmissionError;

/// Compile `graph` to sandboxed Python program text: emit, hoist imports,
/// wrap in the worker harness, render.
pub fn compile_to_sandboxed_program(graph: &ComputeGraph) -> error::Result<String> {
    let emitted = compile::compile_graph(graph)?;
    let hoisted = hoist::hoist_imports(emitted);
    let wrapped = sandbox::wrap_in_worker(hoisted);
    let program = pyast::render_program(&wrapped);
    debug!(%program, "assembled sandboxed program");
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradeforge_dsl::{ComputeGraphSpec, Edge, InputStep, Literal, OutputStep, Socket, SocketDir, Step};

    fn input_step() -> Step {
        Step::Input(InputStep {
            id: 1,
            outputs: vec![Socket::data("a", SocketDir::Out).with_literal(Literal::Int(7))],
            is_user: false,
        })
    }

    fn output_step() -> Step {
        Step::Output(OutputStep {
            id: 2,
            inputs: vec![Socket::data("r", SocketDir::In)],
            output_meta: vec![],
        })
    }

    #[test]
    fn end_to_end_compiles_and_sandboxes() {
        let spec = ComputeGraphSpec {
            steps: vec![input_step(), output_step()],
            edges: vec![Edge {
                id: 1,
                from_node: 1,
                from_socket: "a".into(),
                to_node: 2,
                to_socket: "r".into(),
            }],
        };
        let graph = ComputeGraph::new(spec).unwrap();
        let program = compile_to_sandboxed_program(&graph).unwrap();
        assert!(program.contains("if __name__ == \"__main__\":"));
        assert!(program.contains("json.dumps"));
    }
}
