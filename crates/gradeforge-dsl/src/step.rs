// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The step catalog: a closed tagged union of the seven step kinds a test
//! case graph can be built from.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::socket::{finalize_dirs, Literal, Socket, SocketDir, SocketKind};

/// Inclusive arity bound; `None` on either side means unbounded.
#[derive(Debug, Clone, Copy)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exact(n: usize) -> Self {
        Arity { min: n, max: Some(n) }
    }

    pub const fn at_least(n: usize) -> Self {
        Arity { min: n, max: None }
    }

    pub const fn any() -> Self {
        Arity { min: 0, max: None }
    }

    pub fn satisfies(&self, got: usize) -> bool {
        got >= self.min && self.max.map(|max| got <= max).unwrap_or(true)
    }
}

/// The comparison an `Output` socket asserts its value against, used by the
/// executor to grade the result (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    LessThan,
    Equal,
    GreaterThan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub operator: Operator,
    pub value: Literal,
}

/// Extra fields an `Output` step's socket carries beyond the base `Socket`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMeta {
    #[serde(default)]
    pub comparison: Option<Comparison>,
    #[serde(default = "default_true")]
    pub public: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputMeta {
    fn default() -> Self {
        OutputMeta {
            comparison: None,
            public: true,
        }
    }
}

/// Where a `FunctionCall` data-input socket feeds a positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgPosition {
    pub position: usize,
}

/// Extra fields a `FunctionCall` step's socket carries: how it binds into
/// the call (module source, positional arg, keyword arg, error pipe).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallMeta {
    #[serde(default)]
    pub import_as_module: bool,
    #[serde(default)]
    pub arg_position: Option<ArgPosition>,
    #[serde(default)]
    pub kwarg_name: Option<String>,
    #[serde(default)]
    pub handles_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputStep {
    pub id: i64,
    #[serde(default)]
    pub outputs: Vec<Socket>,
    #[serde(default)]
    pub is_user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputStep {
    pub id: i64,
    #[serde(default)]
    pub inputs: Vec<Socket>,
    /// Parallel to `inputs`, indexed by socket id. A `HashMap` keyed by
    /// socket id would also work; a parallel `Vec` mirrors the source's
    /// subclassed-socket approach closely enough while keeping `Socket`
    /// itself variant-agnostic.
    #[serde(default)]
    pub output_meta: Vec<(String, OutputMeta)>,
}

impl OutputStep {
    pub fn meta_for(&self, socket_id: &str) -> OutputMeta {
        self.output_meta
            .iter()
            .find(|(id, _)| id == socket_id)
            .map(|(_, meta)| meta.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringMatchStep {
    pub id: i64,
    #[serde(default)]
    pub inputs: Vec<Socket>,
    #[serde(default)]
    pub outputs: Vec<Socket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAccessStep {
    pub id: i64,
    #[serde(default)]
    pub inputs: Vec<Socket>,
    #[serde(default)]
    pub outputs: Vec<Socket>,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallStep {
    pub id: i64,
    #[serde(default)]
    pub inputs: Vec<Socket>,
    #[serde(default)]
    pub outputs: Vec<Socket>,
    pub function_identifier: String,
    #[serde(default)]
    pub allow_error: bool,
    #[serde(default)]
    pub socket_meta: Vec<(String, FunctionCallMeta)>,
}

impl FunctionCallStep {
    pub fn meta_for(&self, socket_id: &str) -> FunctionCallMeta {
        self.socket_meta
            .iter()
            .find(|(id, _)| id == socket_id)
            .map(|(_, meta)| meta.clone())
            .unwrap_or_default()
    }

    pub fn module_socket(&self) -> Option<&Socket> {
        self.inputs
            .iter()
            .find(|s| self.meta_for(&s.id).import_as_module)
    }

    pub fn error_socket(&self) -> Option<&Socket> {
        self.outputs.iter().find(|s| self.meta_for(&s.id).handles_error)
    }

    /// Positional args, in call order.
    pub fn args(&self) -> Vec<&Socket> {
        let mut args: Vec<(&Socket, usize)> = self
            .inputs
            .iter()
            .filter_map(|s| self.meta_for(&s.id).arg_position.map(|p| (s, p.position)))
            .collect();
        args.sort_by_key(|(_, pos)| *pos);
        args.into_iter().map(|(s, _)| s).collect()
    }

    pub fn kwargs(&self) -> Vec<(&Socket, String)> {
        self.inputs
            .iter()
            .filter_map(|s| self.meta_for(&s.id).kwarg_name.map(|name| (s, name)))
            .collect()
    }
}

/// Named aliases for `Loop`/`IfElse` control subgraph sockets, mirroring
/// the source's `subgraph_socket_aliases`.
pub mod subgraph_alias {
    pub const PREDICATE: &str = "predicate";
    pub const LOOP_BODY: &str = "body";
    pub const IF_BRANCH: &str = "if";
    pub const ELSE_BRANCH: &str = "else";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopStep {
    pub id: i64,
    #[serde(default)]
    pub inputs: Vec<Socket>,
    #[serde(default)]
    pub outputs: Vec<Socket>,
    /// Socket id of the `inputs` entry used as the loop predicate control
    /// socket, if present (predicate is optional — an infinite loop).
    pub predicate_socket: Option<String>,
    /// Socket id of the `outputs` entry whose connected subgraph is the
    /// loop body.
    pub body_socket: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfElseStep {
    pub id: i64,
    #[serde(default)]
    pub inputs: Vec<Socket>,
    #[serde(default)]
    pub outputs: Vec<Socket>,
    pub predicate_socket: String,
    pub if_socket: String,
    pub else_socket: String,
}

/// The closed set of step kinds spec.md §3 describes. No subclass
/// registry: adding a kind means adding a variant here and its matching
/// emitter in `gradeforge-compiler`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Step {
    Input(InputStep),
    Output(OutputStep),
    FunctionCall(FunctionCallStep),
    ObjectAccess(ObjectAccessStep),
    StringMatch(StringMatchStep),
    Loop(LoopStep),
    IfElse(IfElseStep),
}

/// Four-letter-ish shorthand used in emitted variable names
/// (`var_<n>_<shorthand>_<s>_<label>`), matching the source's
/// `STEP_TYPE_SHORTHANDS`.
pub fn shorthand(step: &Step) -> &'static str {
    match step {
        Step::Input(_) => "in",
        Step::Output(_) => "out",
        Step::FunctionCall(_) => "py_run_func",
        Step::ObjectAccess(_) => "obj_access",
        Step::StringMatch(_) => "str_match",
        Step::Loop(_) => "loop",
        Step::IfElse(_) => "if_else",
    }
}

impl Step {
    pub fn id(&self) -> i64 {
        match self {
            Step::Input(s) => s.id,
            Step::Output(s) => s.id,
            Step::FunctionCall(s) => s.id,
            Step::ObjectAccess(s) => s.id,
            Step::StringMatch(s) => s.id,
            Step::Loop(s) => s.id,
            Step::IfElse(s) => s.id,
        }
    }

    pub fn inputs(&self) -> &[Socket] {
        match self {
            Step::Input(_) => &[],
            Step::Output(s) => &s.inputs,
            Step::FunctionCall(s) => &s.inputs,
            Step::ObjectAccess(s) => &s.inputs,
            Step::StringMatch(s) => &s.inputs,
            Step::Loop(s) => &s.inputs,
            Step::IfElse(s) => &s.inputs,
        }
    }

    pub fn outputs(&self) -> &[Socket] {
        match self {
            Step::Input(s) => &s.outputs,
            Step::Output(_) => &[],
            Step::FunctionCall(s) => &s.outputs,
            Step::ObjectAccess(s) => &s.outputs,
            Step::StringMatch(s) => &s.outputs,
            Step::Loop(s) => &s.outputs,
            Step::IfElse(s) => &s.outputs,
        }
    }

    pub fn get_socket(&self, socket_id: &str) -> Option<&Socket> {
        self.inputs()
            .iter()
            .chain(self.outputs())
            .find(|s| s.id == socket_id)
    }

    /// Stamp `dir` on every socket this step owns. Must run once right
    /// after deserialization, before any validation or compilation reads
    /// `socket.dir`.
    pub fn finalize_socket_dirs(&mut self) {
        match self {
            Step::Input(s) => finalize_dirs(&mut [], &mut s.outputs),
            Step::Output(s) => finalize_dirs(&mut s.inputs, &mut []),
            Step::FunctionCall(s) => finalize_dirs(&mut s.inputs, &mut s.outputs),
            Step::ObjectAccess(s) => finalize_dirs(&mut s.inputs, &mut s.outputs),
            Step::StringMatch(s) => finalize_dirs(&mut s.inputs, &mut s.outputs),
            Step::Loop(s) => finalize_dirs(&mut s.inputs, &mut s.outputs),
            Step::IfElse(s) => finalize_dirs(&mut s.inputs, &mut s.outputs),
        }
    }

    /// The required (data-in, data-out, control-in, control-out) arities
    /// for this step's kind (spec.md §3 per-step invariants).
    pub fn required_io(&self) -> (Arity, Arity, Arity, Arity) {
        match self {
            Step::Input(_) => (Arity::exact(0), Arity::at_least(1), Arity::exact(0), Arity::exact(0)),
            Step::Output(_) => (Arity::at_least(1), Arity::exact(0), Arity::exact(0), Arity::exact(0)),
            Step::StringMatch(_) => (Arity::exact(2), Arity::exact(1), Arity::exact(0), Arity::exact(0)),
            Step::ObjectAccess(_) => (Arity::exact(1), Arity::exact(1), Arity::exact(0), Arity::exact(0)),
            Step::FunctionCall(_) => (Arity::at_least(1), Arity { min: 1, max: Some(2) }, Arity::exact(0), Arity::exact(0)),
            Step::Loop(_) => (Arity::exact(0), Arity::exact(0), Arity { min: 1, max: Some(2) }, Arity { min: 1, max: Some(2) }),
            Step::IfElse(_) => (Arity::exact(0), Arity::exact(0), Arity { min: 1, max: Some(2) }, Arity { min: 2, max: Some(3) }),
        }
    }

    fn data_in(&self) -> impl Iterator<Item = &Socket> {
        self.inputs().iter().filter(|s| s.kind == SocketKind::Data)
    }

    fn data_out(&self) -> impl Iterator<Item = &Socket> {
        self.outputs().iter().filter(|s| s.kind == SocketKind::Data)
    }

    fn control_in(&self) -> impl Iterator<Item = &Socket> {
        self.inputs().iter().filter(|s| s.kind == SocketKind::Control)
    }

    fn control_out(&self) -> impl Iterator<Item = &Socket> {
        self.outputs().iter().filter(|s| s.kind == SocketKind::Control)
    }

    /// Check this step's own arity and kind-specific invariants (I2, I5).
    /// Does not check edges or cross-step invariants — see
    /// `ComputeGraph::validate`.
    pub fn validate(&self) -> Result<(), GraphError> {
        let (data_in, data_out, control_in, control_out) = self.required_io();
        let got_data_in = self.data_in().count();
        let got_data_out = self.data_out().count();
        let got_control_in = self.control_in().count();
        let got_control_out = self.control_out().count();

        for (arity, got, label) in [
            (data_in, got_data_in, "data input"),
            (data_out, got_data_out, "data output"),
            (control_in, got_control_in, "control input"),
            (control_out, got_control_out, "control output"),
        ] {
            if !arity.satisfies(got) {
                return Err(GraphError::ArityMismatch(self.id(), label.to_string(), "sockets", got));
            }
        }

        if let Step::FunctionCall(f) = self {
            let module_count = f
                .inputs
                .iter()
                .filter(|s| f.meta_for(&s.id).import_as_module)
                .count();
            if module_count != 1 {
                return Err(GraphError::WrongModuleSocketCount(f.id, module_count));
            }
            let error_count = f
                .outputs
                .iter()
                .filter(|s| f.meta_for(&s.id).handles_error)
                .count();
            let expected = if f.allow_error { 1 } else { 0 };
            if error_count != expected {
                return Err(GraphError::WrongErrorSocketCount(f.id, f.allow_error, error_count));
            }
        }

        Ok(())
    }

    /// Socket ids (on this step) whose connected subgraph is owned by this
    /// step, for `Loop`/`IfElse`.
    pub fn subgraph_socket_ids(&self) -> Vec<&str> {
        match self {
            Step::Loop(l) => {
                let mut ids = vec![l.body_socket.as_str()];
                if let Some(p) = &l.predicate_socket {
                    ids.push(p.as_str());
                }
                ids
            }
            Step::IfElse(e) => vec![
                e.predicate_socket.as_str(),
                e.if_socket.as_str(),
                e.else_socket.as_str(),
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn socket(id: &str, dir: SocketDir) -> Socket {
        Socket::data(id, dir)
    }

    #[test]
    fn input_step_requires_no_inputs_and_at_least_one_output() {
        let step = Step::Input(InputStep {
            id: 1,
            outputs: vec![socket("a", SocketDir::Out)],
            is_user: false,
        });
        assert!(step.validate().is_ok());

        let empty = Step::Input(InputStep {
            id: 2,
            outputs: vec![],
            is_user: false,
        });
        assert!(empty.validate().is_err());
    }

    #[test]
    fn function_call_requires_exactly_one_module_socket() {
        let mut step = FunctionCallStep {
            id: 1,
            inputs: vec![socket("mod", SocketDir::In), socket("arg", SocketDir::In)],
            outputs: vec![socket("out", SocketDir::Out)],
            function_identifier: "solve".into(),
            allow_error: false,
            socket_meta: vec![("mod".into(), FunctionCallMeta { import_as_module: true, ..Default::default() })],
        };
        assert!(Step::FunctionCall(step.clone()).validate().is_ok());

        step.socket_meta.clear();
        assert!(matches!(
            Step::FunctionCall(step).validate(),
            Err(GraphError::WrongModuleSocketCount(1, 0))
        ));
    }

    #[test]
    fn function_call_error_socket_must_match_allow_error() {
        let step = FunctionCallStep {
            id: 1,
            inputs: vec![socket("mod", SocketDir::In)],
            outputs: vec![socket("out", SocketDir::Out)],
            function_identifier: "solve".into(),
            allow_error: true,
            socket_meta: vec![("mod".into(), FunctionCallMeta { import_as_module: true, ..Default::default() })],
        };
        assert!(matches!(
            Step::FunctionCall(step).validate(),
            Err(GraphError::WrongErrorSocketCount(1, true, 0))
        ));
    }

    #[test]
    fn string_match_requires_two_data_in_one_data_out() {
        let step = Step::StringMatch(StringMatchStep {
            id: 1,
            inputs: vec![socket("a", SocketDir::In)],
            outputs: vec![socket("r", SocketDir::Out)],
        });
        assert!(step.validate().is_err());
    }
}
