// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Problem definitions: a question's test cases plus the inputs a
//! candidate submission must supply, and the assembly of a submission into
//! a dispatchable [`gradeforge_dispatch::Job`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use gradeforge_compiler::compile_to_sandboxed_program;
use gradeforge_dsl::{ComputeGraph, ComputeGraphSpec, InputStep, Literal, Socket, SocketDir, Step};

use gradeforge_dispatch::{ComputeContext, Job, Program, ProgramFile};

use crate::error::{EvalError, Result};

/// Node id reserved for the `InputStep` synthesized from candidate-supplied
/// values. Test-case graphs reference it in their edges without ever
/// carrying it themselves — it's injected at assembly time.
pub const USER_INPUT_STEP_ID: i64 = 0;

const ENTRYPOINT: &str = "__entrypoint.py";

/// One value a candidate submission must supply, identified by the id its
/// graph's edges reference on the synthesized input step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredInput {
    pub id: String,
    pub data: Literal,
}

/// A single test case: its own steps/edges, validated once the candidate's
/// input step has been spliced in (see [`evaluate_submission`]).
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: i64,
    #[serde(flatten)]
    pub spec: ComputeGraphSpec,
}

/// A question: its test cases, the inputs a candidate must provide, and the
/// resource limits every test case runs under.
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemDefinition {
    pub question: String,
    pub environment: ComputeContext,
    pub required_inputs: Vec<RequiredInput>,
    pub testcases: Vec<TestCase>,
}

/// Build the `InputStep` a candidate's supplied values become: one output
/// socket per value, each carrying that value as a literal. Always `id =
/// USER_INPUT_STEP_ID`, so test-case edges that reference node 0 resolve
/// once this step is spliced into the graph.
pub fn create_input_step(user_inputs: &[RequiredInput]) -> InputStep {
    InputStep {
        id: USER_INPUT_STEP_ID,
        outputs: user_inputs
            .iter()
            .map(|input| Socket::data(input.id.clone(), SocketDir::Out).with_literal(input.data.clone()))
            .collect(),
        is_user: true,
    }
}

/// Validate that every declared required input was supplied, splice the
/// synthesized input step into each test case, compile and sandbox the
/// result, and collect the files each resulting `Program` needs to run.
pub fn evaluate_submission(
    problem: &ProblemDefinition,
    user_inputs: &[RequiredInput],
) -> Result<Vec<Program>> {
    for required in &problem.required_inputs {
        if !user_inputs.iter().any(|supplied| supplied.id == required.id) {
            return Err(EvalError::MissingRequiredInput(required.id.clone()));
        }
    }
    for supplied in user_inputs {
        if !problem.required_inputs.iter().any(|required| required.id == supplied.id) {
            return Err(EvalError::UnexpectedInput(supplied.id.clone()));
        }
    }

    let input_step = Step::Input(create_input_step(user_inputs));

    let mut programs = Vec::with_capacity(problem.testcases.len());
    for testcase in &problem.testcases {
        let mut steps = testcase.spec.steps.clone();
        steps.push(input_step.clone());
        let graph = ComputeGraph::new(ComputeGraphSpec { steps, edges: testcase.spec.edges.clone() })?;

        let program_text = compile_to_sandboxed_program(&graph)?;
        debug!(testcase_id = testcase.id, "assembled program");

        // File literals on the injected input step's output sockets must be
        // written to disk alongside the entrypoint for the module they back
        // to be importable.
        let mut files: Vec<ProgramFile> = graph
            .steps()
            .iter()
            .filter_map(|step| match step {
                Step::Input(input) => Some(input),
                _ => None,
            })
            .flat_map(|input| input.outputs.iter())
            .filter_map(|socket| socket.literal.as_ref().and_then(Literal::as_file))
            .map(|file| ProgramFile { name: file.path.clone(), content: file.content.clone(), trusted: file.trusted })
            .collect();

        files.push(ProgramFile { name: ENTRYPOINT.to_string(), content: program_text, trusted: true });

        programs.push(Program { id: testcase.id, entrypoint: ENTRYPOINT.to_string(), files });
    }

    Ok(programs)
}

/// Assemble a full submission into a `Job` ready for `gradeforge-dispatch`
/// to publish.
pub fn assemble_job(problem: &ProblemDefinition, user_inputs: &[RequiredInput]) -> Result<Job> {
    let programs = evaluate_submission(problem, user_inputs)?;
    Ok(Job::create(programs, problem.environment.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradeforge_dsl::{Edge, OutputStep};
    use gradeforge_dispatch::Language;

    fn problem() -> ProblemDefinition {
        ProblemDefinition {
            question: "double the input".into(),
            environment: ComputeContext {
                language: Language::Python,
                time_limit_secs: 5,
                memory_limit_mb: 128,
                extra_flags: None,
            },
            required_inputs: vec![RequiredInput { id: "x".into(), data: Literal::Int(0) }],
            testcases: vec![TestCase {
                id: 1,
                spec: ComputeGraphSpec {
                    steps: vec![Step::Output(OutputStep {
                        id: 2,
                        inputs: vec![Socket::data("r", SocketDir::In)],
                        output_meta: vec![],
                    })],
                    edges: vec![Edge {
                        id: 1,
                        from_node: USER_INPUT_STEP_ID,
                        from_socket: "x".into(),
                        to_node: 2,
                        to_socket: "r".into(),
                    }],
                },
            }],
        }
    }

    #[test]
    fn create_input_step_carries_one_output_per_required_input() {
        let step = create_input_step(&[
            RequiredInput { id: "a".into(), data: Literal::Int(1) },
            RequiredInput { id: "b".into(), data: Literal::Str("hi".into()) },
        ]);
        assert_eq!(step.id, USER_INPUT_STEP_ID);
        assert_eq!(step.outputs.len(), 2);
        assert!(step.is_user);
    }

    #[test]
    fn evaluate_submission_rejects_missing_required_input() {
        let problem = problem();
        let result = evaluate_submission(&problem, &[]);
        assert!(matches!(result, Err(EvalError::MissingRequiredInput(id)) if id == "x"));
    }

    #[test]
    fn evaluate_submission_rejects_unexpected_input() {
        let problem = problem();
        let result = evaluate_submission(
            &problem,
            &[
                RequiredInput { id: "x".into(), data: Literal::Int(42) },
                RequiredInput { id: "y".into(), data: Literal::Int(0) },
            ],
        );
        assert!(matches!(result, Err(EvalError::UnexpectedInput(id)) if id == "y"));
    }

    #[test]
    fn evaluate_submission_assembles_one_program_per_testcase() {
        let problem = problem();
        let programs =
            evaluate_submission(&problem, &[RequiredInput { id: "x".into(), data: Literal::Int(42) }]).unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].id, 1);
        assert!(programs[0].files.iter().any(|f| f.name == "__entrypoint.py"));
    }

    #[test]
    fn assemble_job_produces_a_job_with_valid_limits() {
        let problem = problem();
        let job = assemble_job(&problem, &[RequiredInput { id: "x".into(), data: Literal::Int(42) }]).unwrap();
        assert_eq!(job.programs.len(), 1);
    }
}
