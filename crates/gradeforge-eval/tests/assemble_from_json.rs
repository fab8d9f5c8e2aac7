// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! End-to-end: parse a `ProblemDefinition` from a JSON file on disk and
//! assemble it against candidate input into dispatchable programs.

use std::io::Write;

use tempfile::NamedTempFile;

use gradeforge_dsl::Literal;
use gradeforge_eval::{evaluate_submission, EvalError, ProblemDefinition, RequiredInput};

fn write_fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write fixture");
    file
}

const PROBLEM_JSON: &str = r#"
{
  "question": "double the input",
  "environment": {
    "language": "PYTHON",
    "time_limit_secs": 5,
    "memory_limit_mb": 128,
    "extra_flags": null
  },
  "required_inputs": [
    { "id": "x", "data": 0 }
  ],
  "testcases": [
    {
      "id": 1,
      "steps": [
        {
          "type": "Output",
          "id": 2,
          "inputs": [{ "id": "r", "kind": "DATA" }],
          "output_meta": []
        }
      ],
      "edges": [
        { "id": 1, "from_node": 0, "from_socket": "x", "to_node": 2, "to_socket": "r" }
      ]
    }
  ]
}
"#;

#[test]
fn assembles_program_from_problem_definition_file() {
    let problem_file = write_fixture(PROBLEM_JSON);
    let problem_json = std::fs::read_to_string(problem_file.path()).unwrap();
    let problem: ProblemDefinition = serde_json::from_str(&problem_json).unwrap();

    let inputs_json = r#"[{ "id": "x", "data": 42 }]"#;
    let inputs_file = write_fixture(inputs_json);
    let inputs_json = std::fs::read_to_string(inputs_file.path()).unwrap();
    let user_inputs: Vec<RequiredInput> = serde_json::from_str(&inputs_json).unwrap();

    let programs = evaluate_submission(&problem, &user_inputs).unwrap();
    assert_eq!(programs.len(), 1);

    let entrypoint = programs[0]
        .files
        .iter()
        .find(|f| f.name == programs[0].entrypoint)
        .expect("entrypoint file present");
    assert!(entrypoint.content.contains("json.dumps"));
    assert!(entrypoint.content.contains("if __name__ == \"__main__\":"));
}

#[test]
fn rejects_submission_missing_required_input() {
    let problem: ProblemDefinition = serde_json::from_str(PROBLEM_JSON).unwrap();
    let result = evaluate_submission(&problem, &[]);
    assert!(result.is_err());
}

#[test]
fn rejects_submission_with_an_id_not_in_required_inputs() {
    let problem: ProblemDefinition = serde_json::from_str(PROBLEM_JSON).unwrap();
    let user_inputs = vec![
        RequiredInput { id: "x".into(), data: Literal::Int(42) },
        RequiredInput { id: "y".into(), data: Literal::Int(0) },
    ];
    let result = evaluate_submission(&problem, &user_inputs);
    assert!(matches!(result, Err(EvalError::UnexpectedInput(id)) if id == "y"));
}
