// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! gradeforge CLI.
//!
//! `assemble` is the only command that actually runs anything in this
//! workspace: it compiles every test case of a problem definition against
//! supplied candidate input and prints the resulting program text, without
//! publishing a job. `init`/`seed` are stubs documenting the external
//! permission-service and database boundary this crate doesn't reimplement.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use gradeforge_eval::{evaluate_submission, ProblemDefinition, RequiredInput};

#[derive(Parser)]
#[command(name = "gradeforge")]
#[command(about = "Compile and assemble gradeforge test-case graphs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a problem definition's test cases against candidate input
    /// and print the assembled Python programs.
    Assemble {
        /// Path to a ProblemDefinition JSON file.
        problem: PathBuf,
        /// Path to a JSON array of RequiredInput values to compile against.
        #[arg(short, long)]
        inputs: PathBuf,
    },
    /// Initialize the permission schema the evaluation service authorizes
    /// against. Delegates to the permission service; not reimplemented here.
    Init,
    /// Seed permission tuples (or sample problem data) into the database
    /// the evaluation service runs against. Delegates to that database;
    /// not reimplemented here.
    Seed,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gradeforge=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assemble { problem, inputs } => assemble(&problem, &inputs),
        Commands::Init => {
            info!("gradeforge init is a stub: run the permission service's own schema init");
            println!("Permission schema initialization is handled by the permission service.");
            println!("This command does not reimplement it; see deployment docs for the bootstrap step.");
            Ok(())
        }
        Commands::Seed => {
            info!("gradeforge seed is a stub: run the permission service's/database's own seed step");
            println!("Database and permission-tuple seeding are handled outside this crate.");
            println!("This command does not reimplement them; see deployment docs for the seed step.");
            Ok(())
        }
    }
}

fn assemble(problem_path: &PathBuf, inputs_path: &PathBuf) -> Result<()> {
    let problem_json = std::fs::read_to_string(problem_path)
        .with_context(|| format!("reading problem definition at {}", problem_path.display()))?;
    let problem: ProblemDefinition =
        serde_json::from_str(&problem_json).context("parsing problem definition")?;

    let inputs_json = std::fs::read_to_string(inputs_path)
        .with_context(|| format!("reading required inputs at {}", inputs_path.display()))?;
    let user_inputs: Vec<RequiredInput> =
        serde_json::from_str(&inputs_json).context("parsing required inputs")?;

    info!(question = %problem.question, testcases = problem.testcases.len(), "assembling submission");

    let programs = evaluate_submission(&problem, &user_inputs)?;
    for program in programs {
        println!("--- testcase {} ---", program.id);
        for file in &program.files {
            if file.name == program.entrypoint {
                println!("{}", file.content);
            }
        }
    }

    Ok(())
}
