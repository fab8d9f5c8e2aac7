// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! C5: the job & compute-context model the executor consumes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DispatchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    Python,
}

/// Resource limits and flags the executor runs every `Program` in a `Job`
/// under. `language` is PYTHON-only in v1 (spec.md §3), kept as an enum of
/// one variant so a second language is a non-breaking addition later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeContext {
    pub language: Language,
    pub time_limit_secs: i64,
    pub memory_limit_mb: i64,
    #[serde(default)]
    pub extra_flags: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramFile {
    pub name: String,
    pub content: String,
    /// Trusted files are importable directly by compiled step code; untrusted
    /// ones must be invoked through the sandbox worker (spec.md §6, §4.4).
    pub trusted: bool,
}

/// One compiled test case ready to execute: an entrypoint file plus every
/// other file (candidate module, graph-supplied files) it needs on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub entrypoint: String,
    pub files: Vec<ProgramFile>,
}

impl Program {
    fn validate(&self) -> Result<()> {
        if !self.files.iter().any(|f| f.name == self.entrypoint) {
            return Err(DispatchError::EntrypointMissing(self.id, self.entrypoint.clone()));
        }
        Ok(())
    }
}

/// A unit of work dispatched to the executor: one `Program` per test case,
/// run under a shared `ComputeContext`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub programs: Vec<Program>,
    pub context: ComputeContext,
}

impl Job {
    /// Build a fresh job, enforcing I-Job's invariants: every program's
    /// entrypoint is one of its own files; time/memory limits are positive;
    /// there's at least one program (spec.md §3 Job invariants).
    pub fn create(programs: Vec<Program>, context: ComputeContext) -> Result<Self> {
        if programs.is_empty() {
            return Err(DispatchError::EmptyJob);
        }
        if context.time_limit_secs <= 0 {
            return Err(DispatchError::InvalidTimeLimit(context.time_limit_secs));
        }
        if context.memory_limit_mb <= 0 {
            return Err(DispatchError::InvalidMemoryLimit(context.memory_limit_mb));
        }
        for program in &programs {
            program.validate()?;
        }

        Ok(Job {
            id: Uuid::new_v4(),
            programs,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ComputeContext {
        ComputeContext {
            language: Language::Python,
            time_limit_secs: 5,
            memory_limit_mb: 128,
            extra_flags: None,
        }
    }

    fn program(id: i64) -> Program {
        Program {
            id,
            entrypoint: "__entrypoint.py".into(),
            files: vec![ProgramFile { name: "__entrypoint.py".into(), content: "pass".into(), trusted: true }],
        }
    }

    #[test]
    fn create_succeeds_with_valid_programs() {
        assert!(Job::create(vec![program(1)], ctx()).is_ok());
    }

    #[test]
    fn create_rejects_empty_programs() {
        assert!(matches!(Job::create(vec![], ctx()), Err(DispatchError::EmptyJob)));
    }

    #[test]
    fn create_rejects_missing_entrypoint() {
        let mut p = program(1);
        p.entrypoint = "missing.py".into();
        assert!(matches!(
            Job::create(vec![p], ctx()),
            Err(DispatchError::EntrypointMissing(1, _))
        ));
    }

    #[test]
    fn create_assigns_a_fresh_uuid_each_call() {
        let a = Job::create(vec![program(1)], ctx()).unwrap();
        let b = Job::create(vec![program(1)], ctx()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn create_rejects_nonpositive_limits() {
        let mut bad_ctx = ctx();
        bad_ctx.time_limit_secs = 0;
        assert!(matches!(
            Job::create(vec![program(1)], bad_ctx),
            Err(DispatchError::InvalidTimeLimit(0))
        ));
    }
}
