// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The verdict envelope a `Job` comes back as, and the persisted record a
//! `Consumer` reconciles it against (spec.md §4.5, §4.6, §6).

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Ran to completion within limits.
    Ok,
    /// Memory limit exceeded.
    Mle,
    /// Time limit exceeded.
    Tle,
    /// Runtime error (uncaught exception, nonzero exit).
    Rte,
    /// Ran to completion but the grading comparison failed.
    Wa,
}

/// The outcome of running one `Program`, keyed back to it by id (spec.md
/// §6 `results[].id`). The core does not interpret OK vs WA — that's the
/// verdict consumer's policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramResult {
    pub id: i64,
    pub status: Status,
    pub stdout: String,
    pub stderr: String,
    #[serde(default)]
    pub elapsed_time_ns: Option<u64>,
}

/// The verdict envelope a `Consumer` receives from the broker for a `Job`
/// previously published by a `Publisher` (spec.md §6 "Verdict envelope").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub id: Uuid,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub results: Vec<ProgramResult>,
}

/// Terminal lifecycle state of a dispatched job's persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskEvalStatus {
    Pending,
    Success,
    /// The job's record was superseded or withdrawn before a verdict arrived.
    /// No code path transitions a record into this state yet — carried for
    /// persisted-state compatibility with the four-way status column.
    Skipped,
    Failed,
}

/// Persisted lifecycle record for one dispatched job: written
/// `{job_id, status=PENDING, started_at=now}` at dispatch, updated to a
/// terminal state at reconciliation (spec.md §6 "Persisted state contract").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResultRecord {
    pub job_id: Uuid,
    pub status: TaskEvalStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<JobResult>,
}

impl TaskResultRecord {
    pub fn pending(job_id: Uuid, started_at: DateTime<Utc>) -> Self {
        TaskResultRecord {
            job_id,
            status: TaskEvalStatus::Pending,
            started_at,
            completed_at: None,
            result: None,
        }
    }
}

/// Persistence boundary for `TaskResultRecord`s. Deliberately opaque per
/// spec.md §3/§6 — a real deployment backs this with a database table; this
/// crate only needs to read/write records as the reconciliation loop runs.
pub trait ResultStore: Send + Sync {
    fn upsert_pending(&self, job_id: Uuid, started_at: DateTime<Utc>);
    /// Applies a verdict if `job_id` is known and still PENDING, returning
    /// whether it was applied. A `false` return (unknown job, or already
    /// terminal) is a `ReconciliationAnomaly` — the caller logs it and
    /// acknowledges the message regardless, never surfacing it further.
    fn record_result(&self, result: JobResult, completed_at: DateTime<Utc>) -> bool;
    fn get(&self, job_id: Uuid) -> Option<TaskResultRecord>;
}

/// An in-memory `ResultStore`, used by tests and the CLI's `assemble`
/// command (which never actually dispatches a job).
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    records: Mutex<HashMap<Uuid, TaskResultRecord>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        InMemoryResultStore::default()
    }
}

impl ResultStore for InMemoryResultStore {
    fn upsert_pending(&self, job_id: Uuid, started_at: DateTime<Utc>) {
        self.records.lock().unwrap().insert(job_id, TaskResultRecord::pending(job_id, started_at));
    }

    fn record_result(&self, result: JobResult, completed_at: DateTime<Utc>) -> bool {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(&result.id) {
            Some(record) if record.status == TaskEvalStatus::Pending => {
                record.status = if result.success { TaskEvalStatus::Success } else { TaskEvalStatus::Failed };
                record.completed_at = Some(completed_at);
                record.result = Some(result);
                true
            }
            _ => false,
        }
    }

    fn get(&self, job_id: Uuid) -> Option<TaskResultRecord> {
        self.records.lock().unwrap().get(&job_id).cloned()
    }
}
