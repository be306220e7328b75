// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Engine error kinds.
//!
//! Every failure mode a handler can produce is a typed variant; handlers
//! return `(Outcome, EngineError)` pairs through `Result` and never rely on
//! non-local exits.

use crate::store::StoreError;
use foreman_adapters::{AgentProcessError, DeliverError, IssueError, NotifyError};
use foreman_core::{Phase, ProcessId, ProcessStatus, Role, TaskId, TaskStatus};
use thiserror::Error;

/// Errors produced by command handlers
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("process not found: {0}")]
    ProcessNotFound(ProcessId),

    #[error("process {0} is retired")]
    ProcessRetired(ProcessId),

    #[error("process {0} is not ready (status: {1})")]
    ProcessNotReady(ProcessId, ProcessStatus),

    #[error("process {0} is not idle (phase: {1})")]
    ProcessNotIdle(ProcessId, Phase),

    #[error("process {0} is already assigned to task {1}")]
    ProcessAlreadyAssigned(ProcessId, TaskId),

    #[error("process {0} is not implementing (phase: {1})")]
    ProcessNotImplementing(ProcessId, Phase),

    #[error("process {0} is not reviewing (phase: {1})")]
    ProcessNotReviewing(ProcessId, Phase),

    #[error("process {0} is not the implementer of task {1}")]
    ProcessNotImplementer(ProcessId, TaskId),

    #[error("process {0} is not awaiting review (phase: {1})")]
    ProcessNotAwaitingReview(ProcessId, Phase),

    #[error("a coordinator already exists")]
    CoordinatorExists,

    #[error("invalid phase transition {from} -> {to}")]
    InvalidPhaseTransition { from: Phase, to: Phase },

    #[error("invalid verdict: {0}")]
    InvalidVerdict(String),

    #[error("process {0} has no assigned task")]
    NoTaskAssigned(ProcessId),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("task {0} is not approved (status: {1})")]
    TaskNotApproved(TaskId, TaskStatus),

    #[error("task {0} is not awaiting feedback (status: {1})")]
    TaskNotDenied(TaskId, TaskStatus),

    #[error("process {0} has role {1}, expected {2}")]
    UnexpectedRole(ProcessId, Role, Role),

    #[error("mailbox for {0} is empty")]
    QueueEmpty(ProcessId),

    #[error("mailbox for {0} is full (capacity {1})")]
    QueueFull(ProcessId, usize),

    #[error("reviewer {0} is the implementer of task {1}")]
    ReviewerIsImplementer(ProcessId, TaskId),

    #[error("issue store: {0}")]
    Issue(#[from] IssueError),

    #[error("agent runtime: {0}")]
    Agent(#[from] AgentProcessError),

    #[error("deliver to {id} failed: {source}")]
    Deliver {
        id: ProcessId,
        #[source]
        source: DeliverError,
    },

    #[error("handoff post failed: {0}")]
    Handoff(#[from] NotifyError),

    #[error("storage: {0}")]
    Store(#[from] StoreError),
}
