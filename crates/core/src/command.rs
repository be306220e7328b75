// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! The command model: the only way state is mutated.
//!
//! Every external stimulus (user input, MCP tool call, agent turn
//! completion) enters the core as a [`Command`] and is serialized through
//! the dispatcher. Handlers may enqueue further commands as follow-ups.

use crate::agent::AgentFailure;
use crate::id::{ProcessId, TaskId};
use crate::metrics::TurnMetrics;
use crate::phase::Phase;
use crate::process::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a command originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandSource {
    /// Direct user input (CLI or UI).
    User,
    /// Produced inside the core (follow-ups, agent event pumps).
    Internal,
    /// An MCP tool call made by an agent.
    McpTool,
}

impl fmt::Display for CommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandSource::User => "user",
            CommandSource::Internal => "internal",
            CommandSource::McpTool => "mcp_tool",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Denied,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verdict::Approved => "approved",
            Verdict::Denied => "denied",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Verdict::Approved),
            "denied" => Ok(Verdict::Denied),
            other => Err(other.to_string()),
        }
    }
}

/// Kind of review being assigned; only affects the prompt wording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewKind {
    #[default]
    Standard,
    /// A re-review after feedback was addressed.
    FollowUp,
}

impl fmt::Display for ReviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReviewKind::Standard => "standard",
            ReviewKind::FollowUp => "follow_up",
        };
        write!(f, "{}", name)
    }
}

/// Options forwarded to the agent spawner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentOptions {
    /// Agent flavor to launch (spawner-specific).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    /// Prompt delivered to the agent on startup (e.g. the coordinator
    /// replacement handoff instructions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_prompt: Option<String>,
}

/// A command envelope: payload plus source tag and optional trace id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub source: CommandSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(flatten)]
    pub kind: CommandKind,
}

impl Command {
    pub fn new(source: CommandSource, kind: CommandKind) -> Self {
        Self { source, trace_id: None, kind }
    }

    /// A command produced inside the core (follow-ups, event pumps).
    pub fn internal(kind: CommandKind) -> Self {
        Self::new(CommandSource::Internal, kind)
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Command name for log spans (e.g. "spawn_process").
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// The closed set of state-changing operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandKind {
    SpawnProcess {
        role: Role,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        process_id: Option<ProcessId>,
        #[serde(default)]
        options: AgentOptions,
    },
    RetireProcess {
        process_id: ProcessId,
        reason: String,
    },
    StopProcess {
        process_id: ProcessId,
        #[serde(default)]
        force: bool,
        reason: String,
    },
    PauseProcess {
        process_id: ProcessId,
    },
    ResumeProcess {
        process_id: ProcessId,
    },
    ReplaceProcess {
        process_id: ProcessId,
        reason: String,
    },
    ReplaceCoordinator {
        reason: String,
    },
    SendToProcess {
        process_id: ProcessId,
        content: String,
    },
    DeliverQueued {
        process_id: ProcessId,
    },
    TurnComplete {
        process_id: ProcessId,
        succeeded: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metrics: Option<TurnMetrics>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<AgentFailure>,
    },
    Broadcast {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        exclude: Vec<ProcessId>,
    },
    AssignTask {
        worker_id: ProcessId,
        task_id: TaskId,
        summary: String,
    },
    AssignReview {
        reviewer_id: ProcessId,
        task_id: TaskId,
        implementer_id: ProcessId,
        #[serde(default)]
        review_kind: ReviewKind,
    },
    ReportComplete {
        worker_id: ProcessId,
        summary: String,
    },
    ReportVerdict {
        worker_id: ProcessId,
        verdict: Verdict,
        comments: String,
    },
    ApproveCommit {
        implementer_id: ProcessId,
        task_id: TaskId,
    },
    AssignReviewFeedback {
        implementer_id: ProcessId,
        task_id: TaskId,
        feedback: String,
    },
    TransitionPhase {
        worker_id: ProcessId,
        phase: Phase,
    },
    NotifyUser {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phase: Option<Phase>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
    },
}

impl CommandKind {
    /// Command name for log spans (e.g. "spawn_process")
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::SpawnProcess { .. } => "spawn_process",
            CommandKind::RetireProcess { .. } => "retire_process",
            CommandKind::StopProcess { .. } => "stop_process",
            CommandKind::PauseProcess { .. } => "pause_process",
            CommandKind::ResumeProcess { .. } => "resume_process",
            CommandKind::ReplaceProcess { .. } => "replace_process",
            CommandKind::ReplaceCoordinator { .. } => "replace_coordinator",
            CommandKind::SendToProcess { .. } => "send_to_process",
            CommandKind::DeliverQueued { .. } => "deliver_queued",
            CommandKind::TurnComplete { .. } => "turn_complete",
            CommandKind::Broadcast { .. } => "broadcast",
            CommandKind::AssignTask { .. } => "assign_task",
            CommandKind::AssignReview { .. } => "assign_review",
            CommandKind::ReportComplete { .. } => "report_complete",
            CommandKind::ReportVerdict { .. } => "report_verdict",
            CommandKind::ApproveCommit { .. } => "approve_commit",
            CommandKind::AssignReviewFeedback { .. } => "assign_review_feedback",
            CommandKind::TransitionPhase { .. } => "transition_phase",
            CommandKind::NotifyUser { .. } => "notify_user",
        }
    }

    /// Key-value pairs for structured logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CommandKind::SpawnProcess { role, process_id, .. } => {
                let mut fields = vec![("role", role.to_string())];
                if let Some(id) = process_id {
                    fields.push(("process_id", id.to_string()));
                }
                fields
            }
            CommandKind::RetireProcess { process_id, reason }
            | CommandKind::ReplaceProcess { process_id, reason } => {
                vec![("process_id", process_id.to_string()), ("reason", reason.clone())]
            }
            CommandKind::StopProcess { process_id, force, reason } => vec![
                ("process_id", process_id.to_string()),
                ("force", force.to_string()),
                ("reason", reason.clone()),
            ],
            CommandKind::PauseProcess { process_id }
            | CommandKind::ResumeProcess { process_id }
            | CommandKind::DeliverQueued { process_id }
            | CommandKind::SendToProcess { process_id, .. } => {
                vec![("process_id", process_id.to_string())]
            }
            CommandKind::ReplaceCoordinator { reason } => vec![("reason", reason.clone())],
            CommandKind::TurnComplete { process_id, succeeded, .. } => vec![
                ("process_id", process_id.to_string()),
                ("succeeded", succeeded.to_string()),
            ],
            CommandKind::Broadcast { exclude, .. } => {
                vec![("excluded", exclude.len().to_string())]
            }
            CommandKind::AssignTask { worker_id, task_id, .. } => {
                vec![("worker_id", worker_id.to_string()), ("task_id", task_id.to_string())]
            }
            CommandKind::AssignReview { reviewer_id, task_id, implementer_id, review_kind } => {
                vec![
                    ("reviewer_id", reviewer_id.to_string()),
                    ("task_id", task_id.to_string()),
                    ("implementer_id", implementer_id.to_string()),
                    ("review_kind", review_kind.to_string()),
                ]
            }
            CommandKind::ReportComplete { worker_id, .. } => {
                vec![("worker_id", worker_id.to_string())]
            }
            CommandKind::ReportVerdict { worker_id, verdict, .. } => {
                vec![("worker_id", worker_id.to_string()), ("verdict", verdict.to_string())]
            }
            CommandKind::ApproveCommit { implementer_id, task_id }
            | CommandKind::AssignReviewFeedback { implementer_id, task_id, .. } => vec![
                ("implementer_id", implementer_id.to_string()),
                ("task_id", task_id.to_string()),
            ],
            CommandKind::TransitionPhase { worker_id, phase } => {
                vec![("worker_id", worker_id.to_string()), ("phase", phase.to_string())]
            }
            CommandKind::NotifyUser { task_id, .. } => match task_id {
                Some(id) => vec![("task_id", id.to_string())],
                None => vec![],
            },
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
