// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Agent-reported failure kinds and the stdout event protocol.
//!
//! The agent subprocess runtime is an external collaborator; these are the
//! types that cross its boundary into the core.

use crate::metrics::TurnMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorized failure reasons for an agent turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentFailure {
    /// The agent's context window is exhausted; the process cannot continue.
    ContextExceeded,
    /// Invalid API key or authentication failure.
    Unauthorized,
    /// Exceeded quota or billing issue.
    OutOfCredits,
    /// Rate limited by the API.
    RateLimited,
    /// Other error with message.
    Other(String),
}

impl fmt::Display for AgentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentFailure::ContextExceeded => write!(f, "context exceeded"),
            AgentFailure::Unauthorized => write!(f, "unauthorized"),
            AgentFailure::OutOfCredits => write!(f, "out of credits"),
            AgentFailure::RateLimited => write!(f, "rate limited"),
            AgentFailure::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// One event read from a live agent's stdout stream.
///
/// The registry's per-agent pump translates these into enforcer records,
/// UI output events, and turn-complete commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The agent invoked a tool this turn.
    ToolCalled { tool: String },
    /// Free-form output for the UI stream.
    Output { text: String },
    /// The agent finished its turn.
    TurnCompleted {
        succeeded: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metrics: Option<TurnMetrics>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<AgentFailure>,
    },
}
