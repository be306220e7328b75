// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Worker phase state machine for the implement/review/commit workflow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A worker's position in the implement/review/commit workflow.
///
/// Only workers carry a phase; coordinators and observers do not. The valid
/// transitions are enumerated in [`Phase::can_transition_to`]; anything not
/// listed there is rejected by the transition handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Implementing,
    AwaitingReview,
    Reviewing,
    AddressingFeedback,
    Committing,
}

impl Phase {
    /// All phases, for exhaustive sweeps in tests.
    pub const ALL: [Phase; 6] = [
        Phase::Idle,
        Phase::Implementing,
        Phase::AwaitingReview,
        Phase::Reviewing,
        Phase::AddressingFeedback,
        Phase::Committing,
    ];

    /// The normative transition table. Self-transitions are not valid.
    pub fn can_transition_to(self, to: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, to),
            (Idle, Implementing)
                | (Idle, Reviewing)
                | (Implementing, Idle)
                | (Implementing, AwaitingReview)
                | (AwaitingReview, Committing)
                | (AwaitingReview, AddressingFeedback)
                | (AwaitingReview, Idle)
                | (Reviewing, Idle)
                | (AddressingFeedback, AwaitingReview)
                | (AddressingFeedback, Idle)
                | (Committing, Idle)
        )
    }

    /// Whether a worker in this phase must hold a task assignment.
    pub fn requires_task(self) -> bool {
        !matches!(self, Phase::Idle)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Implementing => "implementing",
            Phase::AwaitingReview => "awaiting_review",
            Phase::Reviewing => "reviewing",
            Phase::AddressingFeedback => "addressing_feedback",
            Phase::Committing => "committing",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
