// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Turn-completion enforcement.
//!
//! Tracks which tools each worker called during its current turn. A worker
//! turn is compliant iff it invoked at least one of the required reporting
//! tools; non-compliant turns get a bounded number of system reminders
//! before being allowed to complete anyway.

use foreman_core::{ProcessId, Role};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Tools that constitute a valid end-of-turn report for a worker.
pub const REQUIRED_TOOLS: [&str; 4] = [
    "post_message",
    "report_implementation_complete",
    "report_review_verdict",
    "signal_ready",
];

#[derive(Default)]
struct TurnState {
    tools_called: HashSet<String>,
    retries: u32,
    newly_spawned: bool,
}

/// Thread-safe per-process turn tracking.
///
/// Tool-call recording happens on the agent event pumps and interleaves
/// with handler execution; everything here takes the one lock.
pub struct TurnEnforcer {
    inner: Mutex<HashMap<ProcessId, TurnState>>,
    max_retries: u32,
}

impl TurnEnforcer {
    pub fn new(max_retries: u32) -> Self {
        Self { inner: Mutex::new(HashMap::new()), max_retries }
    }

    /// Record a tool invocation for the process's current turn.
    pub fn record_tool_call(&self, id: &ProcessId, tool: &str) {
        let mut inner = self.inner.lock();
        inner.entry(id.clone()).or_default().tools_called.insert(tool.to_string());
    }

    /// Missing required tools for the turn just completed.
    ///
    /// Coordinators are always compliant. A worker is compliant when it
    /// called at least one required tool; otherwise the full required list
    /// is returned.
    pub fn check_turn_completion(&self, id: &ProcessId, role: Role) -> Vec<&'static str> {
        if role != Role::Worker {
            return Vec::new();
        }
        let inner = self.inner.lock();
        let called = inner.get(id).map(|s| &s.tools_called);
        let any_required =
            called.is_some_and(|set| REQUIRED_TOOLS.iter().any(|t| set.contains(*t)));
        if any_required {
            Vec::new()
        } else {
            REQUIRED_TOOLS.to_vec()
        }
    }

    /// Start a fresh turn: clears the tool set, the retry counter, and the
    /// newly-spawned flag. Called on delivery of non-system messages only,
    /// so enforcement reminders keep their counters.
    pub fn reset_turn(&self, id: &ProcessId) {
        let mut inner = self.inner.lock();
        inner.insert(id.clone(), TurnState::default());
    }

    /// Exempt the process's first turn from enforcement.
    pub fn mark_as_newly_spawned(&self, id: &ProcessId) {
        let mut inner = self.inner.lock();
        inner.entry(id.clone()).or_default().newly_spawned = true;
    }

    pub fn is_newly_spawned(&self, id: &ProcessId) -> bool {
        self.inner.lock().get(id).is_some_and(|s| s.newly_spawned)
    }

    pub fn should_retry(&self, id: &ProcessId) -> bool {
        self.inner.lock().get(id).map_or(0, |s| s.retries) < self.max_retries
    }

    pub fn increment_retry(&self, id: &ProcessId) {
        let mut inner = self.inner.lock();
        inner.entry(id.clone()).or_default().retries += 1;
    }

    /// Current retry count, for diagnostics.
    pub fn retries(&self, id: &ProcessId) -> u32 {
        self.inner.lock().get(id).map_or(0, |s| s.retries)
    }

    /// The fixed reminder template naming the missing tools.
    pub fn reminder_message(&self, id: &ProcessId, missing: &[&str]) -> String {
        format!(
            "Your turn ended without a required report ({}). Call one of: {}. \
             Use post_message to reach the coordinator, \
             report_implementation_complete when your implementation is done, \
             report_review_verdict when you finish a review, or signal_ready \
             if you have nothing to report.",
            id,
            missing.join(", "),
        )
    }

    /// Retry budget exhausted: log and let the turn complete normally.
    pub fn on_max_retries_exceeded(&self, id: &ProcessId, missing: &[&str]) {
        tracing::warn!(
            process_id = id.as_str(),
            missing = missing.join(","),
            retries = self.max_retries,
            "turn completion retries exhausted, allowing turn to complete"
        );
    }

    /// Drop all state for a process (retirement).
    pub fn cleanup_process(&self, id: &ProcessId) {
        self.inner.lock().remove(id);
    }
}

#[cfg(test)]
#[path = "enforcer_tests.rs"]
mod tests;
