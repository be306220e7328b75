// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Tiered process termination: graceful cancel with timed escalation, or
//! immediate kill by native pid.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::signal;
use foreman_core::{Clock, Event, Phase, ProcessId, ProcessStatus, Role};

impl<C: Clock> Engine<C> {
    /// Stop a process. Idempotent on stopped/retired.
    ///
    /// Without `force`, a worker in the committing phase is left alone (a
    /// kill mid-commit can corrupt the repository); the result carries a
    /// warning instead.
    pub(crate) async fn handle_stop(
        &self,
        id: &ProcessId,
        force: bool,
        reason: &str,
    ) -> Result<Outcome, EngineError> {
        let process =
            self.processes.get(id).ok_or_else(|| EngineError::ProcessNotFound(id.clone()))?;
        if matches!(process.status, ProcessStatus::Stopped | ProcessStatus::Retired) {
            return Ok(Outcome::empty().data(serde_json::json!({ "stopped": false })));
        }

        if process.role == Role::Worker && process.phase == Some(Phase::Committing) && !force {
            return Ok(Outcome::with_events(vec![Event::Output {
                id: id.clone(),
                output: format!(
                    "Not stopping {}: worker is in Committing phase; re-run with force to override",
                    id
                ),
            }])
            .data(serde_json::json!({ "stopped": false, "committing": true })));
        }

        tracing::info!(process_id = id.as_str(), force, reason, "stopping process");
        let graceful = self.terminate_live_agent(id, force).await;
        self.finalize_stop(id, graceful).await
    }

    /// Terminate the live agent, if any. Returns whether the exit was
    /// graceful; an absent agent counts as graceful.
    async fn terminate_live_agent(&self, id: &ProcessId, force: bool) -> bool {
        let Some(live) = self.registry.get(id) else {
            return true;
        };

        let graceful = if force {
            if let Some(pid) = live.agent.pid() {
                signal::kill_pid(pid);
            }
            false
        } else {
            if let Err(e) = live.agent.cancel().await {
                tracing::warn!(process_id = id.as_str(), error = %e, "cancel request failed");
            }
            match tokio::time::timeout(self.config.graceful_stop_timeout, live.agent.wait()).await
            {
                Ok(_) => true,
                Err(_) => {
                    tracing::warn!(
                        process_id = id.as_str(),
                        timeout_ms = self.config.graceful_stop_timeout.as_millis() as u64,
                        "graceful stop timed out, escalating to kill"
                    );
                    if let Some(pid) = live.agent.pid() {
                        signal::kill_pid(pid);
                    }
                    false
                }
            }
        };

        self.registry.remove(id);
        graceful
    }

    /// Clear task references, drain the mailbox, and mark stopped.
    async fn finalize_stop(&self, id: &ProcessId, graceful: bool) -> Result<Outcome, EngineError> {
        let mut process =
            self.processes.get(id).ok_or_else(|| EngineError::ProcessNotFound(id.clone()))?;

        if let Some(task_id) = process.task_id.take() {
            if let Some(mut task) = self.tasks.get(&task_id) {
                task.clear_process(id);
                self.tasks.save(task)?;
            }
        }
        if process.role == Role::Worker {
            process.phase = Some(Phase::Idle);
        }

        let dropped = self.mailboxes.drain(id);
        process.status = ProcessStatus::Stopped;
        self.processes.save(process.clone())?;

        if process.role == Role::Observer {
            if let Err(e) = self.fabric.unsubscribe_all(id).await {
                tracing::warn!(process_id = id.as_str(), error = %e, "observer unsubscribe failed");
            }
        }

        let mut events = vec![Event::StatusChanged {
            id: id.clone(),
            status: ProcessStatus::Stopped,
            phase: process.phase,
            task_id: None,
        }];
        if !dropped.is_empty() {
            events.push(Event::QueueChanged { id: id.clone(), size: 0 });
        }
        Ok(Outcome::with_events(events)
            .data(serde_json::json!({ "stopped": true, "graceful": graceful })))
    }
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod tests;
