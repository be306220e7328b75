// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Turn completion: session capture, enforcement, failure routing, and the
//! normal ready transition.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::prompts;
use foreman_core::{
    AgentFailure, Clock, Command, CommandKind, Event, Process, ProcessId, ProcessStatus,
    QueuedMessage, Role, Sender, TurnMetrics,
};

impl<C: Clock> Engine<C> {
    /// Handle an agent reporting the end of its turn.
    pub(crate) fn handle_turn_complete(
        &self,
        id: &ProcessId,
        succeeded: bool,
        metrics: Option<TurnMetrics>,
        error: Option<AgentFailure>,
    ) -> Result<Outcome, EngineError> {
        let mut process =
            self.processes.get(id).ok_or_else(|| EngineError::ProcessNotFound(id.clone()))?;
        if process.is_retired() {
            return Ok(Outcome::empty());
        }

        let first_turn = !process.has_completed_turn;
        if first_turn && succeeded {
            self.capture_session_ref(&mut process);
        }

        if process.role == Role::Worker && succeeded && !self.enforcer.is_newly_spawned(id) {
            let missing = self.enforcer.check_turn_completion(id, process.role);
            if !missing.is_empty() {
                if self.enforcer.should_retry(id) {
                    return self.remind_and_retry(process, &missing, metrics);
                }
                self.enforcer.on_max_retries_exceeded(id, &missing);
            }
        }

        if !succeeded {
            if process.role == Role::Worker
                && matches!(error, Some(AgentFailure::ContextExceeded))
            {
                return self.fail_context_exhausted(process, metrics);
            }
            // Startup failures and ordinary mid-session failures (the
            // coordinator's context exhaustion included) land here.
            return self.fail_turn(process, metrics, error);
        }

        self.complete_turn(process, metrics)
    }

    /// Persist the agent-reported session identifier, once, and tell the
    /// session-ref sink. Sink failures are logged, not fatal: the turn
    /// itself succeeded.
    fn capture_session_ref(&self, process: &mut Process) {
        let Some(live) = self.registry.get(&process.id) else {
            return;
        };
        let Some(session_ref) = live.agent.session_ref().filter(|s| !s.is_empty()) else {
            return;
        };
        process.session_id = Some(session_ref.clone());
        if let Err(e) = self.session_notifier.notify_session_ref(
            &process.id,
            &session_ref,
            &live.agent.work_dir(),
        ) {
            tracing::warn!(
                process_id = process.id.as_str(),
                error = %e,
                "session ref notification failed"
            );
        }
    }

    /// Non-compliant turn with retries remaining: queue a system reminder
    /// and schedule its delivery. No `Ready` event — the UI would read it
    /// as the worker being done.
    fn remind_and_retry(
        &self,
        mut process: Process,
        missing: &[&str],
        metrics: Option<TurnMetrics>,
    ) -> Result<Outcome, EngineError> {
        let id = process.id.clone();
        self.enforcer.increment_retry(&id);

        let reminder = self.enforcer.reminder_message(&id, missing);
        self.mailboxes
            .enqueue(&id, QueuedMessage::new(reminder, Sender::System))
            .map_err(|e| EngineError::QueueFull(id.clone(), e.capacity))?;

        process.status = ProcessStatus::Ready;
        process.has_completed_turn = true;
        process.last_activity_at_ms = self.clock.epoch_ms();
        if metrics.is_some() {
            process.metrics = metrics.clone();
        }
        self.processes.save(process)?;

        let mut outcome = Outcome::empty().data(serde_json::json!({ "enforcement": true }));
        if let Some(metrics) = metrics {
            outcome.push_event(Event::TokenUsage { id: id.clone(), metrics });
        }
        outcome.push_follow_up(Command::internal(CommandKind::DeliverQueued {
            process_id: id,
        }));
        Ok(outcome)
    }

    /// A worker ran out of context: mark it failed and route a replacement
    /// request to the coordinator's mailbox.
    fn fail_context_exhausted(
        &self,
        mut process: Process,
        metrics: Option<TurnMetrics>,
    ) -> Result<Outcome, EngineError> {
        let id = process.id.clone();
        process.status = ProcessStatus::Failed;
        process.last_activity_at_ms = self.clock.epoch_ms();
        if metrics.is_some() {
            process.metrics = metrics.clone();
        }
        self.processes.save(process.clone())?;

        let mut outcome = Outcome::empty();
        outcome.push_event(Event::StatusChanged {
            id: id.clone(),
            status: ProcessStatus::Failed,
            phase: process.phase,
            task_id: process.task_id.clone(),
        });
        outcome.push_event(Event::ProcessError {
            id: id.clone(),
            error: AgentFailure::ContextExceeded.to_string(),
        });
        if let Some(metrics) = metrics {
            outcome.push_event(Event::TokenUsage { id: id.clone(), metrics });
        }

        if let Some(coordinator) = self.processes.get_coordinator() {
            let message = prompts::context_exhausted(&id, process.task_id.as_ref());
            self.mailboxes
                .enqueue(&coordinator.id, QueuedMessage::new(message, Sender::System))
                .map_err(|e| EngineError::QueueFull(coordinator.id.clone(), e.capacity))?;
            outcome.push_follow_up(Command::internal(CommandKind::DeliverQueued {
                process_id: coordinator.id,
            }));
        } else {
            tracing::warn!(
                process_id = id.as_str(),
                "worker context exhausted with no coordinator to notify"
            );
        }
        Ok(outcome)
    }

    /// Turn failure: terminal `failed` status with an error event.
    fn fail_turn(
        &self,
        mut process: Process,
        metrics: Option<TurnMetrics>,
        error: Option<AgentFailure>,
    ) -> Result<Outcome, EngineError> {
        let id = process.id.clone();
        process.status = ProcessStatus::Failed;
        process.last_activity_at_ms = self.clock.epoch_ms();
        if metrics.is_some() {
            process.metrics = metrics.clone();
        }
        self.processes.save(process.clone())?;

        let error = error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "agent turn failed".to_string());
        let mut events = vec![
            Event::StatusChanged {
                id: id.clone(),
                status: ProcessStatus::Failed,
                phase: process.phase,
                task_id: process.task_id,
            },
            Event::ProcessError { id: id.clone(), error },
        ];
        if let Some(metrics) = metrics {
            events.push(Event::TokenUsage { id, metrics });
        }
        Ok(Outcome::with_events(events))
    }

    /// Normal completion: back to ready, deliver anything queued.
    fn complete_turn(
        &self,
        mut process: Process,
        metrics: Option<TurnMetrics>,
    ) -> Result<Outcome, EngineError> {
        let id = process.id.clone();
        process.has_completed_turn = true;
        process.last_activity_at_ms = self.clock.epoch_ms();
        if metrics.is_some() {
            process.metrics = metrics.clone();
        }

        // A pause issued mid-turn sticks: record the activity but do not
        // wake the process or deliver queued messages.
        let paused = process.status == ProcessStatus::Paused;
        if !paused {
            process.status = ProcessStatus::Ready;
        }
        self.processes.save(process)?;

        let mut outcome = Outcome::empty();
        if !paused {
            outcome.push_event(Event::Ready { id: id.clone() });
        }
        if let Some(metrics) = metrics {
            outcome.push_event(Event::TokenUsage { id: id.clone(), metrics });
        }
        if !paused && !self.mailboxes.is_empty(&id) {
            outcome.push_follow_up(Command::internal(CommandKind::DeliverQueued {
                process_id: id,
            }));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "turn_tests.rs"]
mod tests;
