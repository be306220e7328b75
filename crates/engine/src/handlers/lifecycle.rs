// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Process lifecycle: spawn, retire, pause, resume.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::registry::PumpSinks;
use foreman_core::{
    AgentOptions, Clock, Command, CommandKind, Event, Process, ProcessId, ProcessStatus, Role,
    COORDINATOR_ID,
};

impl<C: Clock> Engine<C> {
    /// Create a process row and, when a spawner is configured, a live agent.
    pub(crate) async fn handle_spawn(
        &self,
        role: Role,
        process_id: Option<ProcessId>,
        options: AgentOptions,
    ) -> Result<Outcome, EngineError> {
        let id = match role {
            Role::Coordinator => {
                if self.processes.get_coordinator().is_some() {
                    return Err(EngineError::CoordinatorExists);
                }
                ProcessId::new(COORDINATOR_ID)
            }
            Role::Worker => {
                process_id.unwrap_or_else(|| ProcessId::worker(self.processes.next_worker_number()))
            }
            Role::Observer => process_id
                .unwrap_or_else(|| ProcessId::new(format!("observer-{}", nanoid::nanoid!(6)))),
        };

        let now = self.clock.epoch_ms();
        let mut process = Process::new(id.clone(), role, now);
        self.processes.save(process.clone())?;

        let mut spawned_live = false;
        if let Some(ref spawner) = self.spawner {
            // The row is already saved: a failed spawn leaves a pending,
            // unusable process that records the attempt.
            let spawned = spawner.spawn_process(&id, role, &options).await?;
            self.registry.register(
                &id,
                spawned,
                PumpSinks {
                    submitter: self.submitter.clone(),
                    events: self.agent_output.clone(),
                    enforcer: self.enforcer.clone(),
                },
            );
            spawned_live = true;
        }

        process.status =
            if spawned_live { ProcessStatus::Working } else { ProcessStatus::Ready };
        self.processes.save(process)?;

        self.enforcer.mark_as_newly_spawned(&id);

        tracing::info!(process_id = id.as_str(), role = %role, live = spawned_live, "spawned");
        Ok(Outcome::with_events(vec![Event::ProcessSpawned { id: id.clone(), role }])
            .data(serde_json::json!({ "process_id": id })))
    }

    /// Permanently remove a process from service. Idempotent on retired.
    pub(crate) fn handle_retire(
        &self,
        id: &ProcessId,
        reason: &str,
    ) -> Result<Outcome, EngineError> {
        let mut process =
            self.processes.get(id).ok_or_else(|| EngineError::ProcessNotFound(id.clone()))?;
        if process.is_retired() {
            return Ok(Outcome::empty());
        }

        process.status = ProcessStatus::Retired;
        process.retired_at_ms = Some(self.clock.epoch_ms());
        self.processes.save(process.clone())?;

        if let Some(live) = self.registry.remove(id) {
            tracing::info!(
                process_id = id.as_str(),
                running = live.agent.is_running(),
                reason,
                "retired live agent"
            );
        }

        self.enforcer.cleanup_process(id);

        // A retired process's mailbox is drained and stays empty.
        let dropped = self.mailboxes.drain(id);
        self.mailboxes.remove(id);

        let mut events = vec![Event::StatusChanged {
            id: id.clone(),
            status: ProcessStatus::Retired,
            phase: process.phase,
            task_id: process.task_id.clone(),
        }];
        if !dropped.is_empty() {
            events.push(Event::QueueChanged { id: id.clone(), size: 0 });
        }
        Ok(Outcome::with_events(events))
    }

    /// Suspend a ready or working process. Idempotent on paused.
    pub(crate) fn handle_pause(&self, id: &ProcessId) -> Result<Outcome, EngineError> {
        let mut process =
            self.processes.get(id).ok_or_else(|| EngineError::ProcessNotFound(id.clone()))?;
        if process.status == ProcessStatus::Paused {
            return Ok(Outcome::empty());
        }
        if process.is_retired() {
            return Err(EngineError::ProcessRetired(id.clone()));
        }
        if !process.status.can_transition_to(ProcessStatus::Paused) {
            return Err(EngineError::ProcessNotReady(id.clone(), process.status));
        }

        process.status = ProcessStatus::Paused;
        self.processes.save(process.clone())?;

        Ok(Outcome::with_events(vec![Event::StatusChanged {
            id: id.clone(),
            status: ProcessStatus::Paused,
            phase: process.phase,
            task_id: process.task_id,
        }]))
    }

    /// Bring a paused or stopped process back to ready. Idempotent on
    /// ready/working.
    pub(crate) fn handle_resume(&self, id: &ProcessId) -> Result<Outcome, EngineError> {
        let mut process =
            self.processes.get(id).ok_or_else(|| EngineError::ProcessNotFound(id.clone()))?;
        if matches!(process.status, ProcessStatus::Ready | ProcessStatus::Working) {
            return Ok(Outcome::empty());
        }
        if process.is_retired() {
            return Err(EngineError::ProcessRetired(id.clone()));
        }
        if !matches!(process.status, ProcessStatus::Paused | ProcessStatus::Stopped) {
            return Err(EngineError::ProcessNotReady(id.clone(), process.status));
        }

        process.status = ProcessStatus::Ready;
        self.processes.save(process.clone())?;

        let mut outcome = Outcome::with_events(vec![Event::StatusChanged {
            id: id.clone(),
            status: ProcessStatus::Ready,
            phase: process.phase,
            task_id: process.task_id,
        }]);
        // Anything queued while suspended gets delivered now that the
        // process is observable as ready.
        if !self.mailboxes.is_empty(id) {
            outcome.push_follow_up(Command::internal(CommandKind::DeliverQueued {
                process_id: id.clone(),
            }));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
