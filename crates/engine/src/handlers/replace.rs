// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Process replacement: retire-and-respawn for workers, and the guarded
//! handoff procedure for the coordinator.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::prompts;
use foreman_core::{
    AgentOptions, Clock, Command, CommandKind, ProcessId, ProcessStatus, Role, COORDINATOR_ID,
};

impl<C: Clock> Engine<C> {
    /// Replace a worker: retire the old process and spawn a fresh one with a
    /// newly generated id. Runs as two follow-ups so each step goes through
    /// its own handler, serialized ahead of external commands.
    pub(crate) fn handle_replace_process(
        &self,
        id: &ProcessId,
        reason: &str,
    ) -> Result<Outcome, EngineError> {
        let process =
            self.processes.get(id).ok_or_else(|| EngineError::ProcessNotFound(id.clone()))?;
        if process.role != Role::Worker {
            return Err(EngineError::UnexpectedRole(id.clone(), process.role, Role::Worker));
        }

        let mut outcome = Outcome::empty();
        outcome.push_follow_up(Command::internal(CommandKind::RetireProcess {
            process_id: id.clone(),
            reason: reason.to_string(),
        }));
        outcome.push_follow_up(Command::internal(CommandKind::SpawnProcess {
            role: Role::Worker,
            process_id: None,
            options: AgentOptions::default(),
        }));
        Ok(outcome)
    }

    /// Replace the coordinator: post a handoff note, wait for the current
    /// turn to drain, stop and retire the incumbent, then spawn a successor
    /// under the same well-known id with a replace prompt.
    pub(crate) async fn handle_replace_coordinator(
        &self,
        reason: &str,
    ) -> Result<Outcome, EngineError> {
        let coordinator = self
            .processes
            .get_coordinator()
            .ok_or_else(|| EngineError::ProcessNotFound(ProcessId::new(COORDINATOR_ID)))?;
        let id = coordinator.id.clone();

        // The handoff note is the successor's only context; failing to post
        // it aborts the replacement before any state changes.
        self.poster.post_handoff(&prompts::coordinator_handoff(reason)).await?;

        if coordinator.status == ProcessStatus::Working {
            if let Some(live) = self.registry.get(&id) {
                // The pump notifies turn_done from the agent stream, so this
                // observes completion even while the dispatcher is blocked
                // here.
                let drained = tokio::time::timeout(
                    self.config.coordinator_drain_timeout,
                    live.turn_done.notified(),
                )
                .await
                .is_ok();
                if !drained {
                    tracing::warn!(
                        timeout_ms = self.config.coordinator_drain_timeout.as_millis() as u64,
                        "coordinator turn did not finish before replacement"
                    );
                }
            }
        }

        let mut outcome = Outcome::empty();
        outcome.merge(self.handle_stop(&id, false, reason).await?);
        outcome.merge(self.handle_retire(&id, reason)?);
        let spawn_outcome = self
            .handle_spawn(
                Role::Coordinator,
                None,
                AgentOptions {
                    agent_type: None,
                    initial_prompt: Some(prompts::coordinator_replacement()),
                },
            )
            .await?;
        let data = spawn_outcome.data.clone();
        outcome.merge(spawn_outcome);
        outcome.data = data;
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "replace_tests.rs"]
mod tests;
