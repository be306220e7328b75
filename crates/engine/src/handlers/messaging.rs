// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Messaging: enqueue, deliver, broadcast.
//!
//! There is a single path for all messages: enqueue into the target's
//! mailbox, then deliver via a `DeliverQueued` follow-up when the target is
//! ready. Handlers never hand content to an agent directly.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::outcome::Outcome;
use foreman_core::{
    Clock, Command, CommandKind, CommandSource, Event, ProcessId, ProcessStatus, QueuedMessage,
    Sender,
};

impl<C: Clock> Engine<C> {
    /// Enqueue a message for a process and schedule delivery if it is ready.
    pub(crate) fn handle_send_to_process(
        &self,
        source: CommandSource,
        id: &ProcessId,
        content: String,
    ) -> Result<Outcome, EngineError> {
        let process =
            self.processes.get(id).ok_or_else(|| EngineError::ProcessNotFound(id.clone()))?;
        if process.is_retired() {
            return Err(EngineError::ProcessRetired(id.clone()));
        }

        // Tool-call sources are agents talking to each other; everything
        // else is the human operator.
        let sender = match source {
            CommandSource::McpTool => Sender::Coordinator,
            CommandSource::User | CommandSource::Internal => Sender::User,
        };

        let size = self
            .mailboxes
            .enqueue(id, QueuedMessage::new(content, sender))
            .map_err(|e| EngineError::QueueFull(id.clone(), e.capacity))?;

        let mut outcome = Outcome::empty();
        if process.status == ProcessStatus::Ready {
            outcome.push_follow_up(Command::internal(CommandKind::DeliverQueued {
                process_id: id.clone(),
            }));
        } else {
            outcome.push_event(Event::QueueChanged { id: id.clone(), size });
        }
        Ok(outcome)
    }

    /// Pop the next queued message and hand it to the live agent.
    pub(crate) async fn handle_deliver_queued(
        &self,
        id: &ProcessId,
    ) -> Result<Outcome, EngineError> {
        let mut process =
            self.processes.get(id).ok_or_else(|| EngineError::ProcessNotFound(id.clone()))?;
        if process.is_retired() {
            return Err(EngineError::ProcessRetired(id.clone()));
        }

        let entry =
            self.mailboxes.dequeue(id).ok_or_else(|| EngineError::QueueEmpty(id.clone()))?;

        // Should not arise under serial dispatch, but a working process must
        // not receive a second message mid-turn.
        if process.status == ProcessStatus::Working {
            self.mailboxes.requeue_front(id, entry);
            return Ok(Outcome::empty().data(serde_json::json!({ "delivered": false })));
        }

        let prior_status = process.status;
        process.status = ProcessStatus::Working;
        self.processes.save(process.clone())?;

        if let Err(e) = self.deliverer.deliver(id, &entry.content).await {
            // Revert: the entry goes back to the head, the status goes back
            // to what it was.
            self.mailboxes.requeue_front(id, entry);
            process.status = prior_status;
            self.processes.save(process)?;
            return Err(EngineError::Deliver { id: id.clone(), source: e });
        }

        // System-sender entries are enforcement reminders: they continue
        // the current turn and must preserve retry counters.
        if entry.sender != Sender::System {
            self.enforcer.reset_turn(id);
        }

        let size = self.mailboxes.size(id);
        Ok(Outcome::with_events(vec![
            Event::Working { id: id.clone() },
            Event::Incoming { id: id.clone(), message: entry.content, sender: entry.sender },
            Event::QueueChanged { id: id.clone(), size },
        ]))
    }

    /// Fan a message out to every active worker not excluded.
    pub(crate) fn handle_broadcast(
        &self,
        source: CommandSource,
        content: &str,
        exclude: &[ProcessId],
    ) -> Result<Outcome, EngineError> {
        let mut outcome = Outcome::empty();
        for worker in self.processes.active_workers() {
            if exclude.contains(&worker.id) {
                continue;
            }
            // Preserve the original source so the sender tag is computed
            // the same way as a direct send.
            outcome.push_follow_up(Command::new(
                source,
                CommandKind::SendToProcess {
                    process_id: worker.id.clone(),
                    content: content.to_string(),
                },
            ));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "messaging_tests.rs"]
mod tests;
