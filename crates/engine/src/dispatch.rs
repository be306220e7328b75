// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! The serial command dispatcher.
//!
//! At most one handler runs at a time against the shared repositories.
//! Follow-up commands produced by a handler are re-injected ahead of any
//! externally submitted command that arrived after the current one; this
//! FIFO policy is the concurrency ground truth every handler presumes.

use crate::engine::Engine;
use foreman_core::{Clock, Command, Event};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Create the command channel: a cloneable submit handle plus the receiver
/// the dispatcher consumes.
pub fn command_channel(buffer: usize) -> (CommandSubmitter, mpsc::Receiver<Command>) {
    let (tx, rx) = mpsc::channel(buffer);
    (CommandSubmitter { tx }, rx)
}

/// Handle for submitting commands to the dispatcher.
#[derive(Clone)]
pub struct CommandSubmitter {
    tx: mpsc::Sender<Command>,
}

impl CommandSubmitter {
    /// Submit a command, waiting for queue space.
    ///
    /// Fails only when the dispatcher has shut down.
    pub async fn submit(&self, command: Command) -> Result<(), Command> {
        self.tx.send(command).await.map_err(|e| e.0)
    }

    /// Submit without waiting; drops the command when the queue is full.
    pub fn try_submit(&self, command: Command) -> Result<(), Command> {
        self.tx.try_send(command).map_err(|e| e.into_inner())
    }
}

/// Serializes command execution against a shared [`Engine`].
pub struct Dispatcher<C: Clock> {
    engine: Arc<Engine<C>>,
    commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<Event>,
    pending: VecDeque<Command>,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(
        engine: Arc<Engine<C>>,
        commands: mpsc::Receiver<Command>,
        events: mpsc::Sender<Event>,
    ) -> Self {
        Self { engine, commands, events, pending: VecDeque::new() }
    }

    /// Run until every submitter is dropped and the pending queue drains.
    pub async fn run(mut self) {
        loop {
            let command = match self.pending.pop_front() {
                Some(command) => command,
                None => match self.commands.recv().await {
                    Some(command) => command,
                    None => break,
                },
            };

            let name = command.name();
            match self.engine.handle_command(command).await {
                Ok(outcome) => {
                    for event in outcome.events {
                        if self.events.send(event).await.is_err() {
                            tracing::debug!("event subscriber gone, dropping events");
                        }
                    }
                    // Follow-ups run before any externally queued command.
                    for follow_up in outcome.follow_ups {
                        self.pending.push_back(follow_up);
                    }
                }
                Err(e) => {
                    // Handler errors are terminal for the command, not the
                    // loop; the handler span already recorded the error.
                    tracing::warn!(command = name, error = %e, "command failed");
                }
            }
        }
    }

    /// Run on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
