// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Live agent registry.
//!
//! Maps a process id to its running [`AgentProcess`] and the event-pump
//! task that translates the agent's stdout stream into enforcer records,
//! UI output events, and turn-complete commands.

use crate::dispatch::CommandSubmitter;
use crate::enforcer::TurnEnforcer;
use foreman_adapters::{AgentProcess, SpawnedAgent};
use foreman_core::{AgentEvent, Command, CommandKind, Event, ProcessId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;

/// A registered agent and its event loop.
pub struct LiveAgent {
    pub agent: Arc<dyn AgentProcess>,
    /// Notified by the pump each time the agent reports a completed turn.
    /// The coordinator-replacement drain waits on this.
    pub turn_done: Arc<Notify>,
    cancel_pump: CancellationToken,
    retired: AtomicBool,
}

impl LiveAgent {
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }

    fn retire(&self) {
        self.retired.store(true, Ordering::SeqCst);
        self.cancel_pump.cancel();
    }
}

/// What the event pump needs besides the agent's stream.
pub struct PumpSinks {
    /// Turn-complete commands go back through the dispatcher.
    pub submitter: Option<CommandSubmitter>,
    /// Agent output is forwarded straight to the UI stream.
    pub events: Option<mpsc::Sender<Event>>,
    pub enforcer: Arc<TurnEnforcer>,
}

/// Shared map of live agents, mutated by spawn/retire/stop handlers and
/// read concurrently by event-pump tasks.
#[derive(Default)]
pub struct AgentRegistry {
    inner: Mutex<HashMap<ProcessId, Arc<LiveAgent>>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly spawned agent and start its event pump.
    pub fn register(&self, id: &ProcessId, spawned: SpawnedAgent, sinks: PumpSinks) {
        let cancel_pump = CancellationToken::new();
        let turn_done = Arc::new(Notify::new());
        let live = Arc::new(LiveAgent {
            agent: spawned.agent,
            turn_done: turn_done.clone(),
            cancel_pump: cancel_pump.clone(),
            retired: AtomicBool::new(false),
        });

        tokio::spawn(run_pump(id.clone(), spawned.events, cancel_pump, turn_done, sinks));

        self.inner.lock().insert(id.clone(), live);
    }

    pub fn get(&self, id: &ProcessId) -> Option<Arc<LiveAgent>> {
        self.inner.lock().get(id).cloned()
    }

    /// Unregister: mark the agent retired and stop its event loop.
    pub fn remove(&self, id: &ProcessId) -> Option<Arc<LiveAgent>> {
        let live = self.inner.lock().remove(id);
        if let Some(ref live) = live {
            live.retire();
        }
        live
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Per-agent event loop: reads stdout events until the stream closes or the
/// agent is retired. Never mutates repositories directly; state changes go
/// through submitted commands.
async fn run_pump(
    id: ProcessId,
    mut events: mpsc::Receiver<AgentEvent>,
    cancel: CancellationToken,
    turn_done: Arc<Notify>,
    sinks: PumpSinks,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        match event {
            AgentEvent::ToolCalled { tool } => {
                sinks.enforcer.record_tool_call(&id, &tool);
            }
            AgentEvent::Output { text } => {
                if let Some(ref tx) = sinks.events {
                    let _ = tx.send(Event::Output { id: id.clone(), output: text }).await;
                }
            }
            AgentEvent::TurnCompleted { succeeded, metrics, error } => {
                turn_done.notify_waiters();
                if let Some(ref submitter) = sinks.submitter {
                    let command = Command::internal(CommandKind::TurnComplete {
                        process_id: id.clone(),
                        succeeded,
                        metrics,
                        error,
                    });
                    if submitter.submit(command).await.is_err() {
                        tracing::debug!(
                            process_id = id.as_str(),
                            "dispatcher gone, stopping agent pump"
                        );
                        break;
                    }
                }
            }
        }
    }
    tracing::debug!(process_id = id.as_str(), "agent event pump stopped");
}
