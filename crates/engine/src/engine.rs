// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! The engine: repositories, registry, enforcer, and injected collaborators.

use crate::config::EngineConfig;
use crate::dispatch::CommandSubmitter;
use crate::enforcer::TurnEnforcer;
use crate::registry::AgentRegistry;
use crate::store::{MailboxRepository, ProcessRepository, TaskRepository};
use foreman_adapters::{
    AgentSpawner, FabricUnsubscriber, IssueStore, MessageDeliverer, MessagePoster,
    NoopDeliverer, NoopFabricUnsubscriber, NoopIssueStore, NoopMessagePoster,
    NoopSessionRefNotifier, NoopSoundService, SessionRefNotifier, SoundService,
};
use foreman_core::{Clock, Event, Process, ProcessId, SystemClock, TaskAssignment, TaskId};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The orchestration core.
///
/// All state mutation happens inside command handlers (see the `handlers`
/// module); everything else reads snapshots.
pub struct Engine<C: Clock = SystemClock> {
    pub(crate) processes: ProcessRepository,
    pub(crate) tasks: TaskRepository,
    pub(crate) mailboxes: MailboxRepository,
    pub(crate) registry: AgentRegistry,
    pub(crate) enforcer: Arc<TurnEnforcer>,
    pub(crate) issues: Arc<dyn IssueStore>,
    pub(crate) spawner: Option<Arc<dyn AgentSpawner>>,
    pub(crate) deliverer: Arc<dyn MessageDeliverer>,
    pub(crate) session_notifier: Arc<dyn SessionRefNotifier>,
    pub(crate) poster: Arc<dyn MessagePoster>,
    pub(crate) fabric: Arc<dyn FabricUnsubscriber>,
    pub(crate) sounds: Arc<dyn SoundService>,
    /// Where agent event pumps submit turn-complete commands.
    pub(crate) submitter: Option<CommandSubmitter>,
    /// Where agent event pumps forward raw output.
    pub(crate) agent_output: Option<mpsc::Sender<Event>>,
    pub(crate) clock: C,
    pub(crate) config: EngineConfig,
}

impl Engine<SystemClock> {
    pub fn builder() -> EngineBuilder<SystemClock> {
        EngineBuilder::new(SystemClock)
    }
}

impl<C: Clock> Engine<C> {
    /// Snapshot of a process row.
    pub fn process(&self, id: &ProcessId) -> Option<Process> {
        self.processes.get(id)
    }

    /// Snapshot of every process row.
    pub fn processes(&self) -> Vec<Process> {
        self.processes.all()
    }

    /// Snapshot of a task assignment.
    pub fn task(&self, id: &TaskId) -> Option<TaskAssignment> {
        self.tasks.get(id)
    }

    /// Snapshot of every task assignment.
    pub fn tasks(&self) -> Vec<TaskAssignment> {
        self.tasks.all()
    }

    /// Pending-message count for a process.
    pub fn queue_size(&self, id: &ProcessId) -> usize {
        self.mailboxes.size(id)
    }

    /// Whether a live agent is registered for the process.
    pub fn has_live_agent(&self, id: &ProcessId) -> bool {
        self.registry.get(id).is_some()
    }

    /// The turn enforcer, shared with agent event pumps.
    pub fn enforcer(&self) -> &Arc<TurnEnforcer> {
        &self.enforcer
    }
}

/// Builds an [`Engine`], substituting no-op implementations for any
/// collaborator that is not provided.
pub struct EngineBuilder<C: Clock> {
    config: EngineConfig,
    issues: Arc<dyn IssueStore>,
    spawner: Option<Arc<dyn AgentSpawner>>,
    deliverer: Arc<dyn MessageDeliverer>,
    session_notifier: Arc<dyn SessionRefNotifier>,
    poster: Arc<dyn MessagePoster>,
    fabric: Arc<dyn FabricUnsubscriber>,
    sounds: Arc<dyn SoundService>,
    submitter: Option<CommandSubmitter>,
    agent_output: Option<mpsc::Sender<Event>>,
    clock: C,
}

impl<C: Clock> EngineBuilder<C> {
    pub fn new(clock: C) -> Self {
        Self {
            config: EngineConfig::default(),
            issues: Arc::new(NoopIssueStore),
            spawner: None,
            deliverer: Arc::new(NoopDeliverer),
            session_notifier: Arc::new(NoopSessionRefNotifier),
            poster: Arc::new(NoopMessagePoster),
            fabric: Arc::new(NoopFabricUnsubscriber),
            sounds: Arc::new(NoopSoundService),
            submitter: None,
            agent_output: None,
            clock,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn issues(mut self, issues: Arc<dyn IssueStore>) -> Self {
        self.issues = issues;
        self
    }

    pub fn spawner(mut self, spawner: Arc<dyn AgentSpawner>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn deliverer(mut self, deliverer: Arc<dyn MessageDeliverer>) -> Self {
        self.deliverer = deliverer;
        self
    }

    pub fn session_notifier(mut self, notifier: Arc<dyn SessionRefNotifier>) -> Self {
        self.session_notifier = notifier;
        self
    }

    pub fn poster(mut self, poster: Arc<dyn MessagePoster>) -> Self {
        self.poster = poster;
        self
    }

    pub fn fabric(mut self, fabric: Arc<dyn FabricUnsubscriber>) -> Self {
        self.fabric = fabric;
        self
    }

    pub fn sounds(mut self, sounds: Arc<dyn SoundService>) -> Self {
        self.sounds = sounds;
        self
    }

    /// Wire the dispatcher submit handle so agent event pumps can report
    /// turn completion.
    pub fn submitter(mut self, submitter: CommandSubmitter) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Wire the UI event stream so agent output bypasses the command queue.
    pub fn agent_output(mut self, events: mpsc::Sender<Event>) -> Self {
        self.agent_output = Some(events);
        self
    }

    pub fn clock<C2: Clock>(self, clock: C2) -> EngineBuilder<C2> {
        EngineBuilder {
            config: self.config,
            issues: self.issues,
            spawner: self.spawner,
            deliverer: self.deliverer,
            session_notifier: self.session_notifier,
            poster: self.poster,
            fabric: self.fabric,
            sounds: self.sounds,
            submitter: self.submitter,
            agent_output: self.agent_output,
            clock,
        }
    }

    pub fn build(self) -> Engine<C> {
        Engine {
            processes: ProcessRepository::new(),
            tasks: TaskRepository::new(),
            mailboxes: MailboxRepository::new(self.config.mailbox_capacity),
            registry: AgentRegistry::new(),
            enforcer: Arc::new(TurnEnforcer::new(self.config.max_turn_retries)),
            issues: self.issues,
            spawner: self.spawner,
            deliverer: self.deliverer,
            session_notifier: self.session_notifier,
            poster: self.poster,
            fabric: self.fabric,
            sounds: self.sounds,
            submitter: self.submitter,
            agent_output: self.agent_output,
            clock: self.clock,
            config: self.config,
        }
    }
}
