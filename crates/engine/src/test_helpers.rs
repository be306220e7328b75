// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Shared test fixtures for handler tests.

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::outcome::Outcome;
use foreman_adapters::{
    FakeDeliverer, FakeIssueStore, FakeMessagePoster, FakeSessionRefNotifier, FakeSoundService,
    FakeSpawner, FakeUnsubscriber,
};
use foreman_core::{
    Command, CommandKind, CommandSource, Event, FakeClock, Phase, ProcessId, ProcessStatus, Role,
};
use std::sync::Arc;

pub(crate) struct TestContext {
    pub engine: Arc<Engine<FakeClock>>,
    pub clock: FakeClock,
    pub issues: Arc<FakeIssueStore>,
    pub deliverer: Arc<FakeDeliverer>,
    pub spawner: Arc<FakeSpawner>,
    pub sounds: Arc<FakeSoundService>,
    pub session_refs: Arc<FakeSessionRefNotifier>,
    pub poster: Arc<FakeMessagePoster>,
    pub fabric: Arc<FakeUnsubscriber>,
}

fn build(config: EngineConfig, with_spawner: bool) -> TestContext {
    let clock = FakeClock::new();
    let issues = Arc::new(FakeIssueStore::new());
    let deliverer = Arc::new(FakeDeliverer::new());
    let spawner = Arc::new(FakeSpawner::new());
    let sounds = Arc::new(FakeSoundService::new());
    let session_refs = Arc::new(FakeSessionRefNotifier::new());
    let poster = Arc::new(FakeMessagePoster::new());
    let fabric = Arc::new(FakeUnsubscriber::new());

    let mut builder = crate::engine::EngineBuilder::new(clock.clone())
        .config(config)
        .issues(issues.clone())
        .deliverer(deliverer.clone())
        .sounds(sounds.clone())
        .session_notifier(session_refs.clone())
        .poster(poster.clone())
        .fabric(fabric.clone());
    if with_spawner {
        builder = builder.spawner(spawner.clone());
    }

    TestContext {
        engine: Arc::new(builder.build()),
        clock,
        issues,
        deliverer,
        spawner,
        sounds,
        session_refs,
        poster,
        fabric,
    }
}

/// Engine with no agent spawner: spawned processes come up ready.
pub(crate) fn setup() -> TestContext {
    build(EngineConfig::default(), false)
}

/// Engine wired to a [`FakeSpawner`]: spawned processes come up working
/// with a live fake agent.
pub(crate) fn setup_with_spawner() -> TestContext {
    build(EngineConfig::default(), true)
}

pub(crate) fn setup_with_config(config: EngineConfig) -> TestContext {
    build(config, false)
}

impl TestContext {
    pub async fn handle(&self, kind: CommandKind) -> Result<Outcome, EngineError> {
        self.engine.handle_command(Command::internal(kind)).await
    }

    pub async fn handle_from(
        &self,
        source: CommandSource,
        kind: CommandKind,
    ) -> Result<Outcome, EngineError> {
        self.engine.handle_command(Command::new(source, kind)).await
    }

    /// Spawn a worker and return its generated id.
    pub async fn spawn_worker(&self) -> ProcessId {
        let outcome = self
            .handle(CommandKind::SpawnProcess {
                role: Role::Worker,
                process_id: None,
                options: Default::default(),
            })
            .await
            .unwrap();
        process_id_from(&outcome)
    }

    pub async fn spawn_coordinator(&self) -> ProcessId {
        let outcome = self
            .handle(CommandKind::SpawnProcess {
                role: Role::Coordinator,
                process_id: None,
                options: Default::default(),
            })
            .await
            .unwrap();
        process_id_from(&outcome)
    }

    /// Process an outcome's follow-ups to quiescence, dispatcher-style,
    /// returning every event produced along the way (the initial outcome's
    /// events included).
    pub async fn drain(&self, outcome: Outcome) -> Vec<Event> {
        let mut events = outcome.events;
        let mut queue = outcome.follow_ups;
        while !queue.is_empty() {
            let command = queue.remove(0);
            let next = self.engine.handle_command(command).await.unwrap();
            events.extend(next.events);
            queue.extend(next.follow_ups);
        }
        events
    }

    /// Direct repository poke for test setup.
    pub fn set_status(&self, id: &ProcessId, status: ProcessStatus) {
        let mut process = self.engine.process(id).unwrap();
        process.status = status;
        self.engine.processes.save(process).unwrap();
    }

    pub fn set_phase(&self, id: &ProcessId, phase: Phase) {
        let mut process = self.engine.process(id).unwrap();
        process.phase = Some(phase);
        self.engine.processes.save(process).unwrap();
    }

    pub fn status(&self, id: &ProcessId) -> ProcessStatus {
        self.engine.process(id).unwrap().status
    }

    pub fn phase(&self, id: &ProcessId) -> Option<Phase> {
        self.engine.process(id).unwrap().phase
    }
}

pub(crate) fn process_id_from(outcome: &Outcome) -> ProcessId {
    let data = outcome.data.as_ref().unwrap();
    ProcessId::new(data["process_id"].as_str().unwrap())
}

/// The ids named by `DeliverQueued` follow-ups, in order.
pub(crate) fn deliver_targets(outcome: &Outcome) -> Vec<ProcessId> {
    outcome
        .follow_ups
        .iter()
        .filter_map(|c| match &c.kind {
            CommandKind::DeliverQueued { process_id } => Some(process_id.clone()),
            _ => None,
        })
        .collect()
}
