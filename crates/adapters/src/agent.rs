// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Live agent subprocess capability.
//!
//! The embedded agent runtime is opaque to the core: the engine sees a
//! spawner that yields a running [`AgentProcess`] plus its stdout event
//! stream, and drives termination through `cancel` / `wait` / the native
//! pid.

use async_trait::async_trait;
use foreman_core::{AgentEvent, AgentOptions, ProcessId, Role};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from the agent runtime boundary
#[derive(Debug, Error)]
pub enum AgentProcessError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("agent process already terminated")]
    Terminated,
    #[error("agent io: {0}")]
    Io(String),
}

/// A running agent subprocess.
#[async_trait]
pub trait AgentProcess: Send + Sync {
    /// Agent-reported session identifier, once known.
    fn session_ref(&self) -> Option<String>;
    fn is_running(&self) -> bool;
    /// Native process id, when the agent runs as a local subprocess.
    fn pid(&self) -> Option<u32>;
    fn work_dir(&self) -> PathBuf;
    /// Request cooperative shutdown.
    async fn cancel(&self) -> Result<(), AgentProcessError>;
    /// Wait for the process to exit.
    async fn wait(&self) -> Result<(), AgentProcessError>;
}

/// A freshly spawned agent: the process handle plus its event stream.
///
/// The receiver is consumed by the registry's per-agent pump.
pub struct SpawnedAgent {
    pub agent: Arc<dyn AgentProcess>,
    pub events: mpsc::Receiver<AgentEvent>,
}

/// Adapter that launches agent subprocesses.
#[async_trait]
pub trait AgentSpawner: Send + Sync {
    async fn spawn_process(
        &self,
        id: &ProcessId,
        role: Role,
        options: &AgentOptions,
    ) -> Result<SpawnedAgent, AgentProcessError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use tokio::sync::Notify;

    struct FakeAgentState {
        session_ref: Option<String>,
        running: bool,
        pid: Option<u32>,
        work_dir: PathBuf,
        /// When false, `cancel` is acknowledged but the process never exits,
        /// forcing the stop handler onto its escalation path.
        responsive: bool,
        cancel_requested: bool,
    }

    /// Scriptable in-process stand-in for a live agent.
    pub struct FakeAgent {
        state: Arc<Mutex<FakeAgentState>>,
        exited: Arc<Notify>,
    }

    /// Handle for driving a [`FakeAgent`] from a test.
    #[derive(Clone)]
    pub struct FakeAgentHandle {
        state: Arc<Mutex<FakeAgentState>>,
        exited: Arc<Notify>,
        events: mpsc::Sender<AgentEvent>,
    }

    impl FakeAgent {
        /// Create a responsive fake agent and its driving handle.
        pub fn spawned() -> (Arc<Self>, FakeAgentHandle, mpsc::Receiver<AgentEvent>) {
            let (tx, rx) = mpsc::channel(64);
            let state = Arc::new(Mutex::new(FakeAgentState {
                session_ref: None,
                running: true,
                pid: None,
                work_dir: PathBuf::from("/tmp/fake-agent"),
                responsive: true,
                cancel_requested: false,
            }));
            let exited = Arc::new(Notify::new());
            let agent = Arc::new(FakeAgent { state: state.clone(), exited: exited.clone() });
            let handle = FakeAgentHandle { state, exited, events: tx };
            (agent, handle, rx)
        }
    }

    impl FakeAgentHandle {
        pub fn set_session_ref(&self, session_ref: impl Into<String>) {
            self.state.lock().session_ref = Some(session_ref.into());
        }

        /// Ignore cancel requests so graceful stop times out.
        pub fn set_unresponsive(&self) {
            self.state.lock().responsive = false;
        }

        pub fn cancel_requested(&self) -> bool {
            self.state.lock().cancel_requested
        }

        /// Simulate the subprocess exiting on its own.
        pub fn exit(&self) {
            self.state.lock().running = false;
            self.exited.notify_waiters();
        }

        /// Push an event onto the agent's stdout stream.
        pub async fn emit(&self, event: AgentEvent) {
            let _ = self.events.send(event).await;
        }
    }

    #[async_trait]
    impl AgentProcess for FakeAgent {
        fn session_ref(&self) -> Option<String> {
            self.state.lock().session_ref.clone()
        }

        fn is_running(&self) -> bool {
            self.state.lock().running
        }

        fn pid(&self) -> Option<u32> {
            self.state.lock().pid
        }

        fn work_dir(&self) -> PathBuf {
            self.state.lock().work_dir.clone()
        }

        async fn cancel(&self) -> Result<(), AgentProcessError> {
            let responsive = {
                let mut state = self.state.lock();
                state.cancel_requested = true;
                state.responsive
            };
            if responsive {
                self.state.lock().running = false;
                self.exited.notify_waiters();
            }
            Ok(())
        }

        async fn wait(&self) -> Result<(), AgentProcessError> {
            loop {
                // Created before the check so a notify between the check and
                // the await is not lost.
                let exited = self.exited.notified();
                if !self.state.lock().running {
                    return Ok(());
                }
                exited.await;
            }
        }
    }

    /// Recorded spawn call
    #[derive(Debug, Clone)]
    pub struct SpawnCall {
        pub id: ProcessId,
        pub role: Role,
        pub options: AgentOptions,
    }

    #[derive(Default)]
    struct FakeSpawnerState {
        calls: Vec<SpawnCall>,
        handles: Vec<(ProcessId, FakeAgentHandle)>,
        fail_next: bool,
        unresponsive: bool,
    }

    /// Spawner that yields [`FakeAgent`]s and records every call.
    #[derive(Clone, Default)]
    pub struct FakeSpawner {
        inner: Arc<Mutex<FakeSpawnerState>>,
    }

    impl FakeSpawner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next spawn call fail.
        pub fn fail_next(&self) {
            self.inner.lock().fail_next = true;
        }

        /// Spawn agents that ignore cancel requests.
        pub fn spawn_unresponsive(&self) {
            self.inner.lock().unresponsive = true;
        }

        pub fn calls(&self) -> Vec<SpawnCall> {
            self.inner.lock().calls.clone()
        }

        /// The driving handle for the agent spawned under `id`.
        pub fn handle(&self, id: &ProcessId) -> Option<FakeAgentHandle> {
            self.inner
                .lock()
                .handles
                .iter()
                .rev()
                .find(|(spawned, _)| spawned == id)
                .map(|(_, h)| h.clone())
        }
    }

    #[async_trait]
    impl AgentSpawner for FakeSpawner {
        async fn spawn_process(
            &self,
            id: &ProcessId,
            role: Role,
            options: &AgentOptions,
        ) -> Result<SpawnedAgent, AgentProcessError> {
            let unresponsive = {
                let mut state = self.inner.lock();
                state.calls.push(SpawnCall {
                    id: id.clone(),
                    role,
                    options: options.clone(),
                });
                if state.fail_next {
                    state.fail_next = false;
                    return Err(AgentProcessError::SpawnFailed("injected spawn failure".into()));
                }
                state.unresponsive
            };

            let (agent, handle, events) = FakeAgent::spawned();
            if unresponsive {
                handle.set_unresponsive();
            }
            self.inner.lock().handles.push((id.clone(), handle));
            Ok(SpawnedAgent { agent, events })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAgent, FakeAgentHandle, FakeSpawner, SpawnCall};

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
