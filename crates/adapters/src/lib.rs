// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! foreman-adapters: injected collaborator capabilities.
//!
//! The core requires narrow traits for everything that crosses its boundary:
//! the issue tracker, the agent subprocess runtime, message delivery, and
//! the notification sinks. Every sink has a no-op implementation so the
//! engine factory can replace absent collaborators, and a `Fake*` recording
//! implementation behind the `test-support` feature.

pub mod agent;
pub mod deliver;
pub mod issue;
pub mod notify;

pub use agent::{AgentProcess, AgentProcessError, AgentSpawner, SpawnedAgent};
pub use deliver::{DeliverError, MessageDeliverer, NoopDeliverer};
pub use issue::{Issue, IssueError, IssueStatus, IssueStore, NoopIssueStore};
pub use notify::{
    DesktopSoundService, FabricUnsubscriber, MessagePoster, NoopFabricUnsubscriber,
    NoopMessagePoster, NoopSessionRefNotifier, NoopSoundService, NotifyError, SessionRefNotifier,
    SoundCue, SoundService,
};

#[cfg(any(test, feature = "test-support"))]
pub use agent::{FakeAgent, FakeAgentHandle, FakeSpawner};
#[cfg(any(test, feature = "test-support"))]
pub use deliver::FakeDeliverer;
#[cfg(any(test, feature = "test-support"))]
pub use issue::FakeIssueStore;
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeMessagePoster, FakeSessionRefNotifier, FakeSoundService, FakeUnsubscriber};
