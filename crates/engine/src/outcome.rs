// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Handler result: data payload, domain events, and follow-up commands.

use foreman_core::{Command, Event};

/// What a handler produced.
///
/// Events are emitted by the dispatcher in list order; follow-up commands
/// are re-injected ahead of any externally submitted command that arrived
/// after the current one.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Optional JSON payload for the caller (e.g. a generated process id or
    /// the graceful-stop flag).
    pub data: Option<serde_json::Value>,
    pub events: Vec<Event>,
    pub follow_ups: Vec<Command>,
}

impl Outcome {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self { events, ..Self::default() }
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn push_follow_up(&mut self, command: Command) {
        self.follow_ups.push(command);
    }

    /// Append another outcome's events and follow-ups, keeping this data.
    pub fn merge(&mut self, other: Outcome) {
        self.events.extend(other.events);
        self.follow_ups.extend(other.follow_ups);
    }
}
