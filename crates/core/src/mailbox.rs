// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Per-process FIFO mailbox with sender tagging.
//!
//! The sender tag is preserved end-to-end: the deliver handler uses it to
//! distinguish system-generated enforcement reminders (which continue the
//! current turn) from user and coordinator messages (which reset it).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Who produced a queued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Coordinator,
    System,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sender::User => "user",
            Sender::Coordinator => "coordinator",
            Sender::System => "system",
        };
        write!(f, "{}", name)
    }
}

/// One pending inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMessage {
    pub content: String,
    pub sender: Sender,
}

impl QueuedMessage {
    pub fn new(content: impl Into<String>, sender: Sender) -> Self {
        Self { content: content.into(), sender }
    }
}

/// Enqueue rejected because the mailbox is at capacity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mailbox full (capacity {capacity})")]
pub struct MailboxFull {
    pub capacity: usize,
}

/// An ordered queue of pending messages for one process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mailbox {
    entries: VecDeque<QueuedMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    capacity: Option<usize>,
}

impl Mailbox {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn bounded(capacity: usize) -> Self {
        Self { entries: VecDeque::new(), capacity: Some(capacity) }
    }

    /// Append a message; fails when at capacity. Returns the new size.
    pub fn enqueue(&mut self, message: QueuedMessage) -> Result<usize, MailboxFull> {
        if let Some(capacity) = self.capacity {
            if self.entries.len() >= capacity {
                return Err(MailboxFull { capacity });
            }
        }
        self.entries.push_back(message);
        Ok(self.entries.len())
    }

    /// Put a message back at the head of the queue, preserving FIFO order.
    ///
    /// Used to undo a dequeue when delivery fails; bypasses the capacity
    /// check because the slot was just vacated.
    pub fn requeue_front(&mut self, message: QueuedMessage) -> usize {
        self.entries.push_front(message);
        self.entries.len()
    }

    pub fn dequeue(&mut self) -> Option<QueuedMessage> {
        self.entries.pop_front()
    }

    /// Remove and return all remaining entries in order.
    pub fn drain(&mut self) -> Vec<QueuedMessage> {
        self.entries.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
