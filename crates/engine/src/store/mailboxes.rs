// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Mailbox repository: one FIFO queue per process id, created lazily.

use foreman_core::{Mailbox, MailboxFull, ProcessId, QueuedMessage};
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-memory store of per-process mailboxes.
///
/// Mailboxes are created on first reference with the configured capacity
/// and persist until their process retires.
pub struct MailboxRepository {
    inner: Mutex<HashMap<ProcessId, Mailbox>>,
    capacity: Option<usize>,
}

impl MailboxRepository {
    pub fn new(capacity: Option<usize>) -> Self {
        Self { inner: Mutex::new(HashMap::new()), capacity }
    }

    fn make_mailbox(&self) -> Mailbox {
        match self.capacity {
            Some(capacity) => Mailbox::bounded(capacity),
            None => Mailbox::unbounded(),
        }
    }

    /// Append a message, creating the mailbox if needed. Returns the new size.
    pub fn enqueue(
        &self,
        id: &ProcessId,
        message: QueuedMessage,
    ) -> Result<usize, MailboxFull> {
        let mut inner = self.inner.lock();
        let mailbox = inner.entry(id.clone()).or_insert_with(|| self.make_mailbox());
        mailbox.enqueue(message)
    }

    /// Put a message back at the head of the queue (delivery revert path).
    pub fn requeue_front(&self, id: &ProcessId, message: QueuedMessage) -> usize {
        let mut inner = self.inner.lock();
        let mailbox = inner.entry(id.clone()).or_insert_with(|| self.make_mailbox());
        mailbox.requeue_front(message)
    }

    pub fn dequeue(&self, id: &ProcessId) -> Option<QueuedMessage> {
        self.inner.lock().get_mut(id)?.dequeue()
    }

    /// Remove and return everything still queued for the process.
    pub fn drain(&self, id: &ProcessId) -> Vec<QueuedMessage> {
        self.inner.lock().get_mut(id).map(Mailbox::drain).unwrap_or_default()
    }

    pub fn size(&self, id: &ProcessId) -> usize {
        self.inner.lock().get(id).map_or(0, Mailbox::len)
    }

    pub fn is_empty(&self, id: &ProcessId) -> bool {
        self.size(id) == 0
    }

    /// Drop the mailbox entirely (process retirement).
    pub fn remove(&self, id: &ProcessId) -> Option<Mailbox> {
        self.inner.lock().remove(id)
    }
}

impl Default for MailboxRepository {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
#[path = "mailboxes_tests.rs"]
mod tests;
