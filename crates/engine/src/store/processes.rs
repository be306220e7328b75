// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Process repository.

use super::StoreError;
use foreman_core::{Process, ProcessId, ProcessStatus, Role};
use indexmap::IndexMap;
use parking_lot::Mutex;

/// In-memory store of process rows, keyed by id.
///
/// Insertion order is preserved; `workers` and `active_workers` enumerate
/// in that order, which is the broadcast tie-break rule.
#[derive(Default)]
pub struct ProcessRepository {
    inner: Mutex<IndexMap<ProcessId, Process>>,
}

impl ProcessRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ProcessId) -> Option<Process> {
        self.inner.lock().get(id).cloned()
    }

    /// Upsert a process row.
    pub fn save(&self, process: Process) -> Result<(), StoreError> {
        self.inner.lock().insert(process.id.clone(), process);
        Ok(())
    }

    pub fn delete(&self, id: &ProcessId) -> Option<Process> {
        self.inner.lock().shift_remove(id)
    }

    /// The non-terminal coordinator, if one exists.
    pub fn get_coordinator(&self) -> Option<Process> {
        self.inner
            .lock()
            .values()
            .find(|p| p.role == Role::Coordinator && !p.is_terminal())
            .cloned()
    }

    /// All worker rows, terminal included, in insertion order.
    pub fn workers(&self) -> Vec<Process> {
        self.inner.lock().values().filter(|p| p.role == Role::Worker).cloned().collect()
    }

    /// Workers able to receive a broadcast: ready or working.
    pub fn active_workers(&self) -> Vec<Process> {
        self.inner
            .lock()
            .values()
            .filter(|p| {
                p.role == Role::Worker
                    && matches!(p.status, ProcessStatus::Ready | ProcessStatus::Working)
            })
            .cloned()
            .collect()
    }

    /// The next free worker number: `1 + max existing`, counting every row
    /// ever created so ids are never reused.
    pub fn next_worker_number(&self) -> u32 {
        self.inner
            .lock()
            .keys()
            .filter_map(|id| id.worker_number())
            .max()
            .map_or(1, |n| n + 1)
    }

    pub fn all(&self) -> Vec<Process> {
        self.inner.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "processes_tests.rs"]
mod tests;
