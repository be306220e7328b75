// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Task assignment repository.

use super::StoreError;
use foreman_core::{ProcessId, TaskAssignment, TaskId};
use indexmap::IndexMap;
use parking_lot::Mutex;

/// In-memory store of task assignments, keyed by task id.
#[derive(Default)]
pub struct TaskRepository {
    inner: Mutex<IndexMap<TaskId, TaskAssignment>>,
}

impl TaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &TaskId) -> Option<TaskAssignment> {
        self.inner.lock().get(id).cloned()
    }

    /// Upsert a task assignment.
    pub fn save(&self, task: TaskAssignment) -> Result<(), StoreError> {
        self.inner.lock().insert(task.task_id.clone(), task);
        Ok(())
    }

    pub fn delete(&self, id: &TaskId) -> Option<TaskAssignment> {
        self.inner.lock().shift_remove(id)
    }

    /// The assignment a process is implementing, if any.
    pub fn get_by_implementer(&self, id: &ProcessId) -> Option<TaskAssignment> {
        self.inner.lock().values().find(|t| t.is_implementer(id)).cloned()
    }

    pub fn all(&self) -> Vec<TaskAssignment> {
        self.inner.lock().values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
