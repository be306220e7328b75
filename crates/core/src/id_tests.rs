// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

use super::*;

#[test]
fn worker_id_format() {
    let id = ProcessId::worker(3);
    assert_eq!(id, "worker-3");
    assert_eq!(id.worker_number(), Some(3));
}

#[test]
fn worker_number_rejects_non_worker_ids() {
    assert_eq!(ProcessId::new("coordinator").worker_number(), None);
    assert_eq!(ProcessId::new("worker-").worker_number(), None);
    assert_eq!(ProcessId::new("worker-abc").worker_number(), None);
    assert_eq!(ProcessId::new("observer-1").worker_number(), None);
}

#[test]
fn process_id_compares_with_str() {
    let id = ProcessId::new("worker-1");
    assert_eq!(id, "worker-1");
    assert_eq!(id.as_str(), "worker-1");
    assert_eq!(id.to_string(), "worker-1");
}

#[test]
fn task_id_round_trips() {
    let id = TaskId::from("T-42");
    assert_eq!(id, "T-42");
    assert_eq!(id.to_string(), "T-42");
}
