// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

use super::*;
use yare::parameterized;

#[test]
fn new_worker_starts_pending_and_idle() {
    let p = Process::new(ProcessId::worker(1), Role::Worker, 1_000);
    assert_eq!(p.status, ProcessStatus::Pending);
    assert_eq!(p.phase, Some(Phase::Idle));
    assert!(p.task_id.is_none());
    assert!(!p.has_completed_turn);
}

#[test]
fn new_coordinator_has_no_phase() {
    let p = Process::new(ProcessId::new(COORDINATOR_ID), Role::Coordinator, 1_000);
    assert_eq!(p.phase, None);
    assert_eq!(p.phase_or_idle(), Phase::Idle);
}

#[parameterized(
    pending_ready = { ProcessStatus::Pending, ProcessStatus::Ready },
    pending_working = { ProcessStatus::Pending, ProcessStatus::Working },
    ready_working = { ProcessStatus::Ready, ProcessStatus::Working },
    working_ready = { ProcessStatus::Working, ProcessStatus::Ready },
    ready_paused = { ProcessStatus::Ready, ProcessStatus::Paused },
    working_paused = { ProcessStatus::Working, ProcessStatus::Paused },
    paused_ready = { ProcessStatus::Paused, ProcessStatus::Ready },
    ready_stopped = { ProcessStatus::Ready, ProcessStatus::Stopped },
    working_stopped = { ProcessStatus::Working, ProcessStatus::Stopped },
    stopped_ready = { ProcessStatus::Stopped, ProcessStatus::Ready },
    working_failed = { ProcessStatus::Working, ProcessStatus::Failed },
)]
fn valid_status_transitions(from: ProcessStatus, to: ProcessStatus) {
    assert!(from.can_transition_to(to));
}

#[parameterized(
    paused_working = { ProcessStatus::Paused, ProcessStatus::Working },
    stopped_working = { ProcessStatus::Stopped, ProcessStatus::Working },
    retired_ready = { ProcessStatus::Retired, ProcessStatus::Ready },
    failed_ready = { ProcessStatus::Failed, ProcessStatus::Ready },
    ready_failed = { ProcessStatus::Ready, ProcessStatus::Failed },
    pending_paused = { ProcessStatus::Pending, ProcessStatus::Paused },
)]
fn invalid_status_transitions(from: ProcessStatus, to: ProcessStatus) {
    assert!(!from.can_transition_to(to));
}

#[test]
fn terminal_statuses() {
    assert!(ProcessStatus::Retired.is_terminal());
    assert!(ProcessStatus::Failed.is_terminal());
    assert!(!ProcessStatus::Stopped.is_terminal());
    assert!(!ProcessStatus::Paused.is_terminal());
}
