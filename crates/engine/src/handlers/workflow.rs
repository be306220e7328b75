// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Workflow handlers for the implement/review/commit cycle.
//!
//! Every assignment follows the same pattern: mutate state, enqueue a
//! coordinator-tagged prompt into the target's mailbox, and attach a
//! `DeliverQueued` follow-up so the prompt lands before anything else can
//! reach the worker.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::prompts;
use foreman_adapters::{IssueError, IssueStatus, SoundCue};
use foreman_core::{
    Clock, Command, CommandKind, Event, Phase, Process, ProcessId, ProcessStatus, QueuedMessage,
    ReviewKind, Sender, TaskAssignment, TaskId, TaskStatus, Verdict,
};

impl<C: Clock> Engine<C> {
    fn get_worker(&self, id: &ProcessId) -> Result<Process, EngineError> {
        let process =
            self.processes.get(id).ok_or_else(|| EngineError::ProcessNotFound(id.clone()))?;
        if process.is_retired() {
            return Err(EngineError::ProcessRetired(id.clone()));
        }
        if process.role != foreman_core::Role::Worker {
            return Err(EngineError::UnexpectedRole(
                id.clone(),
                process.role,
                foreman_core::Role::Worker,
            ));
        }
        Ok(process)
    }

    /// Enqueue a coordinator prompt and pair it with a delivery follow-up.
    fn queue_prompt(
        &self,
        outcome: &mut Outcome,
        id: &ProcessId,
        prompt: String,
    ) -> Result<(), EngineError> {
        self.mailboxes
            .enqueue(id, QueuedMessage::new(prompt, Sender::Coordinator))
            .map_err(|e| EngineError::QueueFull(id.clone(), e.capacity))?;
        outcome.push_follow_up(Command::internal(CommandKind::DeliverQueued {
            process_id: id.clone(),
        }));
        Ok(())
    }

    fn status_event(process: &Process) -> Event {
        Event::StatusChanged {
            id: process.id.clone(),
            status: process.status,
            phase: process.phase,
            task_id: process.task_id.clone(),
        }
    }

    /// Give a task to an idle worker.
    pub(crate) async fn handle_assign_task(
        &self,
        worker_id: &ProcessId,
        task_id: &TaskId,
        summary: &str,
    ) -> Result<Outcome, EngineError> {
        let mut worker = self.get_worker(worker_id)?;
        if worker.status != ProcessStatus::Ready {
            return Err(EngineError::ProcessNotReady(worker_id.clone(), worker.status));
        }
        if worker.phase_or_idle() != Phase::Idle {
            return Err(EngineError::ProcessNotIdle(worker_id.clone(), worker.phase_or_idle()));
        }
        if let Some(existing) = worker.task_id {
            return Err(EngineError::ProcessAlreadyAssigned(worker_id.clone(), existing));
        }
        if let Some(existing) = self.tasks.get_by_implementer(worker_id) {
            return Err(EngineError::ProcessAlreadyAssigned(
                worker_id.clone(),
                existing.task_id,
            ));
        }

        // The task must exist in the tracker before any state changes.
        self.issues.show_issue(task_id).await.map_err(|e| match e {
            IssueError::NotFound(_) => EngineError::TaskNotFound(task_id.clone()),
            other => EngineError::Issue(other),
        })?;

        let now = self.clock.epoch_ms();
        let task = TaskAssignment::new(task_id.clone(), worker_id.clone(), now);
        self.tasks.save(task)?;

        worker.phase = Some(Phase::Implementing);
        worker.task_id = Some(task_id.clone());
        self.processes.save(worker.clone())?;

        if let Err(e) = self.issues.update_status(task_id, IssueStatus::InProgress).await {
            // Revert both writes; the tracker is the source of truth for
            // task visibility.
            self.tasks.delete(task_id);
            worker.phase = Some(Phase::Idle);
            worker.task_id = None;
            self.processes.save(worker)?;
            return Err(EngineError::Issue(e));
        }

        let mut outcome = Outcome::with_events(vec![Self::status_event(&worker)]);
        self.queue_prompt(&mut outcome, worker_id, prompts::task_assignment(task_id, summary))?;
        Ok(outcome)
    }

    /// Assign a reviewer to a task another worker implemented.
    pub(crate) fn handle_assign_review(
        &self,
        reviewer_id: &ProcessId,
        task_id: &TaskId,
        implementer_id: &ProcessId,
        review_kind: ReviewKind,
    ) -> Result<Outcome, EngineError> {
        if reviewer_id == implementer_id {
            return Err(EngineError::ReviewerIsImplementer(
                reviewer_id.clone(),
                task_id.clone(),
            ));
        }

        let mut task =
            self.tasks.get(task_id).ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;
        if task.is_implementer(reviewer_id) {
            return Err(EngineError::ReviewerIsImplementer(
                reviewer_id.clone(),
                task_id.clone(),
            ));
        }
        // A live reviewer is never silently displaced; denial clears the
        // field, which is the only sanctioned path to re-assignment.
        if let Some(ref current) = task.reviewer {
            if current != reviewer_id && task.status == TaskStatus::InReview {
                return Err(EngineError::ProcessAlreadyAssigned(
                    current.clone(),
                    task_id.clone(),
                ));
            }
        }

        let mut reviewer = self.get_worker(reviewer_id)?;
        if reviewer.status != ProcessStatus::Ready {
            return Err(EngineError::ProcessNotReady(reviewer_id.clone(), reviewer.status));
        }
        if reviewer.phase_or_idle() != Phase::Idle {
            return Err(EngineError::ProcessNotIdle(
                reviewer_id.clone(),
                reviewer.phase_or_idle(),
            ));
        }

        let now = self.clock.epoch_ms();
        task.reviewer = Some(reviewer_id.clone());
        task.status = TaskStatus::InReview;
        task.review_started_at_ms = Some(now);
        self.tasks.save(task)?;

        reviewer.phase = Some(Phase::Reviewing);
        reviewer.task_id = Some(task_id.clone());
        self.processes.save(reviewer.clone())?;

        let mut outcome = Outcome::with_events(vec![Self::status_event(&reviewer)]);
        self.queue_prompt(
            &mut outcome,
            reviewer_id,
            prompts::review_assignment(task_id, implementer_id, review_kind),
        )?;
        Ok(outcome)
    }

    /// An implementer reports its work done and ready for review.
    pub(crate) async fn handle_report_complete(
        &self,
        worker_id: &ProcessId,
        summary: &str,
    ) -> Result<Outcome, EngineError> {
        let mut worker = self.get_worker(worker_id)?;
        let phase = worker.phase_or_idle();
        if !matches!(phase, Phase::Implementing | Phase::AddressingFeedback) {
            return Err(EngineError::ProcessNotImplementing(worker_id.clone(), phase));
        }
        let task_id = worker
            .task_id
            .clone()
            .ok_or_else(|| EngineError::NoTaskAssigned(worker_id.clone()))?;
        let mut task =
            self.tasks.get(&task_id).ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;

        // Durable commentary first: a tracker failure must leave the task
        // untouched.
        let body = if summary.is_empty() {
            "Implementation complete".to_string()
        } else {
            format!("Implementation complete: {}", summary)
        };
        self.issues.add_comment(&task_id, worker_id.as_str(), &body).await?;

        let now = self.clock.epoch_ms();
        task.status = TaskStatus::InReview;
        task.review_started_at_ms = Some(now);
        self.tasks.save(task)?;

        worker.phase = Some(Phase::AwaitingReview);
        worker.status = ProcessStatus::Ready;
        worker.last_activity_at_ms = now;
        self.processes.save(worker.clone())?;

        let mut outcome = Outcome::with_events(vec![Self::status_event(&worker)]);
        if !self.mailboxes.is_empty(worker_id) {
            outcome.push_follow_up(Command::internal(CommandKind::DeliverQueued {
                process_id: worker_id.clone(),
            }));
        }
        Ok(outcome)
    }

    /// A reviewer delivers its verdict.
    pub(crate) async fn handle_report_verdict(
        &self,
        worker_id: &ProcessId,
        verdict: Verdict,
        comments: &str,
    ) -> Result<Outcome, EngineError> {
        let mut reviewer = self.get_worker(worker_id)?;
        if reviewer.phase_or_idle() != Phase::Reviewing {
            return Err(EngineError::ProcessNotReviewing(
                worker_id.clone(),
                reviewer.phase_or_idle(),
            ));
        }
        let task_id = reviewer
            .task_id
            .clone()
            .ok_or_else(|| EngineError::NoTaskAssigned(worker_id.clone()))?;
        let mut task =
            self.tasks.get(&task_id).ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;
        if !task.is_reviewer(worker_id) {
            return Err(EngineError::ProcessNotReviewing(
                worker_id.clone(),
                reviewer.phase_or_idle(),
            ));
        }

        let body = match verdict {
            Verdict::Approved => format!("Review APPROVED by {}", worker_id),
            Verdict::Denied => format!("Review DENIED by {}: {}", worker_id, comments),
        };
        self.issues.add_comment(&task_id, worker_id.as_str(), &body).await?;

        let now = self.clock.epoch_ms();
        let mut outcome = Outcome::empty();

        match verdict {
            Verdict::Approved => {
                task.status = TaskStatus::Approved;
                self.tasks.save(task)?;
                self.sounds.play(SoundCue::Approve);
            }
            Verdict::Denied => {
                task.status = TaskStatus::Denied;
                // Clearing the reviewer is what makes re-assignment legal.
                task.reviewer = None;
                let implementer = task.implementer.clone();
                self.tasks.save(task)?;
                self.sounds.play(SoundCue::Deny);

                if let Some(implementer_id) = implementer {
                    if let Some(mut implementer) = self.processes.get(&implementer_id) {
                        if implementer.phase == Some(Phase::AwaitingReview) {
                            implementer.phase = Some(Phase::AddressingFeedback);
                            self.processes.save(implementer.clone())?;
                            outcome.push_event(Self::status_event(&implementer));
                        }
                    }
                }
            }
        }

        reviewer.phase = Some(Phase::Idle);
        reviewer.task_id = None;
        reviewer.status = ProcessStatus::Ready;
        reviewer.last_activity_at_ms = now;
        self.processes.save(reviewer.clone())?;
        outcome.push_event(Self::status_event(&reviewer));

        if !self.mailboxes.is_empty(worker_id) {
            outcome.push_follow_up(Command::internal(CommandKind::DeliverQueued {
                process_id: worker_id.clone(),
            }));
        }
        Ok(outcome)
    }

    /// Let an approved implementation proceed to commit.
    pub(crate) fn handle_approve_commit(
        &self,
        implementer_id: &ProcessId,
        task_id: &TaskId,
    ) -> Result<Outcome, EngineError> {
        let mut task =
            self.tasks.get(task_id).ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;
        if task.status != TaskStatus::Approved {
            return Err(EngineError::TaskNotApproved(task_id.clone(), task.status));
        }
        if !task.is_implementer(implementer_id) {
            return Err(EngineError::ProcessNotImplementer(
                implementer_id.clone(),
                task_id.clone(),
            ));
        }

        let mut implementer = self.get_worker(implementer_id)?;
        if implementer.phase != Some(Phase::AwaitingReview) {
            return Err(EngineError::ProcessNotAwaitingReview(
                implementer_id.clone(),
                implementer.phase_or_idle(),
            ));
        }

        implementer.phase = Some(Phase::Committing);
        self.processes.save(implementer.clone())?;
        task.status = TaskStatus::Committing;
        self.tasks.save(task)?;

        let mut outcome = Outcome::with_events(vec![Self::status_event(&implementer)]);
        self.queue_prompt(&mut outcome, implementer_id, prompts::commit_approval(task_id))?;
        Ok(outcome)
    }

    /// Route denial feedback back to the implementer.
    pub(crate) fn handle_assign_review_feedback(
        &self,
        implementer_id: &ProcessId,
        task_id: &TaskId,
        feedback: &str,
    ) -> Result<Outcome, EngineError> {
        let mut task =
            self.tasks.get(task_id).ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;
        if task.status != TaskStatus::Denied {
            return Err(EngineError::TaskNotDenied(task_id.clone(), task.status));
        }
        if !task.is_implementer(implementer_id) {
            return Err(EngineError::ProcessNotImplementer(
                implementer_id.clone(),
                task_id.clone(),
            ));
        }

        let mut implementer = self.get_worker(implementer_id)?;
        // The verdict handler may already have moved the implementer to
        // addressing_feedback; both origins are fine.
        match implementer.phase_or_idle() {
            Phase::AwaitingReview => {
                implementer.phase = Some(Phase::AddressingFeedback);
                self.processes.save(implementer.clone())?;
            }
            Phase::AddressingFeedback => {}
            phase => {
                return Err(EngineError::ProcessNotAwaitingReview(
                    implementer_id.clone(),
                    phase,
                ))
            }
        }

        task.status = TaskStatus::Implementing;
        self.tasks.save(task)?;

        let mut outcome = Outcome::with_events(vec![Self::status_event(&implementer)]);
        self.queue_prompt(
            &mut outcome,
            implementer_id,
            prompts::review_feedback(task_id, feedback),
        )?;
        Ok(outcome)
    }

    /// Generic validated phase transition.
    pub(crate) fn handle_transition_phase(
        &self,
        worker_id: &ProcessId,
        phase: Phase,
    ) -> Result<Outcome, EngineError> {
        let mut worker = self.get_worker(worker_id)?;
        let from = worker.phase_or_idle();
        if !from.can_transition_to(phase) {
            return Err(EngineError::InvalidPhaseTransition { from, to: phase });
        }

        worker.phase = Some(phase);
        if phase == Phase::Idle {
            worker.task_id = None;
            worker.status = ProcessStatus::Ready;
        }
        self.processes.save(worker.clone())?;

        let mut outcome = Outcome::with_events(vec![Self::status_event(&worker)]);
        if phase == Phase::Idle && !self.mailboxes.is_empty(worker_id) {
            outcome.push_follow_up(Command::internal(CommandKind::DeliverQueued {
                process_id: worker_id.clone(),
            }));
        }
        Ok(outcome)
    }

    /// Surface a message to the human operator.
    pub(crate) fn handle_notify_user(
        &self,
        message: String,
        _phase: Option<Phase>,
        task_id: Option<TaskId>,
    ) -> Result<Outcome, EngineError> {
        self.sounds.play(SoundCue::Notify);
        Ok(Outcome::with_events(vec![Event::UserNotification { message, task_id }]))
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
