// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Command handling for the engine.
//!
//! One handler per command variant; the dispatcher calls [`Engine::handle_command`]
//! serially, so handlers are plain sequential code.

mod lifecycle;
mod messaging;
mod replace;
mod stop;
mod turn;
mod workflow;

use crate::engine::Engine;
use crate::error::EngineError;
use crate::outcome::Outcome;
use foreman_core::{Clock, Command, CommandKind};
use tracing::Instrument;

impl<C: Clock> Engine<C> {
    /// Handle a single command and return its outcome.
    ///
    /// Opens a `handler` span named after the command, carrying the source
    /// tag, trace id, and per-command attributes; errors are recorded on
    /// the span before propagating.
    pub async fn handle_command(&self, command: Command) -> Result<Outcome, EngineError> {
        let attrs = command
            .kind
            .fields()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ");
        let span = tracing::info_span!(
            "handler",
            command = command.name(),
            source = %command.source,
            trace_id = command.trace_id.as_deref().unwrap_or(""),
            attrs = %attrs,
        );

        let source = command.source;
        async move {
            let result = self.dispatch(source, command.kind).await;
            if let Err(ref e) = result {
                tracing::error!(error = %e, "handler failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        source: foreman_core::CommandSource,
        kind: CommandKind,
    ) -> Result<Outcome, EngineError> {
        match kind {
            CommandKind::SpawnProcess { role, process_id, options } => {
                self.handle_spawn(role, process_id, options).await
            }
            CommandKind::RetireProcess { process_id, reason } => {
                self.handle_retire(&process_id, &reason)
            }
            CommandKind::StopProcess { process_id, force, reason } => {
                self.handle_stop(&process_id, force, &reason).await
            }
            CommandKind::PauseProcess { process_id } => self.handle_pause(&process_id),
            CommandKind::ResumeProcess { process_id } => self.handle_resume(&process_id),
            CommandKind::ReplaceProcess { process_id, reason } => {
                self.handle_replace_process(&process_id, &reason)
            }
            CommandKind::ReplaceCoordinator { reason } => {
                self.handle_replace_coordinator(&reason).await
            }
            CommandKind::SendToProcess { process_id, content } => {
                self.handle_send_to_process(source, &process_id, content)
            }
            CommandKind::DeliverQueued { process_id } => {
                self.handle_deliver_queued(&process_id).await
            }
            CommandKind::TurnComplete { process_id, succeeded, metrics, error } => {
                self.handle_turn_complete(&process_id, succeeded, metrics, error)
            }
            CommandKind::Broadcast { content, exclude } => {
                self.handle_broadcast(source, &content, &exclude)
            }
            CommandKind::AssignTask { worker_id, task_id, summary } => {
                self.handle_assign_task(&worker_id, &task_id, &summary).await
            }
            CommandKind::AssignReview { reviewer_id, task_id, implementer_id, review_kind } => {
                self.handle_assign_review(&reviewer_id, &task_id, &implementer_id, review_kind)
            }
            CommandKind::ReportComplete { worker_id, summary } => {
                self.handle_report_complete(&worker_id, &summary).await
            }
            CommandKind::ReportVerdict { worker_id, verdict, comments } => {
                self.handle_report_verdict(&worker_id, verdict, &comments).await
            }
            CommandKind::ApproveCommit { implementer_id, task_id } => {
                self.handle_approve_commit(&implementer_id, &task_id)
            }
            CommandKind::AssignReviewFeedback { implementer_id, task_id, feedback } => {
                self.handle_assign_review_feedback(&implementer_id, &task_id, &feedback)
            }
            CommandKind::TransitionPhase { worker_id, phase } => {
                self.handle_transition_phase(&worker_id, phase)
            }
            CommandKind::NotifyUser { message, phase, task_id } => {
                self.handle_notify_user(message, phase, task_id)
            }
        }
    }
}
