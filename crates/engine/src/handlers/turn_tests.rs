// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

use crate::test_helpers::{deliver_targets, setup, setup_with_spawner};
use foreman_core::{
    AgentFailure, CommandKind, Event, ProcessStatus, QueuedMessage, Sender, TaskId, TurnMetrics,
};

fn metrics() -> TurnMetrics {
    TurnMetrics { input_tokens: 100, output_tokens: 40, ..Default::default() }
}

#[tokio::test]
async fn successful_turn_returns_to_ready() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.set_status(&worker, ProcessStatus::Working);
    ctx.engine.enforcer().record_tool_call(&worker, "signal_ready");

    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: true,
            metrics: Some(metrics()),
            error: None,
        })
        .await
        .unwrap();

    assert_eq!(
        outcome.events,
        vec![
            Event::Ready { id: worker.clone() },
            Event::TokenUsage { id: worker.clone(), metrics: metrics() },
        ]
    );
    let process = ctx.engine.process(&worker).unwrap();
    assert_eq!(process.status, ProcessStatus::Ready);
    assert!(process.has_completed_turn);
    assert_eq!(process.metrics, Some(metrics()));
}

#[tokio::test]
async fn completion_with_queued_messages_schedules_delivery() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.set_status(&worker, ProcessStatus::Working);
    ctx.engine.enforcer().record_tool_call(&worker, "post_message");
    ctx.engine
        .mailboxes
        .enqueue(&worker, QueuedMessage::new("next task", Sender::Coordinator))
        .unwrap();

    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: true,
            metrics: None,
            error: None,
        })
        .await
        .unwrap();

    assert_eq!(deliver_targets(&outcome), vec![worker]);
}

#[tokio::test]
async fn turn_complete_on_retired_process_is_a_noop() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.handle(CommandKind::RetireProcess { process_id: worker.clone(), reason: "x".into() })
        .await
        .unwrap();

    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: true,
            metrics: None,
            error: None,
        })
        .await
        .unwrap();
    assert!(outcome.events.is_empty());
    assert_eq!(ctx.status(&worker), ProcessStatus::Retired);
}

#[tokio::test]
async fn first_successful_turn_captures_the_session_ref() {
    let ctx = setup_with_spawner();
    let worker = ctx.spawn_worker().await;
    let handle = ctx.spawner.handle(&worker).unwrap();
    handle.set_session_ref("sess-abc123");
    ctx.engine.enforcer().record_tool_call(&worker, "signal_ready");
    // First turns are exempt from enforcement while newly spawned.

    ctx.handle(CommandKind::TurnComplete {
        process_id: worker.clone(),
        succeeded: true,
        metrics: None,
        error: None,
    })
    .await
    .unwrap();

    let process = ctx.engine.process(&worker).unwrap();
    assert_eq!(process.session_id.as_deref(), Some("sess-abc123"));
    let calls = ctx.session_refs.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "sess-abc123");

    // Second turn does not re-capture.
    ctx.set_status(&worker, ProcessStatus::Working);
    handle.set_session_ref("sess-other");
    ctx.engine.enforcer().record_tool_call(&worker, "signal_ready");
    ctx.handle(CommandKind::TurnComplete {
        process_id: worker.clone(),
        succeeded: true,
        metrics: None,
        error: None,
    })
    .await
    .unwrap();
    assert_eq!(
        ctx.engine.process(&worker).unwrap().session_id.as_deref(),
        Some("sess-abc123")
    );
    assert_eq!(ctx.session_refs.calls().len(), 1);
}

#[tokio::test]
async fn non_compliant_turn_gets_a_system_reminder() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    // Simulate a prior delivered turn so the newly-spawned exemption is gone.
    ctx.engine.enforcer().reset_turn(&worker);
    ctx.set_status(&worker, ProcessStatus::Working);

    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: true,
            metrics: Some(metrics()),
            error: None,
        })
        .await
        .unwrap();

    // TokenUsage but no Ready event: the UI must not read this as done.
    assert_eq!(
        outcome.events,
        vec![Event::TokenUsage { id: worker.clone(), metrics: metrics() }]
    );
    assert_eq!(deliver_targets(&outcome), vec![worker.clone()]);
    assert_eq!(outcome.data.unwrap()["enforcement"], serde_json::json!(true));

    assert_eq!(ctx.status(&worker), ProcessStatus::Ready);
    assert_eq!(ctx.engine.enforcer().retries(&worker), 1);

    // The reminder is queued with the system sender tag.
    let entry = ctx.engine.mailboxes.dequeue(&worker).unwrap();
    assert_eq!(entry.sender, Sender::System);
    assert!(entry.content.contains("post_message"));
}

#[tokio::test]
async fn newly_spawned_workers_are_exempt_from_enforcement() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.set_status(&worker, ProcessStatus::Working);

    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: true,
            metrics: None,
            error: None,
        })
        .await
        .unwrap();

    assert!(outcome.events.contains(&Event::Ready { id: worker.clone() }));
    assert_eq!(ctx.engine.enforcer().retries(&worker), 0);
}

#[tokio::test]
async fn enforcement_stops_after_max_retries() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.engine.enforcer().reset_turn(&worker);

    for expected_retry in 1..=2u32 {
        ctx.set_status(&worker, ProcessStatus::Working);
        let outcome = ctx
            .handle(CommandKind::TurnComplete {
                process_id: worker.clone(),
                succeeded: true,
                metrics: None,
                error: None,
            })
            .await
            .unwrap();
        assert_eq!(deliver_targets(&outcome), vec![worker.clone()]);
        assert_eq!(ctx.engine.enforcer().retries(&worker), expected_retry);
    }

    // Third non-compliant completion: budget exhausted, turn completes.
    ctx.set_status(&worker, ProcessStatus::Working);
    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: true,
            metrics: None,
            error: None,
        })
        .await
        .unwrap();
    assert!(outcome.events.contains(&Event::Ready { id: worker.clone() }));
    assert_eq!(ctx.engine.enforcer().retries(&worker), 2);
}

#[tokio::test]
async fn reminder_then_compliance_completes_normally() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.engine.enforcer().reset_turn(&worker);
    ctx.set_status(&worker, ProcessStatus::Working);

    // Non-compliant completion queues the reminder.
    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: true,
            metrics: None,
            error: None,
        })
        .await
        .unwrap();
    // Deliver the reminder; system sender keeps the retry counter.
    ctx.drain(outcome).await;
    assert_eq!(ctx.engine.enforcer().retries(&worker), 1);

    // The worker reports properly this time.
    ctx.engine.enforcer().record_tool_call(&worker, "post_message");
    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: true,
            metrics: None,
            error: None,
        })
        .await
        .unwrap();
    assert!(outcome.events.contains(&Event::Ready { id: worker.clone() }));
    assert!(outcome.data.is_none());
}

#[tokio::test]
async fn context_exhausted_worker_notifies_the_coordinator() {
    let ctx = setup();
    let coordinator = ctx.spawn_coordinator().await;
    let worker = ctx.spawn_worker().await;
    ctx.handle(CommandKind::AssignTask {
        worker_id: worker.clone(),
        task_id: TaskId::new("T9"),
        summary: "big refactor".into(),
    })
    .await
    .unwrap();
    ctx.set_status(&worker, ProcessStatus::Working);
    ctx.set_status(&coordinator, ProcessStatus::Working);

    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: false,
            metrics: None,
            error: Some(AgentFailure::ContextExceeded),
        })
        .await
        .unwrap();

    assert_eq!(ctx.status(&worker), ProcessStatus::Failed);
    assert_eq!(deliver_targets(&outcome), vec![coordinator.clone()]);

    let entry = ctx.engine.mailboxes.dequeue(&coordinator).unwrap();
    assert_eq!(entry.sender, Sender::System);
    assert!(entry.content.contains("WORKER CONTEXT EXHAUSTED"));
    assert!(entry.content.contains(worker.as_str()));
    assert!(entry.content.contains("replace_worker"));
    assert!(entry.content.contains("T9"));
}

#[tokio::test]
async fn context_exhausted_coordinator_fails_without_self_notification() {
    let ctx = setup();
    let coordinator = ctx.spawn_coordinator().await;
    ctx.set_status(&coordinator, ProcessStatus::Working);

    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: coordinator.clone(),
            succeeded: false,
            metrics: None,
            error: Some(AgentFailure::ContextExceeded),
        })
        .await
        .unwrap();

    assert_eq!(ctx.status(&coordinator), ProcessStatus::Failed);
    assert!(outcome.follow_ups.is_empty());
    assert_eq!(ctx.engine.queue_size(&coordinator), 0);
}

#[tokio::test]
async fn startup_failure_marks_failed_without_ready() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.set_status(&worker, ProcessStatus::Working);

    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: false,
            metrics: Some(metrics()),
            error: Some(AgentFailure::Unauthorized),
        })
        .await
        .unwrap();

    assert_eq!(ctx.status(&worker), ProcessStatus::Failed);
    assert!(!outcome.events.iter().any(|e| matches!(e, Event::Ready { .. })));
    assert!(outcome.events.iter().any(|e| matches!(
        e,
        Event::ProcessError { error, .. } if error == "unauthorized"
    )));
    assert!(outcome
        .events
        .contains(&Event::TokenUsage { id: worker.clone(), metrics: metrics() }));
}

#[tokio::test]
async fn paused_process_stays_paused_on_completion() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.set_status(&worker, ProcessStatus::Paused);
    ctx.engine.enforcer().record_tool_call(&worker, "signal_ready");
    ctx.engine
        .mailboxes
        .enqueue(&worker, QueuedMessage::new("later", Sender::User))
        .unwrap();

    let outcome = ctx
        .handle(CommandKind::TurnComplete {
            process_id: worker.clone(),
            succeeded: true,
            metrics: None,
            error: None,
        })
        .await
        .unwrap();

    assert_eq!(ctx.status(&worker), ProcessStatus::Paused);
    assert!(!outcome.events.iter().any(|e| matches!(e, Event::Ready { .. })));
    assert!(outcome.follow_ups.is_empty());
}
