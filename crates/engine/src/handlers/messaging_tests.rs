// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

use crate::test_helpers::{deliver_targets, setup};
use foreman_core::{CommandKind, CommandSource, Event, ProcessId, ProcessStatus, Sender};

#[tokio::test]
async fn send_to_ready_process_schedules_delivery() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;

    let outcome = ctx
        .handle_from(
            CommandSource::User,
            CommandKind::SendToProcess { process_id: worker.clone(), content: "hello".into() },
        )
        .await
        .unwrap();

    // No QueueChanged yet; delivery emits it after the dequeue.
    assert!(outcome.events.is_empty());
    assert_eq!(deliver_targets(&outcome), vec![worker.clone()]);
    assert_eq!(ctx.engine.queue_size(&worker), 1);
}

#[tokio::test]
async fn send_to_working_process_only_queues() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.set_status(&worker, ProcessStatus::Working);

    let outcome = ctx
        .handle_from(
            CommandSource::User,
            CommandKind::SendToProcess { process_id: worker.clone(), content: "hello".into() },
        )
        .await
        .unwrap();

    assert_eq!(
        outcome.events,
        vec![Event::QueueChanged { id: worker.clone(), size: 1 }]
    );
    assert!(outcome.follow_ups.is_empty());
}

#[tokio::test]
async fn sender_tag_follows_command_source() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.set_status(&worker, ProcessStatus::Working);

    ctx.handle_from(
        CommandSource::McpTool,
        CommandKind::SendToProcess { process_id: worker.clone(), content: "from coord".into() },
    )
    .await
    .unwrap();
    ctx.handle_from(
        CommandSource::User,
        CommandKind::SendToProcess { process_id: worker.clone(), content: "from user".into() },
    )
    .await
    .unwrap();

    ctx.set_status(&worker, ProcessStatus::Ready);
    let first = ctx
        .handle(CommandKind::DeliverQueued { process_id: worker.clone() })
        .await
        .unwrap();
    assert!(first.events.iter().any(|e| matches!(
        e,
        Event::Incoming { sender: Sender::Coordinator, .. }
    )));

    ctx.set_status(&worker, ProcessStatus::Ready);
    let second = ctx
        .handle(CommandKind::DeliverQueued { process_id: worker.clone() })
        .await
        .unwrap();
    assert!(second.events.iter().any(|e| matches!(
        e,
        Event::Incoming { sender: Sender::User, .. }
    )));
}

#[tokio::test]
async fn send_to_unknown_process_fails() {
    let ctx = setup();
    let err = ctx
        .handle(CommandKind::SendToProcess {
            process_id: ProcessId::new("nope"),
            content: "hi".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::EngineError::ProcessNotFound(_)));
}

#[tokio::test]
async fn send_to_retired_process_fails() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.handle(CommandKind::RetireProcess { process_id: worker.clone(), reason: "done".into() })
        .await
        .unwrap();

    let err = ctx
        .handle(CommandKind::SendToProcess { process_id: worker, content: "hi".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::EngineError::ProcessRetired(_)));
}

#[tokio::test]
async fn deliver_emits_working_incoming_queue_in_order() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    let outcome = ctx
        .handle_from(
            CommandSource::User,
            CommandKind::SendToProcess { process_id: worker.clone(), content: "task".into() },
        )
        .await
        .unwrap();

    let events = ctx.drain(outcome).await;
    assert_eq!(
        events,
        vec![
            Event::Working { id: worker.clone() },
            Event::Incoming { id: worker.clone(), message: "task".into(), sender: Sender::User },
            Event::QueueChanged { id: worker.clone(), size: 0 },
        ]
    );
    assert_eq!(ctx.status(&worker), ProcessStatus::Working);
    assert_eq!(ctx.deliverer.calls(), vec![(worker, "task".to_string())]);
}

#[tokio::test]
async fn deliver_from_empty_queue_fails() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;

    let err = ctx
        .handle(CommandKind::DeliverQueued { process_id: worker })
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::EngineError::QueueEmpty(_)));
}

#[tokio::test]
async fn deliver_to_working_process_requeues_without_delivering() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.set_status(&worker, ProcessStatus::Working);
    ctx.handle_from(
        CommandSource::User,
        CommandKind::SendToProcess { process_id: worker.clone(), content: "queued".into() },
    )
    .await
    .unwrap();

    let outcome = ctx
        .handle(CommandKind::DeliverQueued { process_id: worker.clone() })
        .await
        .unwrap();

    assert_eq!(outcome.data.unwrap()["delivered"], serde_json::json!(false));
    assert_eq!(ctx.engine.queue_size(&worker), 1);
    assert!(ctx.deliverer.calls().is_empty());
}

#[tokio::test]
async fn failed_delivery_reverts_status_and_requeues_at_front() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.deliverer.fail_for(worker.clone());

    ctx.set_status(&worker, ProcessStatus::Working);
    ctx.handle_from(
        CommandSource::User,
        CommandKind::SendToProcess { process_id: worker.clone(), content: "first".into() },
    )
    .await
    .unwrap();
    ctx.handle_from(
        CommandSource::User,
        CommandKind::SendToProcess { process_id: worker.clone(), content: "second".into() },
    )
    .await
    .unwrap();
    ctx.set_status(&worker, ProcessStatus::Ready);

    let err = ctx
        .handle(CommandKind::DeliverQueued { process_id: worker.clone() })
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::EngineError::Deliver { .. }));

    // Status reverted, entry back at the head.
    assert_eq!(ctx.status(&worker), ProcessStatus::Ready);
    assert_eq!(ctx.engine.queue_size(&worker), 2);
    assert_eq!(
        ctx.engine.mailboxes.dequeue(&worker).unwrap().content,
        "first"
    );
}

#[tokio::test]
async fn delivery_resets_turn_only_for_non_system_senders() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    let enforcer = ctx.engine.enforcer().clone();
    enforcer.record_tool_call(&worker, "post_message");
    enforcer.increment_retry(&worker);

    // System reminder: counters survive.
    ctx.engine
        .mailboxes
        .enqueue(&worker, foreman_core::QueuedMessage::new("reminder", Sender::System))
        .unwrap();
    ctx.handle(CommandKind::DeliverQueued { process_id: worker.clone() }).await.unwrap();
    assert_eq!(enforcer.retries(&worker), 1);

    // Ordinary message: fresh turn.
    ctx.set_status(&worker, ProcessStatus::Ready);
    ctx.engine
        .mailboxes
        .enqueue(&worker, foreman_core::QueuedMessage::new("go", Sender::User))
        .unwrap();
    ctx.handle(CommandKind::DeliverQueued { process_id: worker.clone() }).await.unwrap();
    assert_eq!(enforcer.retries(&worker), 0);
}

#[tokio::test]
async fn broadcast_fans_out_to_active_workers_in_order() {
    let ctx = setup();
    let w1 = ctx.spawn_worker().await;
    let w2 = ctx.spawn_worker().await;
    let w3 = ctx.spawn_worker().await;
    ctx.set_status(&w3, ProcessStatus::Paused);

    let outcome = ctx
        .handle_from(
            CommandSource::McpTool,
            CommandKind::Broadcast { content: "standup".into(), exclude: vec![w2.clone()] },
        )
        .await
        .unwrap();

    let targets: Vec<ProcessId> = outcome
        .follow_ups
        .iter()
        .filter_map(|c| match &c.kind {
            CommandKind::SendToProcess { process_id, .. } => Some(process_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(targets, vec![w1]);

    // Source is preserved so the sender tag stays coordinator.
    assert!(outcome.follow_ups.iter().all(|c| c.source == CommandSource::McpTool));
}

#[tokio::test]
async fn bounded_mailbox_rejects_overflow() {
    let config = crate::config::EngineConfig {
        mailbox_capacity: Some(1),
        ..Default::default()
    };
    let ctx = crate::test_helpers::setup_with_config(config);
    let worker = ctx.spawn_worker().await;
    ctx.set_status(&worker, ProcessStatus::Working);

    ctx.handle(CommandKind::SendToProcess { process_id: worker.clone(), content: "a".into() })
        .await
        .unwrap();
    let err = ctx
        .handle(CommandKind::SendToProcess { process_id: worker, content: "b".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::EngineError::QueueFull(_, 1)));
}
