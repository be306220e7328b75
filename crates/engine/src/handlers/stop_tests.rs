// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

use crate::error::EngineError;
use crate::test_helpers::{process_id_from, setup, setup_with_spawner};
use foreman_core::{
    AgentOptions, CommandKind, Event, Phase, ProcessStatus, QueuedMessage, Role, Sender, TaskId,
};

#[tokio::test]
async fn stop_without_live_agent_is_graceful() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;

    let outcome = ctx
        .handle(CommandKind::StopProcess {
            process_id: worker.clone(),
            force: false,
            reason: "user request".into(),
        })
        .await
        .unwrap();

    assert_eq!(ctx.status(&worker), ProcessStatus::Stopped);
    let data = outcome.data.unwrap();
    assert_eq!(data["stopped"], serde_json::json!(true));
    assert_eq!(data["graceful"], serde_json::json!(true));
}

#[tokio::test]
async fn stop_is_idempotent_on_stopped_and_retired() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.set_status(&worker, ProcessStatus::Stopped);

    let outcome = ctx
        .handle(CommandKind::StopProcess {
            process_id: worker.clone(),
            force: false,
            reason: "again".into(),
        })
        .await
        .unwrap();
    assert!(outcome.events.is_empty());
    assert_eq!(outcome.data.unwrap()["stopped"], serde_json::json!(false));
}

#[tokio::test]
async fn graceful_stop_waits_for_responsive_agent() {
    let ctx = setup_with_spawner();
    let worker = ctx.spawn_worker().await;
    let handle = ctx.spawner.handle(&worker).unwrap();

    let outcome = ctx
        .handle(CommandKind::StopProcess {
            process_id: worker.clone(),
            force: false,
            reason: "wrap up".into(),
        })
        .await
        .unwrap();

    assert!(handle.cancel_requested());
    assert_eq!(outcome.data.unwrap()["graceful"], serde_json::json!(true));
    assert_eq!(ctx.status(&worker), ProcessStatus::Stopped);
    assert!(!ctx.engine.has_live_agent(&worker));
}

#[tokio::test(start_paused = true)]
async fn graceful_stop_escalates_after_timeout() {
    let ctx = setup_with_spawner();
    ctx.spawner.spawn_unresponsive();
    let worker = ctx.spawn_worker().await;
    ctx.set_phase(&worker, Phase::Implementing);
    ctx.engine
        .mailboxes
        .enqueue(&worker, QueuedMessage::new("pending", Sender::User))
        .unwrap();

    let outcome = ctx
        .handle(CommandKind::StopProcess {
            process_id: worker.clone(),
            force: false,
            reason: "unresponsive".into(),
        })
        .await
        .unwrap();

    // Escalated: not graceful, fully stopped, mailbox drained.
    assert_eq!(outcome.data.unwrap()["graceful"], serde_json::json!(false));
    assert_eq!(ctx.status(&worker), ProcessStatus::Stopped);
    assert_eq!(ctx.engine.queue_size(&worker), 0);
    assert!(outcome
        .events
        .contains(&Event::QueueChanged { id: worker.clone(), size: 0 }));
}

#[tokio::test]
async fn force_stop_skips_the_grace_period() {
    let ctx = setup_with_spawner();
    ctx.spawner.spawn_unresponsive();
    let worker = ctx.spawn_worker().await;

    let outcome = ctx
        .handle(CommandKind::StopProcess {
            process_id: worker.clone(),
            force: true,
            reason: "kill".into(),
        })
        .await
        .unwrap();

    assert_eq!(outcome.data.unwrap()["graceful"], serde_json::json!(false));
    assert_eq!(ctx.status(&worker), ProcessStatus::Stopped);
}

#[tokio::test]
async fn committing_worker_is_protected_from_non_force_stop() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;
    ctx.set_phase(&worker, Phase::Committing);
    ctx.set_status(&worker, ProcessStatus::Working);

    let outcome = ctx
        .handle(CommandKind::StopProcess {
            process_id: worker.clone(),
            force: false,
            reason: "impatient".into(),
        })
        .await
        .unwrap();

    // Success with a warning, no state change.
    assert_eq!(outcome.data.unwrap()["stopped"], serde_json::json!(false));
    assert_eq!(outcome.events.len(), 1);
    match &outcome.events[0] {
        Event::Output { output, .. } => assert!(output.contains("Committing phase")),
        other => panic!("expected Output event, got {:?}", other),
    }
    assert_eq!(ctx.status(&worker), ProcessStatus::Working);
    assert_eq!(ctx.phase(&worker), Some(Phase::Committing));

    // Force overrides the guard.
    ctx.handle(CommandKind::StopProcess {
        process_id: worker.clone(),
        force: true,
        reason: "really stop".into(),
    })
    .await
    .unwrap();
    assert_eq!(ctx.status(&worker), ProcessStatus::Stopped);
}

#[tokio::test]
async fn stop_clears_task_references_and_phase() {
    let ctx = setup();
    let worker = ctx.spawn_worker().await;

    ctx.handle(CommandKind::AssignTask {
        worker_id: worker.clone(),
        task_id: TaskId::new("T1"),
        summary: "build it".into(),
    })
    .await
    .unwrap();
    assert_eq!(ctx.phase(&worker), Some(Phase::Implementing));

    ctx.handle(CommandKind::StopProcess {
        process_id: worker.clone(),
        force: false,
        reason: "reassign".into(),
    })
    .await
    .unwrap();

    let process = ctx.engine.process(&worker).unwrap();
    assert_eq!(process.task_id, None);
    assert_eq!(process.phase, Some(Phase::Idle));
    let task = ctx.engine.task(&TaskId::new("T1")).unwrap();
    assert_eq!(task.implementer, None);
}

#[tokio::test]
async fn stopping_an_observer_unsubscribes_it() {
    let ctx = setup();
    let outcome = ctx
        .handle(CommandKind::SpawnProcess {
            role: Role::Observer,
            process_id: None,
            options: AgentOptions::default(),
        })
        .await
        .unwrap();
    let observer = process_id_from(&outcome);

    ctx.handle(CommandKind::StopProcess {
        process_id: observer.clone(),
        force: false,
        reason: "done watching".into(),
    })
    .await
    .unwrap();

    assert_eq!(ctx.fabric.calls(), vec![observer]);
}

#[tokio::test]
async fn stop_unknown_process_fails() {
    let ctx = setup();
    let err = ctx
        .handle(CommandKind::StopProcess {
            process_id: foreman_core::ProcessId::new("ghost"),
            force: false,
            reason: "x".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ProcessNotFound(_)));
}
