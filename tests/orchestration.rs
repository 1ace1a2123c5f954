//! End-to-end orchestration scenarios against a recording gateway.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use exchange_manager::exchange::{ExchangeDefinition, ExchangeMode, NewConsumer};
use exchange_manager::orchestrator::{ConsumerState, ReloadSettings};
use exchange_manager::process::ProcessKey;
use exchange_manager::worker::ConsumerWorker;
use exchange_manager::{ExchangeManager, ExchangeRegistry, ManagerError, ProcessRegistry};

mod common;
use common::{GatewayCall, RecordingGateway};

fn manager_with(gateway: Arc<RecordingGateway>, settings: ReloadSettings) -> Arc<ExchangeManager> {
    Arc::new(ExchangeManager::new(
        Arc::new(ExchangeRegistry::new()),
        Arc::new(ProcessRegistry::new()),
        gateway,
        settings,
    ))
}

fn definition(name: &str, mode: &str, comment: &str) -> ExchangeDefinition {
    ExchangeDefinition {
        name: name.into(),
        mode: mode.into(),
        durable: true,
        comment: comment.into(),
        ..Default::default()
    }
}

/// Poll until the process table holds `expected` entries.
async fn wait_for_process_count(manager: &ExchangeManager, expected: usize) {
    for _ in 0..100 {
        if manager.processes().count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "process count never reached {} (at {})",
        expected,
        manager.processes().count()
    );
}

#[tokio::test]
async fn declared_exchange_is_stored_with_zero_consumers() {
    let gateway = Arc::new(RecordingGateway::new());
    let manager = manager_with(gateway.clone(), ReloadSettings::default());

    manager
        .declare(definition("orders", "topic", "order events"))
        .await
        .unwrap();

    let stored = manager.get("orders").unwrap();
    assert_eq!(stored.mode, ExchangeMode::Topic);
    assert!(stored.durable);
    assert_eq!(stored.comment, "order events");
    assert!(stored.consumers.is_empty());

    assert_eq!(
        gateway.calls(),
        vec![GatewayCall::Declare {
            name: "orders".into(),
            mode: ExchangeMode::Topic,
            durable: true,
        }]
    );
}

#[tokio::test]
async fn exchange_reload_stops_both_consumers_then_reloads_once() {
    let gateway = Arc::new(RecordingGateway::new());
    let manager = manager_with(gateway.clone(), ReloadSettings::default());

    manager
        .declare(definition("orders", "topic", "order events"))
        .await
        .unwrap();
    for id in ["c1", "c2"] {
        manager
            .bind_consumer(
                "orders",
                NewConsumer {
                    id: Some(id.into()),
                    ..Default::default()
                },
            )
            .unwrap();
        ConsumerWorker::new(
            "orders",
            id,
            manager.processes().clone(),
            Duration::from_millis(20),
        )
        .spawn();
    }
    wait_for_process_count(&manager, 2).await;

    manager.reload_exchange("orders").await.unwrap();

    assert!(manager.processes().get(&ProcessKey::new("orders", "c1")).is_none());
    assert!(manager.processes().get(&ProcessKey::new("orders", "c2")).is_none());
    assert_eq!(gateway.reload_calls_for("orders"), 1);
}

#[tokio::test]
async fn system_reload_drains_workers_then_redeclares_everything() {
    let gateway = Arc::new(RecordingGateway::new());
    let manager = manager_with(gateway.clone(), ReloadSettings::default());

    manager
        .declare(definition("orders", "topic", "order events"))
        .await
        .unwrap();
    manager
        .declare(definition("billing", "direct", "billing events"))
        .await
        .unwrap();

    for (exchange, id) in [("orders", "c1"), ("orders", "c2"), ("billing", "c1")] {
        manager
            .bind_consumer(
                exchange,
                NewConsumer {
                    id: Some(id.into()),
                    ..Default::default()
                },
            )
            .unwrap();
        ConsumerWorker::new(
            exchange,
            id,
            manager.processes().clone(),
            Duration::from_millis(20),
        )
        .spawn();
    }
    wait_for_process_count(&manager, 3).await;

    let redeclared = manager.reload_all().await.unwrap();
    assert_eq!(redeclared, 2);

    assert_eq!(manager.processes().count(), 0);
    assert_eq!(gateway.stop_all_calls(), 1);
    // One declare at creation plus exactly one re-declare each.
    assert_eq!(gateway.declare_calls_for("orders"), 2);
    assert_eq!(gateway.declare_calls_for("billing"), 2);
}

#[tokio::test]
async fn failed_broker_declare_never_reaches_the_registry() {
    let gateway = Arc::new(RecordingGateway::new());
    gateway.fail_declare.store(true, Ordering::SeqCst);
    let manager = manager_with(gateway.clone(), ReloadSettings::default());

    let err = manager
        .declare(definition("orders", "topic", "order events"))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::Broker { operation: "declare", .. }));
    assert!(!manager.exchanges().exists("orders"));
    assert_eq!(gateway.calls().len(), 1);
}

#[tokio::test]
async fn invalid_mode_is_rejected_before_the_gateway_sees_anything() {
    let gateway = Arc::new(RecordingGateway::new());
    let manager = manager_with(gateway.clone(), ReloadSettings::default());

    let err = manager
        .declare(definition("orders", "headers", "order events"))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::Validation { field: "mode", .. }));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn reload_aborts_with_drain_timeout_when_a_worker_never_leaves() {
    let gateway = Arc::new(RecordingGateway::new());
    let settings = ReloadSettings {
        consumer_stop_timeout: Duration::from_millis(100),
        ..Default::default()
    };
    let manager = manager_with(gateway.clone(), settings);

    manager
        .declare(definition("orders", "fanout", "order events"))
        .await
        .unwrap();
    manager
        .bind_consumer(
            "orders",
            NewConsumer {
                id: Some("stuck".into()),
                ..Default::default()
            },
        )
        .unwrap();

    // Register the process by hand and never honor the stop request.
    let key = ProcessKey::new("orders", "stuck");
    manager.processes().upsert(&key, 1);

    let err = manager.reload_exchange("orders").await.unwrap_err();
    assert!(matches!(
        err,
        ManagerError::DrainTimeout { remaining: 1, .. }
    ));
    // The broker exchange was never reloaded out from under the worker.
    assert_eq!(gateway.reload_calls_for("orders"), 0);

    // The worker eventually honors the (already-delivered) cancellation.
    manager.processes().remove(&key);
    manager.reload_exchange("orders").await.unwrap();
    assert_eq!(gateway.reload_calls_for("orders"), 1);
}

#[tokio::test]
async fn system_reload_times_out_instead_of_hanging_forever() {
    let gateway = Arc::new(RecordingGateway::new());
    let settings = ReloadSettings {
        drain_timeout: Duration::from_millis(150),
        ..Default::default()
    };
    let manager = manager_with(gateway.clone(), settings);

    manager
        .declare(definition("orders", "topic", "order events"))
        .await
        .unwrap();
    manager.processes().upsert(&ProcessKey::new("orders", "stuck"), 1);

    let err = manager.reload_all().await.unwrap_err();
    assert!(matches!(err, ManagerError::DrainTimeout { .. }));
    assert_eq!(gateway.stop_all_calls(), 1);
    // No re-declare happened: only the original declare is recorded.
    assert_eq!(gateway.declare_calls_for("orders"), 1);
}

#[tokio::test]
async fn broker_reload_failure_is_surfaced_with_context() {
    let gateway = Arc::new(RecordingGateway::new());
    gateway.fail_reload.store(true, Ordering::SeqCst);
    let manager = manager_with(gateway.clone(), ReloadSettings::default());

    manager
        .declare(definition("orders", "topic", "order events"))
        .await
        .unwrap();

    let err = manager.reload_exchange("orders").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("orders"));
    assert!(message.contains("broker unreachable"));
    // Registry state is untouched so the operator can retry.
    assert!(manager.exchanges().exists("orders"));
}

#[tokio::test]
async fn status_reports_liveness_and_degrades_backlog_failures_to_zero() {
    let gateway = Arc::new(RecordingGateway::new());
    gateway.backlog.store(7, Ordering::SeqCst);
    let manager = manager_with(gateway.clone(), ReloadSettings::default());

    manager
        .declare(definition("orders", "topic", "order events"))
        .await
        .unwrap();
    for id in ["c1", "c2"] {
        manager
            .bind_consumer(
                "orders",
                NewConsumer {
                    id: Some(id.into()),
                    ..Default::default()
                },
            )
            .unwrap();
    }
    // Only c1 is running.
    manager.processes().upsert(&ProcessKey::new("orders", "c1"), 42);

    let rows = manager.status("orders").await.unwrap();
    assert_eq!(rows.len(), 2);

    let c1 = rows.iter().find(|r| r.consumer_id == "c1").unwrap();
    assert_eq!(c1.state, ConsumerState::Running);
    assert_eq!(c1.last_heartbeat, 42);
    assert_eq!(c1.pending, 7);

    let c2 = rows.iter().find(|r| r.consumer_id == "c2").unwrap();
    assert_eq!(c2.state, ConsumerState::Stopped);
    assert_eq!(c2.last_heartbeat, 0);

    // A failing backlog query is logged and reported as zero, not an error.
    gateway.fail_count.store(true, Ordering::SeqCst);
    let rows = manager.status("orders").await.unwrap();
    assert!(rows.iter().all(|r| r.pending == 0));
}
