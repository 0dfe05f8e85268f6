// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;

use crate::builtins::builtin_host;
use crate::config::RuntimeSettings;
use crate::errors::{ProtocolError, StartupError};
use crate::loader::PredictorRef;
use crate::protocol::{Event, FrameReader, LogSource, ToWorker, TraceContext};
use crate::schema::Mode;
use crate::supervisor::Supervisor;
use crate::traits::Workflow;
use crate::worker::{build_handle, Worker};

fn settings() -> RuntimeSettings {
    RuntimeSettings::from_lookup(|key| match key {
        "COG_PROJECT_ROOT" => Some("/srv/project".to_string()),
        _ => None,
    })
}

fn payload(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

/// An in-process worker for `reference`, wired to a supervisor over a duplex
/// pipe.
async fn connected(reference: &str, mode: Mode) -> (Supervisor, JoinHandle<Result<(), ProtocolError>>) {
    let reference = PredictorRef::parse(reference).unwrap();
    let handle = build_handle(Arc::new(builtin_host()), &reference, mode, &settings())
        .await
        .unwrap();

    let (supervisor_side, worker_side) = tokio::io::duplex(64 * 1024);
    let (worker_read, worker_write) = tokio::io::split(worker_side);
    let (supervisor_read, supervisor_write) = tokio::io::split(supervisor_side);

    let worker = tokio::spawn(Worker::new(Arc::new(handle)).serve(worker_read, worker_write));
    (Supervisor::connect(supervisor_read, supervisor_write), worker)
}

#[tokio::test]
async fn test_echo_prediction_end_to_end() {
    let (mut supervisor, worker) = connected("builtins/echo.rs:Echo", Mode::Predict).await;

    let mut prediction = supervisor
        .predict(
            payload(json!({"text": "hi", "count": 3})),
            Some(TraceContext::new(1, 2, 1)),
        )
        .unwrap();

    let mut events = Vec::new();
    while let Some(event) = prediction.next_event().await {
        events.push(event.unwrap());
    }
    let outputs: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::PredictionOutput { .. }))
        .collect();
    assert_eq!(outputs, vec![&Event::PredictionOutput { payload: json!("hi hi hi") }]);
    assert_eq!(events.last(), Some(&Event::succeeded()));

    supervisor.shutdown().await.unwrap();
    worker.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_collect_gathers_logs_and_output() {
    let (mut supervisor, _worker) = connected("builtins/echo.rs:Echo", Mode::Predict).await;

    let result = supervisor
        .predict(payload(json!({"text": "hey"})), None)
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert!(result.succeeded());
    assert_eq!(result.output(), Some(&json!("hey")));
    assert_eq!(result.logs, vec![(LogSource::Stdout, "echoing 1 time(s)".to_string())]);

    // Invalid input fails the prediction, not the worker.
    let failed = supervisor
        .predict(payload(json!({"text": "x", "count": 0})), None)
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert!(failed.error);
    assert!(failed.error_detail.unwrap().contains("count"));

    let again = supervisor
        .predict(payload(json!({"text": "still"})), None)
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(again.output(), Some(&json!("still")));
}

#[tokio::test]
async fn test_streaming_and_cancellation() {
    let (mut supervisor, _worker) = connected("builtins/counter.rs:Counter", Mode::Predict).await;

    let streamed = supervisor
        .predict(payload(json!({"n": 3})), None)
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert!(streamed.multi);
    assert_eq!(streamed.outputs, vec![json!(0), json!(1), json!(2)]);
    assert_eq!(streamed.output(), None);

    let prediction = supervisor
        .predict(payload(json!({"n": 1000, "delay_ms": 10})), None)
        .unwrap();
    let canceler = prediction.canceler();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceler.cancel().unwrap();
    });
    let canceled = prediction.collect().await.unwrap();
    assert!(canceled.canceled);
    assert!(!canceled.error);
    assert!(canceled.outputs.len() < 1000);

    // The worker is ready for more.
    let next = supervisor
        .predict(payload(json!({"n": 1})), None)
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(next.outputs, vec![json!(0)]);
}

#[tokio::test]
async fn test_second_prediction_refused_while_outstanding() {
    let (mut supervisor, _worker) = connected("builtins/counter.rs:Counter", Mode::Predict).await;

    let mut prediction = supervisor
        .predict(payload(json!({"n": 3, "delay_ms": 5})), None)
        .unwrap();
    assert!(prediction.next_event().await.unwrap().is_ok());
    drop(prediction);

    let refused = supervisor.predict(payload(json!({"n": 1})), None).err().unwrap();
    assert!(matches!(refused, ProtocolError::Violation(_)));
    assert!(matches!(supervisor.workflow().await, Err(ProtocolError::Violation(_))));

    supervisor.finish_outstanding().await.unwrap();
    let result = supervisor
        .predict(payload(json!({"n": 1})), None)
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert!(result.succeeded());
}

#[tokio::test]
async fn test_workflow_request() {
    let (mut supervisor, _worker) = connected("builtins/shout.rs:shout", Mode::Predict).await;
    assert_eq!(supervisor.workflow().await.unwrap(), Workflow::default());

    let result = supervisor
        .predict(payload(json!({"text": "quiet"})), None)
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(result.output(), Some(&json!("QUIET")));
}

#[tokio::test]
async fn test_train_mode() {
    let (mut supervisor, _worker) = connected("builtins/echo.rs:Echo", Mode::Train).await;
    let result = supervisor
        .predict(payload(json!({"text": "corpus"})), None)
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(result.output(), Some(&json!({"weights": "echo:corpus"})));
}

#[tokio::test]
async fn test_shutdown_is_idempotent_and_final() {
    let (mut supervisor, worker) = connected("builtins/echo.rs:Echo", Mode::Predict).await;

    supervisor.shutdown().await.unwrap();
    supervisor.shutdown().await.unwrap();
    assert!(supervisor.is_shut_down());
    worker.await.unwrap().unwrap();

    assert!(matches!(
        supervisor.predict(payload(json!({"text": "late"})), None).err(),
        Some(ProtocolError::ShutDown)
    ));
    assert!(matches!(supervisor.workflow().await, Err(ProtocolError::ShutDown)));
}

#[tokio::test]
async fn test_startup_failures() {
    let host = Arc::new(builtin_host());

    let missing = PredictorRef::parse("predict.py:Predictor").unwrap();
    let error = build_handle(host.clone(), &missing, Mode::Predict, &settings())
        .await
        .err()
        .unwrap();
    assert!(matches!(error, StartupError::Config(_)));

    let counter = PredictorRef::parse("builtins/counter.rs:Counter").unwrap();
    let error = build_handle(host, &counter, Mode::Train, &settings())
        .await
        .err()
        .unwrap();
    assert!(matches!(error, StartupError::NoTrainEntry(_)));
}

/// A scripted "worker" that breaks the rules.
#[tokio::test]
async fn test_sequencing_violation_is_reported() {
    let (supervisor_side, worker_side) = tokio::io::duplex(4096);
    let (supervisor_read, supervisor_write) = tokio::io::split(supervisor_side);
    let (worker_read, mut worker_write) = tokio::io::split(worker_side);
    let mut supervisor = Supervisor::connect(supervisor_read, supervisor_write);

    let mut prediction = supervisor.predict(payload(json!({})), None).unwrap();

    let mut requests: FrameReader<_, ToWorker> = FrameReader::new(worker_read);
    assert!(requests.next().await.unwrap().is_ok());
    for frame in [
        json!({"type": "PredictionOutputType", "multi": false}),
        json!({"type": "PredictionOutput", "payload": 1}),
        json!({"type": "PredictionOutput", "payload": 2}),
    ] {
        let line = format!("{}\n", frame);
        worker_write.write_all(line.as_bytes()).await.unwrap();
    }

    assert!(prediction.next_event().await.unwrap().is_ok());
    assert!(prediction.next_event().await.unwrap().is_ok());
    assert!(matches!(
        prediction.next_event().await,
        Some(Err(ProtocolError::Violation(_)))
    ));
    assert!(prediction.next_event().await.is_none());
}

/// Text a worker prints on its stdout is a log line, not a broken frame.
#[tokio::test]
async fn test_stray_stdout_text_becomes_a_log_line() {
    let (supervisor_side, worker_side) = tokio::io::duplex(4096);
    let (supervisor_read, supervisor_write) = tokio::io::split(supervisor_side);
    let (worker_read, mut worker_write) = tokio::io::split(worker_side);
    let mut supervisor = Supervisor::connect(supervisor_read, supervisor_write);

    let prediction = supervisor.predict(payload(json!({})), None).unwrap();

    let mut requests: FrameReader<_, ToWorker> = FrameReader::new(worker_read);
    assert!(requests.next().await.unwrap().is_ok());
    let script = [
        "loading weights... 50%".to_string(),
        json!({"type": "PredictionOutputType", "multi": false}).to_string(),
        json!({"type": "PredictionOutput", "payload": 1}).to_string(),
        json!({"type": "Done"}).to_string(),
    ];
    for line in script {
        worker_write.write_all(format!("{}\n", line).as_bytes()).await.unwrap();
    }

    let result = prediction.collect().await.unwrap();
    assert!(result.succeeded());
    assert_eq!(result.output(), Some(&json!(1)));
    assert_eq!(result.logs, vec![(LogSource::Stdout, "loading weights... 50%".to_string())]);

    // The tracker is back to idle, so the next request goes out.
    assert!(supervisor.predict(payload(json!({})), None).is_ok());
}
