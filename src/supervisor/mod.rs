// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The parent side of the protocol.
//!
//! A [`Supervisor`] talks to exactly one worker, either a child process it
//! spawned ([`Supervisor::spawn`]) or any framed duplex channel
//! ([`Supervisor::connect`]). Worker output is drained continuously on its
//! own task, and every event of a prediction is checked against the
//! sequencing rules before it is handed out.

mod prediction;

#[cfg(test)]
mod integration_tests;

pub use prediction::{Canceler, Prediction, PredictionResult};

use std::ffi::OsStr;
use std::process::Stdio;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::consts::SHUTDOWN_GRACE_MS;
use crate::errors::ProtocolError;
use crate::observability::messages::supervisor::{
    ProtocolViolationDetected, RequestDeliveryFailed, WorkerShutdown, WorkerSpawned, WorkerStderr,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::{
    Control, Event, FrameReader, FrameWriter, Line, PredictionTracker, Request, ToWorker, TraceContext,
};
use crate::tools::RemotePredictor;
use crate::traits::Workflow;

pub struct Supervisor {
    outgoing: Option<UnboundedSender<ToWorker>>,
    events: UnboundedReceiver<Result<Event, ProtocolError>>,
    tracker: PredictionTracker,
    child: Option<Child>,
    closed: bool,
}

impl Supervisor {
    /// Drive a worker reachable through `reader`/`writer`.
    pub fn connect<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outgoing, requests) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        tokio::spawn(write_requests(writer, requests));
        tokio::spawn(drain_events(reader, event_tx));

        Self {
            outgoing: Some(outgoing),
            events,
            tracker: PredictionTracker::new(),
            child: None,
            closed: false,
        }
    }

    /// Start `program args...` as a worker process speaking on its stdio.
    ///
    /// The child's stderr is forwarded line by line into this process's log.
    /// The child is killed if the supervisor is dropped without shutting down.
    pub fn spawn<P>(program: P, args: &[String], reference: &str) -> Result<Self, ProtocolError>
    where
        P: AsRef<OsStr>,
    {
        let mut child = Command::new(program.as_ref())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        WorkerSpawned {
            program: &program.as_ref().to_string_lossy(),
            reference,
            pid: child.id(),
        }
        .log();

        tokio::spawn(forward_stderr(stderr));
        let mut supervisor = Self::connect(stdout, stdin);
        supervisor.child = Some(child);
        Ok(supervisor)
    }

    pub fn is_shut_down(&self) -> bool {
        self.outgoing.is_none()
    }

    /// Dispatch a prediction.
    ///
    /// Refused while another prediction is still outstanding.
    pub fn predict(
        &mut self,
        payload: Map<String, Value>,
        trace_context: Option<TraceContext>,
    ) -> Result<Prediction<'_>, ProtocolError> {
        self.ensure_open()?;
        self.tracker.start()?;
        if let Err(e) = self.send(ToWorker::Request(Request::prediction(payload, trace_context))) {
            self.tracker = PredictionTracker::new();
            return Err(e);
        }
        Ok(Prediction::new(self))
    }

    /// Read and discard events until an abandoned prediction reaches `Done`.
    pub async fn finish_outstanding(&mut self) -> Result<(), ProtocolError> {
        while self.tracker.state().is_active() {
            self.next_prediction_event().await?;
        }
        Ok(())
    }

    /// Ask the worker for its agents' combined workflow graph.
    pub async fn workflow(&mut self) -> Result<Workflow, ProtocolError> {
        self.ensure_idle()?;
        self.send(ToWorker::Request(Request::PredictorWorkflowRequest {}))?;

        loop {
            match self.recv().await? {
                Event::PredictorWorkflowResponse { workflow } => return Ok(workflow),
                Event::Log { message, .. } => WorkerStderr { line: &message }.log(),
                other => {
                    return Err(report(ProtocolError::Violation(format!(
                        "{} while waiting for PredictorWorkflowResponse",
                        other.kind()
                    ))))
                }
            }
        }
    }

    /// Register (`add`) or withdraw a remote predictor as an agent tool.
    ///
    /// There is no reply; failures show up as worker log lines.
    pub fn remote_predictor(&mut self, predictor: RemotePredictor, add: bool) -> Result<(), ProtocolError> {
        self.ensure_idle()?;
        self.send(ToWorker::Request(Request::RemotePredictorRequest { predictor, add }))
    }

    /// Tell the worker to stop and wait for it to go away.
    ///
    /// Calling this again is a no-op. Every other request afterwards fails
    /// with [`ProtocolError::ShutDown`].
    pub async fn shutdown(&mut self) -> Result<(), ProtocolError> {
        let Some(outgoing) = self.outgoing.take() else {
            return Ok(());
        };
        let _ = outgoing.send(ToWorker::Request(Request::Shutdown {}));
        drop(outgoing);

        let grace = Duration::from_millis(SHUTDOWN_GRACE_MS);
        let outcome = match self.child.as_mut() {
            Some(child) => match tokio::time::timeout(grace, child.wait()).await {
                Ok(status) => format!("exited with {}", status?),
                Err(_) => {
                    child.kill().await?;
                    "killed after grace period".to_string()
                }
            },
            None => {
                let events = &mut self.events;
                let drained = tokio::time::timeout(grace, async {
                    while events.recv().await.is_some() {}
                })
                .await;
                match drained {
                    Ok(()) => "channel closed".to_string(),
                    Err(_) => "channel still open after grace period".to_string(),
                }
            }
        };
        self.closed = true;

        WorkerShutdown { outcome: &outcome }.log();
        Ok(())
    }

    pub(crate) fn canceler(&self) -> Canceler {
        Canceler::new(self.outgoing.clone())
    }

    /// Next event of the outstanding prediction, checked against the
    /// sequencing rules.
    pub(crate) async fn next_prediction_event(&mut self) -> Result<Event, ProtocolError> {
        let event = self.recv().await?;
        self.tracker.observe(&event).map_err(report)?;
        Ok(event)
    }

    async fn recv(&mut self) -> Result<Event, ProtocolError> {
        match self.events.recv().await {
            Some(frame) => frame.map_err(report),
            None => {
                self.closed = true;
                self.tracker = PredictionTracker::new();
                Err(ProtocolError::ChannelClosed)
            }
        }
    }

    fn send(&self, frame: ToWorker) -> Result<(), ProtocolError> {
        let outgoing = self.outgoing.as_ref().ok_or(ProtocolError::ShutDown)?;
        outgoing.send(frame).map_err(|_| ProtocolError::ChannelClosed)
    }

    fn ensure_open(&self) -> Result<(), ProtocolError> {
        if self.outgoing.is_none() {
            return Err(ProtocolError::ShutDown);
        }
        if self.closed {
            return Err(ProtocolError::ChannelClosed);
        }
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), ProtocolError> {
        self.ensure_open()?;
        if self.tracker.state().is_active() {
            return Err(ProtocolError::Violation(
                "a prediction is still outstanding on this worker".to_string(),
            ));
        }
        Ok(())
    }
}

fn missing_pipe(name: &str) -> ProtocolError {
    ProtocolError::Transport(format!("worker {} was not captured", name))
}

fn report(error: ProtocolError) -> ProtocolError {
    let reason = error.to_string();
    ProtocolViolationDetected { reason: &reason }.log();
    error
}

async fn write_requests<W>(writer: W, mut requests: UnboundedReceiver<ToWorker>)
where
    W: AsyncWrite + Unpin,
{
    let mut frames: FrameWriter<W, ToWorker> = FrameWriter::new(writer);
    while let Some(frame) = requests.recv().await {
        if let Err(e) = frames.send(&frame).await {
            let request = match &frame {
                ToWorker::Request(request) => request.kind(),
                ToWorker::Control(Control::Cancel) => "Cancel",
            };
            RequestDeliveryFailed {
                request,
                reason: &e.to_string(),
            }
            .log();
            return;
        }
    }
    let _ = frames.close().await;
}

/// Forward the worker's events in order.
///
/// The worker's stdout doubles as the frame channel, so text that user code
/// printed there arrives as bare lines; those become stdout `Log` events.
async fn drain_events<R>(reader: R, events: UnboundedSender<Result<Event, ProtocolError>>)
where
    R: AsyncRead + Unpin,
{
    let mut frames: FrameReader<R, Event> = FrameReader::new(reader);
    while let Some(line) = frames.next_line().await {
        let event = match line {
            Ok(Line::Frame(event)) => Ok(event),
            Ok(Line::Text(text)) => Ok(Event::stdout(text)),
            Err(e) => Err(e),
        };
        if events.send(event).is_err() {
            break;
        }
    }
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        WorkerStderr { line: &line }.log();
    }
}
