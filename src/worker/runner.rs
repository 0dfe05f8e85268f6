// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures::{FutureExt, StreamExt};
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::consts::DEFAULT_REMOTE_BASE_URL;
use crate::errors::{PredictionError, ProtocolError};
use crate::observability::messages::worker::{
    EventDropped, PredictionCompleted, PredictionFailed, PredictionStarted, RequestRejected, WorkerStarted,
    WorkerStopped,
};
use crate::observability::messages::StructuredLog;
use crate::predictor::{LogSink, Output, PredictionContext, PredictorHandle};
use crate::protocol::trace::CURRENT_TRACE;
use crate::protocol::codec::check_length;
use crate::protocol::{Control, Event, FrameReader, FrameWriter, Request, ToWorker, TraceContext};
use crate::tools::{RemotePredictor, ToolRegistry};
use crate::traits::Workflow;
use crate::utils::panic_message;

/// Sequence number and token of the prediction a `Cancel` frame should hit.
type CancelSlot = Arc<Mutex<Option<(u64, CancellationToken)>>>;

/// A request together with the sequence number and token assigned on arrival.
struct Pending {
    seq: u64,
    request: Request,
    cancel: CancellationToken,
}

/// How one prediction ended.
enum Outcome {
    Succeeded,
    Canceled,
    Failed(PredictionError),
}

impl Outcome {
    fn done(&self) -> Event {
        match self {
            Outcome::Succeeded => Event::succeeded(),
            Outcome::Canceled => Event::canceled(),
            Outcome::Failed(error) => Event::failed(error.to_string()),
        }
    }
}

/// Serves one predictor over a framed duplex channel.
///
/// Requests are handled strictly one at a time. Control frames are read
/// concurrently so a `Cancel` reaches the running prediction at its next
/// checkpoint.
pub struct Worker {
    handle: Arc<PredictorHandle>,
    tools: ToolRegistry,
    http: reqwest::Client,
    remote_base_url: String,
}

impl Worker {
    pub fn new(handle: Arc<PredictorHandle>) -> Self {
        Self {
            handle,
            tools: ToolRegistry::new(),
            http: reqwest::Client::new(),
            remote_base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_remote_base_url(mut self, url: impl Into<String>) -> Self {
        self.remote_base_url = url.into();
        self
    }

    /// Run until `Shutdown` or until the input side closes.
    pub async fn serve<R, W>(mut self, reader: R, writer: W) -> Result<(), ProtocolError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        WorkerStarted {
            predictor: self.handle.name(),
            mode: self.handle.mode().method(),
        }
        .log();

        let (events, event_rx) = mpsc::unbounded_channel();
        let (request_tx, mut requests) = mpsc::unbounded_channel();
        let slot: CancelSlot = Arc::new(Mutex::new(None));

        let writer_task = tokio::spawn(write_events(writer, event_rx));
        let reader_task = tokio::spawn(read_frames(reader, request_tx, Arc::clone(&slot)));

        let mut predictions = 0;
        let reason = loop {
            let Some(Pending { seq, request, cancel }) = requests.recv().await else {
                break "input closed";
            };
            match request {
                Request::PredictionInput {
                    payload,
                    trace_context,
                } => {
                    self.predict(payload, trace_context, cancel, &events).await;
                    clear_slot(&slot, seq);
                    predictions += 1;
                }
                Request::PredictorWorkflowRequest {} => {
                    let workflow = self.workflow(&events);
                    let _ = events.send(Event::PredictorWorkflowResponse { workflow });
                }
                Request::RemotePredictorRequest { predictor, add } => {
                    self.remote_predictor(predictor, add, &events);
                }
                Request::Shutdown {} => break "shutdown requested",
            }
        };

        WorkerStopped { reason, predictions }.log();

        reader_task.abort();
        drop(events);
        match writer_task.await {
            Ok(result) => result,
            Err(e) => Err(ProtocolError::Transport(e.to_string())),
        }
    }

    async fn predict(
        &self,
        payload: Map<String, Value>,
        trace: Option<TraceContext>,
        cancel: CancellationToken,
        events: &UnboundedSender<Event>,
    ) {
        let trace = trace.unwrap_or_else(TraceContext::generate);
        let trace_id = trace.trace_id_hex();
        let traceparent = trace.traceparent();
        let started = PredictionStarted {
            predictor: self.handle.name(),
            trace_id: &trace_id,
            traceparent: &traceparent,
        };
        started.log();
        let span = started.span("predict");

        let clock = Instant::now();
        let logs = LogSink::new(events.clone());
        let mut outputs = 0;
        let outcome = self
            .execute(payload, trace, logs.clone(), cancel, events, &mut outputs)
            .instrument(span)
            .await;

        // Nothing may follow Done.
        logs.close();
        if let Outcome::Failed(error) = &outcome {
            PredictionFailed {
                predictor: self.handle.name(),
                error,
            }
            .log();
        }
        let _ = events.send(outcome.done());

        PredictionCompleted {
            predictor: self.handle.name(),
            outputs,
            canceled: matches!(outcome, Outcome::Canceled),
            failed: matches!(outcome, Outcome::Failed(_)),
            duration: clock.elapsed(),
        }
        .log();
    }

    async fn execute(
        &self,
        payload: Map<String, Value>,
        trace: TraceContext,
        logs: LogSink,
        cancel: CancellationToken,
        events: &UnboundedSender<Event>,
        outputs: &mut usize,
    ) -> Outcome {
        let inputs = match self.handle.validate(&payload) {
            Ok(inputs) => inputs,
            Err(e) => return Outcome::Failed(e.into()),
        };

        let ctx = PredictionContext::new(trace.clone(), logs, cancel.clone());
        let run = CURRENT_TRACE.scope(trace.clone(), AssertUnwindSafe(self.handle.run(inputs, ctx)).catch_unwind());
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Outcome::Canceled,
            result = run => result,
        };

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Outcome::Failed(PredictionError::raised(&e)),
            Err(payload) => return Outcome::Failed(PredictionError::Panicked(panic_message(payload.as_ref()))),
        };
        if cancel.is_cancelled() {
            return Outcome::Canceled;
        }

        let multi = self.handle.output_schema().is_streaming() || output.is_stream();
        let _ = events.send(Event::PredictionOutputType { multi });

        let mut items = match output {
            Output::Value(value) => {
                if let Err(e) = emit_output(events, value) {
                    return Outcome::Failed(e);
                }
                *outputs += 1;
                return Outcome::Succeeded;
            }
            Output::Stream(items) => items,
        };

        loop {
            let next = CURRENT_TRACE.scope(trace.clone(), AssertUnwindSafe(items.next()).catch_unwind());
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Outcome::Canceled,
                item = next => item,
            };
            match item {
                Ok(Some(Ok(value))) => {
                    if let Err(e) = emit_output(events, value) {
                        return Outcome::Failed(e);
                    }
                    *outputs += 1;
                }
                Ok(Some(Err(e))) => return Outcome::Failed(PredictionError::raised(&e)),
                Ok(None) => return Outcome::Succeeded,
                Err(payload) => return Outcome::Failed(PredictionError::Panicked(panic_message(payload.as_ref()))),
            }
            if cancel.is_cancelled() {
                return Outcome::Canceled;
            }
        }
    }

    fn workflow(&self, events: &UnboundedSender<Event>) -> Workflow {
        match self.tools.workflow(&self.handle.agents()) {
            Ok(workflow) => workflow,
            Err(e) => {
                let reason = format!("{:#}", e);
                RequestRejected {
                    request: "PredictorWorkflowRequest",
                    reason: &reason,
                }
                .log();
                let _ = events.send(Event::stderr(format!("failed to describe workflow: {}", reason)));
                Workflow::default()
            }
        }
    }

    fn remote_predictor(&mut self, predictor: RemotePredictor, add: bool, events: &UnboundedSender<Event>) {
        let agents = self.handle.agents();
        let name = predictor.metadata.name.clone();
        let result = if add {
            let tool = predictor.into_tool(self.http.clone(), &self.remote_base_url);
            self.tools.add_tool(tool, &agents).map(|_| ())
        } else {
            self.tools
                .remove_tool(&predictor.metadata.name, &predictor.metadata.description, &agents)
                .map(|_| ())
        };

        if let Err(e) = result {
            let reason = format!("{:#}", e);
            RequestRejected {
                request: "RemotePredictorRequest",
                reason: &reason,
            }
            .log();
            let verb = if add { "add" } else { "remove" };
            let _ = events.send(Event::stderr(format!("failed to {} tool '{}': {}", verb, name, reason)));
        }
    }
}

/// Forget the token of prediction `seq`, unless a later prediction has
/// already taken the slot.
fn clear_slot(slot: &CancelSlot, seq: u64) {
    if let Ok(mut current) = slot.lock() {
        if matches!(current.as_ref(), Some((held, _)) if *held == seq) {
            current.take();
        }
    }
}

/// Queue one output, refusing payloads whose frame the supervisor could
/// not read.
fn emit_output(events: &UnboundedSender<Event>, payload: Value) -> Result<(), PredictionError> {
    let event = Event::PredictionOutput { payload };
    let encoded = serde_json::to_string(&event).map_err(|e| PredictionError::Unsendable(e.to_string()))?;
    check_length(encoded.len()).map_err(|e| PredictionError::Unsendable(e.to_string()))?;
    let _ = events.send(event);
    Ok(())
}

async fn write_events<W>(writer: W, mut events: UnboundedReceiver<Event>) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let mut frames: FrameWriter<W, Event> = FrameWriter::new(writer);
    while let Some(event) = events.recv().await {
        match frames.send(&event).await {
            Ok(()) => {}
            Err(e @ ProtocolError::FrameTooLarge { .. }) => {
                EventDropped {
                    event: event.kind(),
                    reason: &e.to_string(),
                }
                .log();
            }
            Err(e) => return Err(e),
        }
    }
    frames.close().await
}

/// Forward requests in order; act on control frames immediately.
///
/// A prediction's token is created here, on arrival, so a `Cancel` that
/// follows the request can never miss it.
async fn read_frames<R>(reader: R, requests: UnboundedSender<Pending>, slot: CancelSlot)
where
    R: AsyncRead + Unpin,
{
    let mut frames: FrameReader<R, ToWorker> = FrameReader::new(reader);
    let mut seq = 0u64;
    while let Some(frame) = frames.next().await {
        match frame {
            Ok(ToWorker::Request(request)) => {
                seq += 1;
                let cancel = CancellationToken::new();
                if matches!(request, Request::PredictionInput { .. }) {
                    if let Ok(mut current) = slot.lock() {
                        *current = Some((seq, cancel.clone()));
                    }
                }
                if requests.send(Pending { seq, request, cancel }).is_err() {
                    break;
                }
            }
            Ok(ToWorker::Control(Control::Cancel)) => {
                if let Ok(current) = slot.lock() {
                    if let Some((_, token)) = current.as_ref() {
                        token.cancel();
                    }
                }
            }
            Err(ProtocolError::MalformedFrame(reason)) => {
                RequestRejected {
                    request: "unknown",
                    reason: &reason,
                }
                .log();
            }
            Err(e) => {
                let reason = e.to_string();
                RequestRejected {
                    request: "unknown",
                    reason: &reason,
                }
                .log();
                break;
            }
        }
    }

    // The supervisor is gone; stop whatever is running.
    if let Ok(current) = slot.lock() {
        if let Some((_, token)) = current.as_ref() {
            token.cancel();
        }
    }
}
