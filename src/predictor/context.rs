// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::protocol::messages::Event;
use crate::protocol::trace::TraceContext;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Where a prediction's log lines go.
///
/// The worker closes the sink right before it sends `Done`; anything logged
/// after that (e.g. by a task the predictor left running) is dropped instead
/// of trailing the terminal event.
#[derive(Clone, Default)]
pub struct LogSink {
    tx: Arc<Mutex<Option<UnboundedSender<Event>>>>,
}

impl LogSink {
    pub fn new(tx: UnboundedSender<Event>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// A sink that discards everything.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Returns false when the line was dropped.
    pub fn emit(&self, event: Event) -> bool {
        match self.tx.lock() {
            Ok(guard) => guard.as_ref().map(|tx| tx.send(event).is_ok()).unwrap_or(false),
            Err(_) => false,
        }
    }

    pub fn close(&self) {
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
    }
}

/// Per-prediction handle given to predict()/train().
#[derive(Clone)]
pub struct PredictionContext {
    trace: TraceContext,
    logs: LogSink,
    cancel: CancellationToken,
}

impl PredictionContext {
    pub fn new(trace: TraceContext, logs: LogSink, cancel: CancellationToken) -> Self {
        Self { trace, logs, cancel }
    }

    /// A context not attached to any worker: fresh trace, logs discarded.
    pub fn detached() -> Self {
        Self::new(TraceContext::generate(), LogSink::detached(), CancellationToken::new())
    }

    pub fn trace_context(&self) -> &TraceContext {
        &self.trace
    }

    /// Header value for outbound calls made on behalf of this prediction.
    pub fn traceparent(&self) -> String {
        self.trace.traceparent()
    }

    /// Write a line to the prediction's stdout log.
    pub fn log(&self, message: impl Into<String>) {
        self.logs.emit(Event::stdout(message));
    }

    /// Write a line to the prediction's stderr log.
    pub fn log_stderr(&self, message: impl Into<String>) {
        self.logs.emit(Event::stderr(message));
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the prediction has been canceled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_closed_sink_drops_lines() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ctx = PredictionContext::new(TraceContext::new(1, 2, 1), LogSink::new(tx), CancellationToken::new());

        ctx.log("before");
        ctx.logs.close();
        ctx.log("after");

        assert_eq!(rx.try_recv().unwrap(), Event::stdout("before"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_traceparent_is_exposed() {
        let ctx = PredictionContext::new(TraceContext::new(1, 2, 1), LogSink::detached(), CancellationToken::new());
        assert_eq!(
            ctx.traceparent(),
            "00-00000000000000000000000000000001-0000000000000002-01"
        );
        assert!(!ctx.is_canceled());
        ctx.cancellation_token().cancel();
        assert!(ctx.is_canceled());
    }
}
