// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the worker side of the protocol.
//!
//! This module contains message types for logging events related to:
//! * Worker start and shutdown
//! * Prediction lifecycle (start, completion, failure, cancellation)
//! * Agent workflow and remote tool requests

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Worker is ready to accept requests.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkerStarted<'a> {
    pub predictor: &'a str,
    pub mode: &'a str,
}

impl Display for WorkerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker ready: predictor '{}' in {} mode", self.predictor, self.mode)
    }
}

impl StructuredLog for WorkerStarted<'_> {
    fn log(&self) {
        tracing::info!(predictor = self.predictor, mode = self.mode, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker",
            span_name = name,
            predictor = self.predictor,
            mode = self.mode,
        )
    }
}

/// A prediction request was accepted.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use cogwheel::observability::messages::worker::PredictionStarted;
///
/// let msg = PredictionStarted {
///     predictor: "echo",
///     trace_id: "4bf92f3577b34da6a3ce929d0e0e4736",
///     traceparent: "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PredictionStarted<'a> {
    pub predictor: &'a str,
    pub trace_id: &'a str,
    /// The full W3C context: version, trace id, parent span id and flags.
    pub traceparent: &'a str,
}

impl Display for PredictionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Prediction started on '{}' (trace {})",
            self.predictor, self.trace_id
        )
    }
}

impl StructuredLog for PredictionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            predictor = self.predictor,
            trace_id = self.trace_id,
            traceparent = self.traceparent,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "prediction",
            span_name = name,
            predictor = self.predictor,
            trace_id = self.trace_id,
            traceparent = self.traceparent,
        )
    }
}

/// A prediction reached its terminal event.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PredictionCompleted<'a> {
    pub predictor: &'a str,
    pub outputs: usize,
    pub canceled: bool,
    pub failed: bool,
    pub duration: std::time::Duration,
}

impl Display for PredictionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let status = if self.canceled {
            "canceled"
        } else if self.failed {
            "failed"
        } else {
            "succeeded"
        };
        write!(
            f,
            "Prediction on '{}' {}: {} outputs in {:?}",
            self.predictor, status, self.outputs, self.duration
        )
    }
}

impl StructuredLog for PredictionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            predictor = self.predictor,
            outputs = self.outputs,
            canceled = self.canceled,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "prediction_completed",
            span_name = name,
            predictor = self.predictor,
            duration = ?self.duration,
        )
    }
}

/// An event could not be written to the channel and was dropped.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct EventDropped<'a> {
    pub event: &'a str,
    pub reason: &'a str,
}

impl Display for EventDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dropped {} event: {}", self.event, self.reason)
    }
}

impl StructuredLog for EventDropped<'_> {
    fn log(&self) {
        tracing::warn!(event = self.event, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("event_dropped", span_name = name, event = self.event)
    }
}

/// The predictor raised (or panicked) during a prediction.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PredictionFailed<'a> {
    pub predictor: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for PredictionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Prediction on '{}' failed: {}", self.predictor, self.error)
    }
}

impl StructuredLog for PredictionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            predictor = self.predictor,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "prediction_failed",
            span_name = name,
            predictor = self.predictor,
        )
    }
}

/// A request could not be decoded or handled.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct RequestRejected<'a> {
    pub request: &'a str,
    pub reason: &'a str,
}

impl Display for RequestRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected {} request: {}", self.request, self.reason)
    }
}

impl StructuredLog for RequestRejected<'_> {
    fn log(&self) {
        tracing::warn!(request = self.request, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("request_rejected", span_name = name, request = self.request)
    }
}

/// The worker left its request loop.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkerStopped<'a> {
    pub reason: &'a str,
    pub predictions: usize,
}

impl Display for WorkerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker stopped after {} predictions: {}",
            self.predictions, self.reason
        )
    }
}

impl StructuredLog for WorkerStopped<'_> {
    fn log(&self) {
        tracing::info!(reason = self.reason, predictions = self.predictions, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("worker_stopped", span_name = name, reason = self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_prediction_span_carries_full_trace_context() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let started = PredictionStarted {
            predictor: "echo",
            trace_id: "4bf92f3577b34da6a3ce929d0e0e4736",
            traceparent: "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
        };
        tracing::subscriber::with_default(subscriber, || {
            let span = started.span("predict");
            let _entered = span.enter();
            tracing::info!("inside");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("inside"));
        assert!(output.contains("traceparent="));
        assert!(output.contains("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"));
    }
}
