// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the parent side: spawning and talking to workers.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A worker child process was started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkerSpawned<'a> {
    pub program: &'a str,
    pub reference: &'a str,
    pub pid: Option<u32>,
}

impl Display for WorkerSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.pid {
            Some(pid) => write!(
                f,
                "Spawned worker '{}' for '{}' (pid {})",
                self.program, self.reference, pid
            ),
            None => write!(f, "Spawned worker '{}' for '{}'", self.program, self.reference),
        }
    }
}

impl StructuredLog for WorkerSpawned<'_> {
    fn log(&self) {
        tracing::info!(
            program = self.program,
            reference = self.reference,
            pid = self.pid,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_process",
            span_name = name,
            reference = self.reference,
            pid = self.pid,
        )
    }
}

/// A line the worker wrote to its own stderr.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct WorkerStderr<'a> {
    pub line: &'a str,
}

impl Display for WorkerStderr<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "worker: {}", self.line)
    }
}

impl StructuredLog for WorkerStderr<'_> {
    fn log(&self) {
        tracing::debug!(target: "cogwheel::worker_stderr", "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("worker_stderr", span_name = name)
    }
}

/// The worker broke the event sequencing rules or sent garbage.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ProtocolViolationDetected<'a> {
    pub reason: &'a str,
}

impl Display for ProtocolViolationDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Protocol violation from worker: {}", self.reason)
    }
}

impl StructuredLog for ProtocolViolationDetected<'_> {
    fn log(&self) {
        tracing::error!(reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("protocol_violation", span_name = name)
    }
}

/// Shutdown was requested and the worker has gone away.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkerShutdown<'a> {
    pub outcome: &'a str,
}

impl Display for WorkerShutdown<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker shut down: {}", self.outcome)
    }
}

impl StructuredLog for WorkerShutdown<'_> {
    fn log(&self) {
        tracing::info!(outcome = self.outcome, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("worker_shutdown", span_name = name)
    }
}

/// A request frame could not be written to the worker.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct RequestDeliveryFailed<'a> {
    pub request: &'a str,
    pub reason: &'a str,
}

impl Display for RequestDeliveryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not deliver {} to worker: {}", self.request, self.reason)
    }
}

impl StructuredLog for RequestDeliveryFailed<'_> {
    fn log(&self) {
        tracing::warn!(request = self.request, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("request_delivery_failed", span_name = name, request = self.request)
    }
}
