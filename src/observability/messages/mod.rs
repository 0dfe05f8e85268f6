// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it through `tracing` with its fields attached.
//!
//! # Organization
//!
//! * `loader` - predictor reference resolution and module loading
//! * `schema` - schema derivation
//! * `worker` - worker request handling and prediction lifecycle
//! * `supervisor` - child process management on the parent side
//!
//! # Usage Pattern
//!
//! ```rust
//! use cogwheel::observability::messages::worker::PredictionStarted;
//! use cogwheel::observability::messages::StructuredLog;
//!
//! let msg = PredictionStarted {
//!     predictor: "echo",
//!     trace_id: "4bf92f3577b34da6a3ce929d0e0e4736",
//!     traceparent: "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod loader;
pub mod schema;
pub mod supervisor;
pub mod worker;

/// A message that knows how to log itself with structured fields.
pub trait StructuredLog {
    /// Emit the message at its natural level.
    fn log(&self);

    /// A span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
