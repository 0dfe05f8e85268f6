// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types follow a struct-based pattern with a `Display`
//! implementation and a [`messages::StructuredLog`] implementation, so call
//! sites never carry format strings of their own.
//!
//! Logs always go to stderr. In worker mode stdout is owned by the protocol
//! and must never be written to by anything but the frame writer.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::loader` - predictor loading and setup
//! * `messages::schema` - schema derivation
//! * `messages::worker` - worker request loop and prediction lifecycle
//! * `messages::supervisor` - worker process management

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` wins over `default_level` when it is set. Calling this twice is
/// harmless; the second call is ignored.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
