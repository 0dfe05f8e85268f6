// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker/supervisor message protocol.
//!
//! * `messages` - the request, event and control vocabulary
//! * `codec` - newline-delimited JSON framing
//! * `sequencing` - per-prediction ordering rules
//! * `trace` - trace-context propagation

pub mod codec;
pub mod messages;
pub mod sequencing;
pub mod trace;

pub use codec::{FrameReader, FrameWriter, Line};
pub use messages::{Control, Event, LogSource, Request, ToWorker};
pub use sequencing::{PredictionState, PredictionTracker};
pub use trace::TraceContext;
