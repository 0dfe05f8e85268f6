// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! W3C trace-context attached to each prediction.
//!
//! The context is fixed at dispatch and scoped over the whole prediction via
//! [`CURRENT_TRACE`], so anything running on behalf of the prediction (tool
//! calls, outbound HTTP) can read it with [`current`].

use crate::errors::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const VERSION: &str = "00";
const SAMPLED: u8 = 0x01;

tokio::task_local! {
    /// Trace context of the prediction the current task is servicing.
    pub static CURRENT_TRACE: TraceContext;
}

/// The trace context of the surrounding prediction, if any.
pub fn current() -> Option<TraceContext> {
    CURRENT_TRACE.try_with(|trace| trace.clone()).ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireTraceContext", into = "WireTraceContext")]
pub struct TraceContext {
    pub trace_id: u128,
    pub span_id: u64,
    pub flags: u8,
    pub tracestate: Option<String>,
}

impl TraceContext {
    pub fn new(trace_id: u128, span_id: u64, flags: u8) -> Self {
        Self {
            trace_id,
            span_id,
            flags,
            tracestate: None,
        }
    }

    /// A fresh, sampled context.
    pub fn generate() -> Self {
        let trace_id = Uuid::new_v4().as_u128();
        let span_id = (Uuid::new_v4().as_u128() as u64).max(1);
        Self::new(trace_id, span_id, SAMPLED)
    }

    pub fn with_tracestate(mut self, tracestate: impl Into<String>) -> Self {
        self.tracestate = Some(tracestate.into());
        self
    }

    pub fn trace_id_hex(&self) -> String {
        format!("{:032x}", self.trace_id)
    }

    pub fn is_sampled(&self) -> bool {
        self.flags & SAMPLED == SAMPLED
    }

    /// `00-<trace id>-<span id>-<flags>`
    pub fn traceparent(&self) -> String {
        format!(
            "{}-{:032x}-{:016x}-{:02x}",
            VERSION, self.trace_id, self.span_id, self.flags
        )
    }

    pub fn parse(traceparent: &str) -> Result<Self, ProtocolError> {
        let invalid = || ProtocolError::MalformedFrame(format!("invalid traceparent '{}'", traceparent));

        let parts: Vec<&str> = traceparent.trim().split('-').collect();
        let [version, trace, span, flags] = parts.as_slice() else {
            return Err(invalid());
        };
        if version.len() != 2 || *version == "ff" || trace.len() != 32 || span.len() != 16 || flags.len() != 2 {
            return Err(invalid());
        }
        u8::from_str_radix(version, 16).map_err(|_| invalid())?;

        let trace_id = u128::from_str_radix(trace, 16).map_err(|_| invalid())?;
        let span_id = u64::from_str_radix(span, 16).map_err(|_| invalid())?;
        let flags = u8::from_str_radix(flags, 16).map_err(|_| invalid())?;
        if trace_id == 0 || span_id == 0 {
            return Err(invalid());
        }
        Ok(Self::new(trace_id, span_id, flags))
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.traceparent())
    }
}

#[derive(Serialize, Deserialize)]
struct WireTraceContext {
    traceparent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tracestate: Option<String>,
}

impl From<TraceContext> for WireTraceContext {
    fn from(trace: TraceContext) -> Self {
        Self {
            traceparent: trace.traceparent(),
            tracestate: trace.tracestate,
        }
    }
}

impl TryFrom<WireTraceContext> for TraceContext {
    type Error = ProtocolError;

    fn try_from(wire: WireTraceContext) -> Result<Self, Self::Error> {
        let mut trace = TraceContext::parse(&wire.traceparent)?;
        trace.tracestate = wire.tracestate;
        Ok(trace)
    }
}
