// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message vocabulary exchanged between supervisor and worker.
//!
//! Every frame is one JSON object on its own line. Frames towards the worker
//! are wrapped in [`ToWorker`], which separates the request vocabulary from
//! the out-of-band control channel (cancellation). Frames from the worker are
//! bare [`Event`]s.

use crate::protocol::trace::TraceContext;
use crate::tools::remote::RemotePredictor;
use crate::traits::Workflow;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

fn default_true() -> bool {
    true
}

/// Supervisor to worker requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    PredictionInput {
        payload: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
    PredictorWorkflowRequest {},
    RemotePredictorRequest {
        predictor: RemotePredictor,
        #[serde(default = "default_true")]
        add: bool,
    },
    Shutdown {},
}

impl Request {
    pub fn prediction(payload: Map<String, Value>, trace_context: Option<TraceContext>) -> Self {
        Request::PredictionInput {
            payload,
            trace_context,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::PredictionInput { .. } => "PredictionInput",
            Request::PredictorWorkflowRequest {} => "PredictorWorkflowRequest",
            Request::RemotePredictorRequest { .. } => "RemotePredictorRequest",
            Request::Shutdown {} => "Shutdown",
        }
    }
}

/// Which stream a captured log line was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Stdout,
    Stderr,
}

/// Worker to supervisor events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    Log {
        message: String,
        source: LogSource,
    },
    PredictionOutputType {
        multi: bool,
    },
    PredictionOutput {
        payload: Value,
    },
    Done {
        #[serde(default)]
        canceled: bool,
        #[serde(default)]
        error: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_detail: Option<String>,
    },
    PredictorWorkflowResponse {
        workflow: Workflow,
    },
}

impl Event {
    pub fn succeeded() -> Self {
        Event::Done {
            canceled: false,
            error: false,
            error_detail: None,
        }
    }

    pub fn canceled() -> Self {
        Event::Done {
            canceled: true,
            error: false,
            error_detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Event::Done {
            canceled: false,
            error: true,
            error_detail: Some(detail.into()),
        }
    }

    pub fn stdout(message: impl Into<String>) -> Self {
        Event::Log {
            message: message.into(),
            source: LogSource::Stdout,
        }
    }

    pub fn stderr(message: impl Into<String>) -> Self {
        Event::Log {
            message: message.into(),
            source: LogSource::Stderr,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Event::Done { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::Log { .. } => "Log",
            Event::PredictionOutputType { .. } => "PredictionOutputType",
            Event::PredictionOutput { .. } => "PredictionOutput",
            Event::Done { .. } => "Done",
            Event::PredictorWorkflowResponse { .. } => "PredictorWorkflowResponse",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Out-of-band control messages. Not part of any prediction's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Control {
    Cancel,
}

/// Envelope for everything sent to the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "message", rename_all = "snake_case")]
pub enum ToWorker {
    Request(Request),
    Control(Control),
}
