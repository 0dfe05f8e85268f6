// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-prediction sequencing rules.
//!
//! ```text
//! Idle --PredictionInput--> Running --PredictionOutputType{multi:true}--> Streaming
//!                              |                                              |
//!                              +------------------Done------------------------+--> Terminal
//! ```
//!
//! * `Log` may appear at any point before `Done`
//! * at most one `PredictionOutputType`, before any `PredictionOutput`
//! * without `multi`, at most one `PredictionOutput`
//! * exactly one `Done`, and nothing after it

use crate::errors::ProtocolError;
use crate::protocol::messages::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionState {
    Idle,
    Running,
    Streaming,
    Terminal,
}

impl PredictionState {
    pub fn is_active(&self) -> bool {
        matches!(self, PredictionState::Running | PredictionState::Streaming)
    }
}

/// Validates one worker's event stream, one prediction at a time.
#[derive(Debug, Clone)]
pub struct PredictionTracker {
    state: PredictionState,
    multi: Option<bool>,
    outputs: usize,
}

impl Default for PredictionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionTracker {
    pub fn new() -> Self {
        Self {
            state: PredictionState::Idle,
            multi: None,
            outputs: 0,
        }
    }

    pub fn state(&self) -> PredictionState {
        self.state
    }

    /// Outputs seen for the current prediction.
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// A PredictionInput was dispatched.
    pub fn start(&mut self) -> Result<(), ProtocolError> {
        if self.state.is_active() {
            return Err(ProtocolError::Violation(
                "a prediction is already outstanding on this worker".to_string(),
            ));
        }
        self.state = PredictionState::Running;
        self.multi = None;
        self.outputs = 0;
        Ok(())
    }

    /// Check an event against the rules and advance the state.
    pub fn observe(&mut self, event: &Event) -> Result<(), ProtocolError> {
        match event {
            Event::Log { .. } => {
                if self.state == PredictionState::Terminal {
                    return Err(violation("Log after Done"));
                }
            }
            Event::PredictionOutputType { multi } => {
                self.require_active(event)?;
                if self.multi.is_some() {
                    return Err(violation("PredictionOutputType sent twice"));
                }
                if self.outputs > 0 {
                    return Err(violation("PredictionOutputType after PredictionOutput"));
                }
                self.multi = Some(*multi);
                if *multi {
                    self.state = PredictionState::Streaming;
                }
            }
            Event::PredictionOutput { .. } => {
                self.require_active(event)?;
                if self.multi != Some(true) && self.outputs >= 1 {
                    return Err(violation("more than one PredictionOutput without multi"));
                }
                self.outputs += 1;
            }
            Event::Done { .. } => {
                self.require_active(event)?;
                self.state = PredictionState::Terminal;
            }
            Event::PredictorWorkflowResponse { .. } => {
                if self.state.is_active() {
                    return Err(violation("PredictorWorkflowResponse during a prediction"));
                }
            }
        }
        Ok(())
    }

    fn require_active(&self, event: &Event) -> Result<(), ProtocolError> {
        match self.state {
            PredictionState::Running | PredictionState::Streaming => Ok(()),
            PredictionState::Terminal => Err(ProtocolError::Violation(format!("{} after Done", event))),
            PredictionState::Idle => Err(ProtocolError::Violation(format!(
                "{} outside of a prediction",
                event
            ))),
        }
    }
}

fn violation(reason: &str) -> ProtocolError {
    ProtocolError::Violation(reason.to_string())
}
