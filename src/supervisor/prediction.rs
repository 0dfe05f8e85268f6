// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use crate::errors::ProtocolError;
use crate::protocol::{Control, Event, LogSource, ToWorker};
use crate::supervisor::Supervisor;

/// Sends `Cancel` for whatever prediction is running.
///
/// Cheap to clone and usable from another task while the owner of the
/// [`Prediction`] is waiting on its events.
#[derive(Clone)]
pub struct Canceler {
    outgoing: Option<UnboundedSender<ToWorker>>,
}

impl Canceler {
    pub(crate) fn new(outgoing: Option<UnboundedSender<ToWorker>>) -> Self {
        Self { outgoing }
    }

    pub fn cancel(&self) -> Result<(), ProtocolError> {
        match &self.outgoing {
            Some(tx) => tx
                .send(ToWorker::Control(Control::Cancel))
                .map_err(|_| ProtocolError::ChannelClosed),
            None => Err(ProtocolError::ShutDown),
        }
    }
}

/// Everything a prediction produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionResult {
    pub multi: bool,
    pub outputs: Vec<Value>,
    pub logs: Vec<(LogSource, String)>,
    pub canceled: bool,
    pub error: bool,
    pub error_detail: Option<String>,
}

impl PredictionResult {
    pub fn succeeded(&self) -> bool {
        !self.canceled && !self.error
    }

    /// The single output of a non-streaming prediction.
    pub fn output(&self) -> Option<&Value> {
        if self.multi {
            None
        } else {
            self.outputs.first()
        }
    }
}

/// One outstanding prediction.
///
/// Holds the supervisor mutably, so no other request can be issued until it
/// is dropped. Dropping it before `Done` leaves the prediction outstanding;
/// see [`Supervisor::finish_outstanding`].
pub struct Prediction<'a> {
    supervisor: &'a mut Supervisor,
    finished: bool,
}

impl<'a> Prediction<'a> {
    pub(crate) fn new(supervisor: &'a mut Supervisor) -> Self {
        Self {
            supervisor,
            finished: false,
        }
    }

    pub fn canceler(&self) -> Canceler {
        self.supervisor.canceler()
    }

    pub fn cancel(&self) -> Result<(), ProtocolError> {
        self.canceler().cancel()
    }

    /// The next event of this prediction, `None` after `Done`.
    pub async fn next_event(&mut self) -> Option<Result<Event, ProtocolError>> {
        if self.finished {
            return None;
        }
        let next = self.supervisor.next_prediction_event().await;
        match &next {
            Ok(event) if event.is_done() => self.finished = true,
            Ok(_) => {}
            Err(_) => self.finished = true,
        }
        Some(next)
    }

    /// Wait for `Done`, gathering outputs and logs on the way.
    pub async fn collect(mut self) -> Result<PredictionResult, ProtocolError> {
        let mut result = PredictionResult::default();
        while let Some(event) = self.next_event().await {
            match event? {
                Event::Log { message, source } => result.logs.push((source, message)),
                Event::PredictionOutputType { multi } => result.multi = multi,
                Event::PredictionOutput { payload } => result.outputs.push(payload),
                Event::Done {
                    canceled,
                    error,
                    error_detail,
                } => {
                    result.canceled = canceled;
                    result.error = error;
                    result.error_detail = error_detail;
                }
                Event::PredictorWorkflowResponse { .. } => {}
            }
        }
        Ok(result)
    }
}
