// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors that end a single prediction.
//!
//! None of these take the worker down: they are reported in the terminal
//! `Done` event and the worker carries on with the next request.

use std::fmt;
use thiserror::Error;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A payload that does not satisfy its input schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub schema: String,
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == name)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.errors.len() == 1 { "" } else { "s" };
        write!(
            f,
            "{} validation error{} for {}",
            self.errors.len(),
            plural,
            self.schema
        )?;
        for error in &self.errors {
            write!(f, "\n{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Why a prediction finished with `error: true`.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// predict()/train() returned an error, or a streamed item did.
    #[error("{0}")]
    Raised(String),

    /// predict()/train() panicked.
    #[error("prediction panicked: {0}")]
    Panicked(String),

    /// An output could not be put on the channel.
    #[error("output could not be sent: {0}")]
    Unsendable(String),
}

impl PredictionError {
    pub fn raised(error: &anyhow::Error) -> Self {
        PredictionError::Raised(format!("{:#}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError {
            schema: "Input".to_string(),
            errors: vec![
                FieldError {
                    field: "text".to_string(),
                    message: "field required".to_string(),
                },
                FieldError {
                    field: "count".to_string(),
                    message: "value is not a valid integer".to_string(),
                },
            ],
        };
        let rendered = error.to_string();
        assert!(rendered.starts_with("2 validation errors for Input"));
        assert!(rendered.contains("text: field required"));
        assert!(error.field("count").is_some());
    }

    #[test]
    fn test_raised_keeps_context_chain() {
        let error = anyhow::anyhow!("disk full").context("writing checkpoint");
        let prediction_error = PredictionError::raised(&error);
        assert_eq!(prediction_error.to_string(), "writing checkpoint: disk full");
    }
}
