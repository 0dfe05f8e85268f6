// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while deriving input/output schemas from a signature.
//!
//! All of them are fatal to worker startup and carry enough context (the
//! parameter and the supported-type list) to be shown to the predictor author
//! verbatim.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A parameter has no declared type.
    #[error("No input type provided for parameter `{name}`. Supported input types are: {supported}, or a Union or List of those types.")]
    MissingType { name: String, supported: String },

    /// A parameter's type falls outside the allowed universe.
    #[error("Unsupported input type {type_name} for parameter `{name}`. Supported input types are: {supported}, or a Union or List of those types.")]
    UnsupportedType {
        name: String,
        type_name: String,
        supported: String,
    },

    /// Choices declared on something other than text or integer.
    #[error("The input {name} uses the option choices. Choices can only be used with str or int types.")]
    InvalidChoiceType { name: String },

    /// The callable declares no return type.
    #[error("You must set an output type for {callable}(). If your model can return multiple output types, you can explicitly set `Any` as the output type.")]
    MissingOutputType { callable: String },

    /// Two parameters share a name.
    #[error("Parameter `{name}` is declared more than once")]
    DuplicateParameter { name: String },

    /// A field constraint cannot be compiled, e.g. a malformed regex.
    #[error("Invalid constraint on parameter `{name}`: {reason}")]
    InvalidConstraint { name: String, reason: String },
}

impl SchemaError {
    /// The parameter the error is about, if any.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            SchemaError::MissingType { name, .. }
            | SchemaError::UnsupportedType { name, .. }
            | SchemaError::InvalidChoiceType { name }
            | SchemaError::DuplicateParameter { name }
            | SchemaError::InvalidConstraint { name, .. } => Some(name),
            SchemaError::MissingOutputType { .. } => None,
        }
    }
}
