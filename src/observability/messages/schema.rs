// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for schema derivation.

use crate::errors::SchemaError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Schemas were derived for one entry point.
///
/// # Log Level
/// `debug!` - Happens once per startup
pub struct SchemaDerived<'a> {
    pub method: &'a str,
    pub parameter_count: usize,
    pub streaming: bool,
}

impl Display for SchemaDerived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Derived {}() schema: {} parameters, streaming={}",
            self.method, self.parameter_count, self.streaming
        )
    }
}

impl StructuredLog for SchemaDerived<'_> {
    fn log(&self) {
        tracing::debug!(
            method = self.method,
            parameter_count = self.parameter_count,
            streaming = self.streaming,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "schema_derived",
            span_name = name,
            method = self.method,
            parameter_count = self.parameter_count,
        )
    }
}

/// Schema derivation rejected a signature.
///
/// # Log Level
/// `error!` - Fatal to startup
pub struct SchemaDerivationFailed<'a> {
    pub method: &'a str,
    pub error: &'a SchemaError,
}

impl Display for SchemaDerivationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Invalid {}() signature: {}", self.method, self.error)
    }
}

impl StructuredLog for SchemaDerivationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            method = self.method,
            parameter = self.error.parameter().unwrap_or(""),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "schema_derivation_failed",
            span_name = name,
            method = self.method,
        )
    }
}
