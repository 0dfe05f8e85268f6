// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for predictor reference resolution and module loading.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Loading a predictor reference has begun.
///
/// # Log Level
/// `info!` - Startup milestone
pub struct PredictorLoadStarted<'a> {
    pub reference: &'a str,
    pub mode: &'a str,
    pub slim: bool,
}

impl Display for PredictorLoadStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loading {} predictor '{}' (slim loader {})",
            self.mode,
            self.reference,
            if self.slim { "enabled" } else { "disabled" }
        )
    }
}

impl StructuredLog for PredictorLoadStarted<'_> {
    fn log(&self) {
        tracing::info!(
            reference = self.reference,
            mode = self.mode,
            slim = self.slim,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "predictor_load",
            span_name = name,
            reference = self.reference,
            mode = self.mode,
        )
    }
}

/// The slim loading path did not produce the symbol; falling back to a full
/// module execution.
///
/// # Log Level
/// `debug!` - Expected for modules the slim path cannot handle
pub struct SlimLoadFallback<'a> {
    pub module: &'a str,
    pub symbol: &'a str,
    pub reason: &'a str,
}

impl Display for SlimLoadFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Slim load of '{}' from '{}' fell back to full load: {}",
            self.symbol, self.module, self.reason
        )
    }
}

impl StructuredLog for SlimLoadFallback<'_> {
    fn log(&self) {
        tracing::debug!(
            module = self.module,
            symbol = self.symbol,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "slim_load_fallback",
            span_name = name,
            module = self.module,
            symbol = self.symbol,
        )
    }
}

/// A predictor symbol was resolved and instantiated.
///
/// # Log Level
/// `info!` - Startup milestone
pub struct PredictorLoaded<'a> {
    pub reference: &'a str,
    pub kind: &'a str,
    pub slim: bool,
}

impl Display for PredictorLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} predictor '{}'{}",
            self.kind,
            self.reference,
            if self.slim { " via slim loader" } else { "" }
        )
    }
}

impl StructuredLog for PredictorLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            reference = self.reference,
            kind = self.kind,
            slim = self.slim,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "predictor_loaded",
            span_name = name,
            reference = self.reference,
            kind = self.kind,
        )
    }
}

/// Predictor setup finished.
///
/// # Log Level
/// `info!` - Startup milestone
pub struct SetupCompleted<'a> {
    pub predictor: &'a str,
    pub has_weights: bool,
    pub duration: std::time::Duration,
}

impl Display for SetupCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Setup of '{}' completed in {:?} (weights: {})",
            self.predictor,
            self.duration,
            if self.has_weights { "yes" } else { "none" }
        )
    }
}

impl StructuredLog for SetupCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            predictor = self.predictor,
            has_weights = self.has_weights,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "setup",
            span_name = name,
            predictor = self.predictor,
        )
    }
}
