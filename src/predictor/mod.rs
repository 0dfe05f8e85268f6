// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Runtime-side view of a predictor: its per-call context, its outputs,
//! setup weights, and the immutable [`PredictorHandle`] a worker serves.

pub mod context;
pub mod function;
pub mod handle;
pub mod output;
pub mod weights;

pub use context::{LogSink, PredictionContext};
pub use function::FunctionPredictor;
pub use handle::PredictorHandle;
pub use output::Output;
pub use weights::{resolve_weights, Weights};
