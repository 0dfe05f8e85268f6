// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{ConfigError, LoadError, SchemaError};
use thiserror::Error;

/// Everything that can stop a worker from reaching its serving loop.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The predictor has no train() but the worker was started in train mode.
    #[error("Predictor '{0}' does not define train()")]
    NoTrainEntry(String),

    /// Weights could not be resolved for setup().
    #[error("Predictor.setup() has an argument 'weights' of type {0}, but only File, Path and str are supported")]
    UnsupportedWeightsType(String),

    /// setup() itself failed.
    #[error("Predictor setup failed: {0}")]
    Setup(String),
}
