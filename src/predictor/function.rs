// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::predictor::{Output, PredictionContext};
use crate::schema::{Inputs, Signature};
use crate::traits::{PredictFn, Predictor};

/// A bare function used as a predictor.
///
/// The same callable serves as predict() and, when the worker runs in train
/// mode, as train(). There is no setup.
pub struct FunctionPredictor {
    name: String,
    entry: Arc<dyn PredictFn>,
}

impl FunctionPredictor {
    pub fn new(name: impl Into<String>, entry: Arc<dyn PredictFn>) -> Self {
        Self {
            name: name.into(),
            entry,
        }
    }
}

#[async_trait]
impl Predictor for FunctionPredictor {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_signature(&self) -> Signature {
        self.entry.signature()
    }

    async fn predict(&self, inputs: Inputs, ctx: PredictionContext) -> anyhow::Result<Output> {
        self.entry.call(inputs, ctx).await
    }

    fn train_signature(&self) -> Option<Signature> {
        Some(self.entry.signature())
    }

    async fn train(&self, inputs: Inputs, ctx: PredictionContext) -> anyhow::Result<Output> {
        self.entry.call(inputs, ctx).await
    }
}
