// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::predictor::{Output, PredictionContext, Weights};
use crate::schema::{Annotation, Inputs, Signature};
use crate::traits::agent_adapter::AgentHandle;

/// A user-authored model.
///
/// The runtime calls `setup` exactly once, before the first prediction, and
/// then treats the predictor as immutable: `predict` and `train` take `&self`
/// and calls are never concurrent within one worker.
#[async_trait]
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;

    /// Declared type of the `weights` setup parameter, if setup takes one.
    fn weights_type(&self) -> Option<Annotation> {
        None
    }

    async fn setup(&mut self, _weights: Option<Weights>) -> anyhow::Result<()> {
        Ok(())
    }

    fn predict_signature(&self) -> Signature;

    async fn predict(&self, inputs: Inputs, ctx: PredictionContext) -> anyhow::Result<Output>;

    /// Signature of the training entry point, when the predictor has one.
    fn train_signature(&self) -> Option<Signature> {
        None
    }

    async fn train(&self, _inputs: Inputs, _ctx: PredictionContext) -> anyhow::Result<Output> {
        Err(anyhow::anyhow!("{} does not define train()", self.name()))
    }

    /// Agent objects the predictor exposes, discovered by the tool registry.
    fn agents(&self) -> Vec<AgentHandle> {
        Vec::new()
    }
}

/// A bare callable used as the predict or train entry point.
#[async_trait]
pub trait PredictFn: Send + Sync {
    fn signature(&self) -> Signature;

    async fn call(&self, inputs: Inputs, ctx: PredictionContext) -> anyhow::Result<Output>;
}
