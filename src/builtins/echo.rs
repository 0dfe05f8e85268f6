// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;

use crate::predictor::{Output, PredictionContext, Weights};
use crate::schema::{Annotation, InputField, Inputs, ParameterDecl, Signature};
use crate::traits::Predictor;

/// Repeats its input text.
///
/// `predict(text: str, count: int = 1) -> str`
/// `train(text: str, epochs: int = 1) -> TrainingOutput`
#[derive(Debug, Default)]
pub struct Echo {
    ready: bool,
}

#[async_trait]
impl Predictor for Echo {
    fn name(&self) -> &str {
        "Echo"
    }

    async fn setup(&mut self, _weights: Option<Weights>) -> anyhow::Result<()> {
        self.ready = true;
        Ok(())
    }

    fn predict_signature(&self) -> Signature {
        Signature::new()
            .param(ParameterDecl::new("text", Annotation::text()))
            .param(
                ParameterDecl::new("count", Annotation::integer())
                    .with_field(InputField::new().default_value(1).ge(1.0).description("How many times to repeat")),
            )
            .returns(Annotation::text())
    }

    async fn predict(&self, inputs: Inputs, ctx: PredictionContext) -> anyhow::Result<Output> {
        anyhow::ensure!(self.ready, "setup() has not been run");
        let text = inputs.text("text")?;
        let count = inputs.integer("count")?;
        ctx.log(format!("echoing {} time(s)", count));

        let repeated = vec![text; count.max(1) as usize].join(" ");
        Output::value(repeated)
    }

    fn train_signature(&self) -> Option<Signature> {
        Some(
            Signature::new()
                .param(ParameterDecl::new("text", Annotation::text()))
                .param(ParameterDecl::new("epochs", Annotation::integer()).with_default(1))
                .returns(Annotation::named("TrainingOutput")),
        )
    }

    async fn train(&self, inputs: Inputs, ctx: PredictionContext) -> anyhow::Result<Output> {
        let text = inputs.text("text")?;
        let epochs = inputs.integer("epochs")?;
        for epoch in 1..=epochs {
            if ctx.is_canceled() {
                break;
            }
            ctx.log(format!("epoch {}/{}", epoch, epochs));
        }
        Output::value(json!({ "weights": format!("echo:{}", text) }))
    }
}
