// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use serde_json::Value;

use crate::predictor::{Output, PredictionContext};
use crate::schema::{Annotation, InputField, Inputs, ParameterDecl, Signature};
use crate::traits::Predictor;

/// Streams `0..n`, optionally pausing between items.
///
/// `predict(n: int = 3, delay_ms: int = 0) -> Iterator[int]`
#[derive(Debug, Default)]
pub struct Counter;

#[async_trait]
impl Predictor for Counter {
    fn name(&self) -> &str {
        "Counter"
    }

    fn predict_signature(&self) -> Signature {
        Signature::new()
            .param(
                ParameterDecl::new("n", Annotation::integer())
                    .with_field(InputField::new().default_value(3).ge(0.0).le(10_000.0)),
            )
            .param(
                ParameterDecl::new("delay_ms", Annotation::integer())
                    .with_field(InputField::new().default_value(0).ge(0.0)),
            )
            .returns(Annotation::iterator_of(Annotation::integer()))
    }

    async fn predict(&self, inputs: Inputs, _ctx: PredictionContext) -> anyhow::Result<Output> {
        let n = inputs.integer("n")?;
        let delay = Duration::from_millis(inputs.integer("delay_ms")?.max(0) as u64);

        let items = stream::unfold(0i64, move |i| async move {
            if i >= n {
                return None;
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Some((Ok(Value::from(i)), i + 1))
        });
        Ok(Output::stream(items))
    }
}
