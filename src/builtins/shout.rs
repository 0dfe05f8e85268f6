// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::predictor::{Output, PredictionContext};
use crate::schema::{Annotation, Inputs, ParameterDecl, Signature};
use crate::traits::PredictFn;

/// A function predictor.
///
/// `shout(text: str, style: str = "upper" in {upper, lower, title}) -> str`
#[derive(Debug, Default)]
pub struct Shout;

#[async_trait]
impl PredictFn for Shout {
    fn signature(&self) -> Signature {
        Signature::new()
            .param(ParameterDecl::new("text", Annotation::text()))
            .param(
                ParameterDecl::new("style", Annotation::text())
                    .with_default("upper")
                    .with_choices(["upper", "lower", "title"]),
            )
            .returns(Annotation::text())
    }

    async fn call(&self, inputs: Inputs, _ctx: PredictionContext) -> anyhow::Result<Output> {
        let text = inputs.text("text")?;
        let shouted = match inputs.text("style")?.as_str() {
            "lower" => text.to_lowercase(),
            "title" => text
                .split_whitespace()
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<String>>()
                .join(" "),
            _ => text.to_uppercase(),
        };
        Output::value(shouted)
    }
}
