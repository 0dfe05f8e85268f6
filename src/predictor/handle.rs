// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Map, Value};

use crate::config::RuntimeSettings;
use crate::errors::{StartupError, ValidationError};
use crate::observability::messages::loader::SetupCompleted;
use crate::observability::messages::StructuredLog;
use crate::predictor::weights::resolve_weights;
use crate::predictor::{Output, PredictionContext, Weights};
use crate::schema::{InputSchema, Inputs, Mode, OutputSchema, SchemaDeriver};
use crate::traits::{AgentHandle, Predictor};

/// A set-up predictor together with the schemas of its active entry point.
///
/// Built once per worker. Nothing in it changes afterwards; share it behind
/// an `Arc`.
pub struct PredictorHandle {
    predictor: Arc<dyn Predictor>,
    mode: Mode,
    input: InputSchema,
    output: OutputSchema,
}

impl PredictorHandle {
    /// Derive schemas for `mode`, then run setup() with the resolved weights.
    pub async fn build(
        predictor: Box<dyn Predictor>,
        mode: Mode,
        deriver: &SchemaDeriver,
        settings: &RuntimeSettings,
    ) -> Result<Self, StartupError> {
        let weights = resolve_weights(
            predictor.weights_type().as_ref(),
            settings.weights.as_deref(),
            &settings.project_root,
        )?;
        Self::build_with_weights(predictor, mode, deriver, weights).await
    }

    pub async fn build_with_weights(
        mut predictor: Box<dyn Predictor>,
        mode: Mode,
        deriver: &SchemaDeriver,
        weights: Option<Weights>,
    ) -> Result<Self, StartupError> {
        let signature = match mode {
            Mode::Predict => predictor.predict_signature(),
            Mode::Train => predictor
                .train_signature()
                .ok_or_else(|| StartupError::NoTrainEntry(predictor.name().to_string()))?,
        };
        let (input, output) = deriver.derive(&signature, mode)?;

        let started = Instant::now();
        let has_weights = weights.is_some();
        predictor
            .setup(weights)
            .await
            .map_err(|e| StartupError::Setup(format!("{:#}", e)))?;
        SetupCompleted {
            predictor: predictor.name(),
            has_weights,
            duration: started.elapsed(),
        }
        .log();

        Ok(Self {
            predictor: Arc::from(predictor),
            mode,
            input,
            output,
        })
    }

    pub fn name(&self) -> &str {
        self.predictor.name()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn input_schema(&self) -> &InputSchema {
        &self.input
    }

    pub fn output_schema(&self) -> &OutputSchema {
        &self.output
    }

    pub fn agents(&self) -> Vec<AgentHandle> {
        self.predictor.agents()
    }

    pub fn validate(&self, payload: &Map<String, Value>) -> Result<Inputs, ValidationError> {
        self.input.validate(payload)
    }

    /// Call the active entry point.
    pub async fn run(&self, inputs: Inputs, ctx: PredictionContext) -> anyhow::Result<Output> {
        match self.mode {
            Mode::Predict => self.predictor.predict(inputs, ctx).await,
            Mode::Train => self.predictor.train(inputs, ctx).await,
        }
    }

    /// OpenAPI document describing the active entry point.
    pub fn openapi(&self) -> Value {
        let (path, request, response) = match self.mode {
            Mode::Predict => ("/predictions", "PredictionRequest", "PredictionResponse"),
            Mode::Train => ("/trainings", "TrainingRequest", "TrainingResponse"),
        };
        let input_ref = format!("#/components/schemas/{}", self.input.name());
        let output_ref = format!("#/components/schemas/{}", self.output.name());

        let mut schemas = Map::new();
        schemas.insert(self.input.name().to_string(), self.input.json_schema());
        schemas.insert(self.output.name().to_string(), self.output.json_schema());
        schemas.insert(
            request.to_string(),
            json!({
                "title": request,
                "type": "object",
                "properties": {
                    "id": {"title": "Id", "type": "string"},
                    "input": {"$ref": input_ref},
                },
            }),
        );
        schemas.insert(
            response.to_string(),
            json!({
                "title": response,
                "type": "object",
                "properties": {
                    "input": {"$ref": input_ref},
                    "output": {"$ref": output_ref},
                    "error": {"title": "Error", "type": "string"},
                    "logs": {"title": "Logs", "type": "string", "default": ""},
                },
            }),
        );

        json!({
            "openapi": "3.0.2",
            "info": {"title": "Cog", "version": "0.1.0"},
            "paths": {
                path: {
                    "post": {
                        "summary": self.mode.method(),
                        "operationId": self.mode.method(),
                        "requestBody": {
                            "content": {"application/json": {"schema": {"$ref": format!("#/components/schemas/{}", request)}}},
                        },
                        "responses": {
                            "200": {
                                "description": "Successful Response",
                                "content": {"application/json": {"schema": {"$ref": format!("#/components/schemas/{}", response)}}},
                            },
                        },
                    },
                },
            },
            "components": {"schemas": schemas},
        })
    }
}
