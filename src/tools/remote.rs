// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Remote predictors exposed to agents as tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::protocol::trace::{self, TraceContext};
use crate::traits::{Tool, ToolFn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePredictorMetadata {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePredictorSpec {
    /// OpenAPI document of the remote predictor.
    pub predictor_schema: Value,
}

/// Descriptor of a predictor served elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePredictor {
    pub metadata: RemotePredictorMetadata,
    pub spec: RemotePredictorSpec,
}

impl RemotePredictor {
    /// `<base>/<namespace>/<name>/predictions`
    pub fn endpoint(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}/predictions",
            base_url.trim_end_matches('/'),
            self.metadata.namespace,
            self.metadata.name
        )
    }

    /// The remote `Input` schema, or the whole document if it has none.
    pub fn input_schema(&self) -> Value {
        self.spec
            .predictor_schema
            .pointer("/components/schemas/Input")
            .cloned()
            .unwrap_or_else(|| self.spec.predictor_schema.clone())
    }

    /// Turn the descriptor into a tool posting to `base_url`.
    pub fn into_tool(self, client: reqwest::Client, base_url: &str) -> Tool {
        Tool {
            name: self.metadata.name.clone(),
            description: self.metadata.description.clone(),
            schema: self.input_schema(),
            callable: Arc::new(RemoteTool {
                client,
                endpoint: self.endpoint(base_url),
                namespace: self.metadata.namespace,
            }),
        }
    }
}

/// Posts tool arguments to a remote predictor.
///
/// The request carries the `traceparent` of the prediction the call is made
/// for, or of a fresh trace when called outside one.
pub struct RemoteTool {
    client: reqwest::Client,
    endpoint: String,
    namespace: String,
}

#[async_trait]
impl ToolFn for RemoteTool {
    async fn invoke(&self, arguments: Map<String, Value>) -> anyhow::Result<Value> {
        let trace = trace::current().unwrap_or_else(TraceContext::generate);
        let span = tracing::info_span!(
            "tool_call",
            namespace = %self.namespace,
            endpoint = %self.endpoint,
            trace_id = %trace.trace_id_hex(),
        );

        async {
            let response = self
                .client
                .post(&self.endpoint)
                .header("traceparent", trace.traceparent())
                .json(&arguments)
                .send()
                .await?
                .error_for_status()?;
            Ok::<Value, anyhow::Error>(response.json::<Value>().await?)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> RemotePredictor {
        serde_json::from_value(json!({
            "metadata": {"namespace": "acme", "name": "summarize", "description": "Summarizes text"},
            "spec": {"predictor_schema": {
                "components": {"schemas": {"Input": {"type": "object", "properties": {"text": {"type": "string"}}}}}
            }}
        }))
        .unwrap()
    }

    #[test]
    fn test_endpoint() {
        let remote = descriptor();
        assert_eq!(
            remote.endpoint("http://localhost:5002/"),
            "http://localhost:5002/acme/summarize/predictions"
        );
    }

    #[test]
    fn test_into_tool() {
        let tool = descriptor().into_tool(reqwest::Client::new(), "http://localhost:5002");
        assert_eq!(tool.name, "summarize");
        assert_eq!(tool.description, "Summarizes text");
        assert_eq!(tool.schema["properties"]["text"]["type"], "string");
    }

    #[test]
    fn test_schema_without_input_component() {
        let mut remote = descriptor();
        remote.spec.predictor_schema = json!({"type": "object"});
        assert_eq!(remote.input_schema(), json!({"type": "object"}));
    }
}
