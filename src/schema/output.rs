// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::schema::types::Annotation;
use serde_json::Value;

/// Derived description of what a callable produces.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    name: String,
    ty: Annotation,
    streaming: bool,
    wrapped: bool,
}

impl OutputSchema {
    pub(crate) fn new(name: impl Into<String>, ty: Annotation, streaming: bool, wrapped: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            streaming,
            wrapped,
        }
    }

    /// Public wrapper name: `Output` or `TrainingOutput`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The produced type. For streaming outputs this is `List[T]`.
    pub fn ty(&self) -> &Annotation {
        &self.ty
    }

    /// True when the callable yields a lazy sequence, delivered item by item.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// True when the declared type was enveloped in the public wrapper name.
    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn json_schema(&self) -> Value {
        let mut schema = self.ty.json_schema();
        if self.streaming {
            schema["x-cog-array-type"] = Value::from("iterator");
        }
        if let Value::Object(map) = &mut schema {
            map.insert("title".to_string(), Value::String(self.name.clone()));
        }
        schema
    }
}
