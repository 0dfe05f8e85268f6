// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured description of a predictor callable.
//!
//! Predictors hand the runtime a [`Signature`] instead of being reflected
//! over: an ordered list of [`ParameterDecl`]s plus an optional return
//! [`Annotation`]. Everything here is plain data so the same signature always
//! derives the same schema.

use crate::schema::types::Annotation;
use serde::Serialize;
use serde_json::Value;

/// Default-carrier attached to an input field.
///
/// Holds the default value (absent means the field is required) together
/// with presentation metadata and validation constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ge: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub le: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn ge(mut self, bound: f64) -> Self {
        self.ge = Some(bound);
        self
    }

    pub fn le(mut self, bound: f64) -> Self {
        self.le = Some(bound);
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A parameter's default as declared: either a bare value or a full carrier.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Raw(Value),
    Field(InputField),
}

/// One parameter of a predict/train callable, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    pub name: String,
    pub annotation: Option<Annotation>,
    pub default: Option<DefaultValue>,
}

impl ParameterDecl {
    pub fn new(name: impl Into<String>, annotation: Annotation) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation),
            default: None,
        }
    }

    /// A parameter declared without any type.
    pub fn unannotated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Raw(value.into()));
        self
    }

    pub fn with_field(mut self, field: InputField) -> Self {
        self.default = Some(DefaultValue::Field(field));
        self
    }

    /// Restrict the parameter to a closed set of values.
    ///
    /// A raw default is lifted into a carrier so the choices have somewhere
    /// to live.
    pub fn with_choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = match self.default.take() {
            Some(DefaultValue::Field(field)) => field,
            Some(DefaultValue::Raw(value)) => InputField::new().default_value(value),
            None => InputField::new(),
        };
        self.default = Some(DefaultValue::Field(field.choices(choices)));
        self
    }

    /// The carrier this parameter ends up with.
    ///
    /// No default yields an empty (required) carrier, a raw default is
    /// wrapped, a pre-wrapped carrier is used as is.
    pub fn field(&self) -> InputField {
        match &self.default {
            None => InputField::new(),
            Some(DefaultValue::Raw(value)) => InputField::new().default_value(value.clone()),
            Some(DefaultValue::Field(field)) => field.clone(),
        }
    }
}

/// A callable's parameter list and return annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    pub parameters: Vec<ParameterDecl>,
    pub returns: Option<Annotation>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, parameter: ParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, annotation: Annotation) -> Self {
        self.returns = Some(annotation);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDecl> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_wrapping() {
        let required = ParameterDecl::new("text", Annotation::text());
        assert!(required.field().is_required());

        let raw = ParameterDecl::new("count", Annotation::integer()).with_default(1);
        assert_eq!(raw.field().default, Some(json!(1)));

        let carrier = InputField::new().default_value(0.5).description("strength");
        let wrapped = ParameterDecl::new("strength", Annotation::float()).with_field(carrier.clone());
        assert_eq!(wrapped.field(), carrier);
    }

    #[test]
    fn test_choices_keep_raw_default() {
        let param = ParameterDecl::new("mode", Annotation::text())
            .with_default("fast")
            .with_choices(["fast", "slow"]);
        let field = param.field();
        assert_eq!(field.default, Some(json!("fast")));
        assert_eq!(field.choices, Some(vec![json!("fast"), json!("slow")]));
    }
}
